// Tracing setup for embedders. The UI owns the terminal or window, so logs
// go to a file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "prizedraw.log";

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "prizedraw=info,warn";

/// Install a global file subscriber writing to `log_dir/prizedraw.log`.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(log_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_path = log_dir.join(LOG_FILE);
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create log file {}", log_path.display()))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_log_file_once() {
        let dir = std::env::temp_dir().join("prizedraw_logging_test");
        let _ = std::fs::remove_dir_all(&dir);

        let path = init_tracing(&dir).expect("first init should succeed");
        assert!(path.exists());
        tracing::info!("logging initialized");

        // A second global subscriber is refused.
        assert!(init_tracing(&dir).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}

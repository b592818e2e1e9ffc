// Application layer around prizedraw-core: configuration, the caller-held
// draw session, the winner board view model and log setup.

pub mod board;
pub mod config;
pub mod logging;
pub mod session;

pub use board::{BoardEntry, WinnerBoard};
pub use config::{load_config, Config, ConfigError};
pub use session::{DrawRound, DrawSession, SessionError, UploadSummary};

// Configuration loading and parsing (prizedraw.toml).

use prizedraw_core::{DedupeRule, ExclusionScheme, LoaderOptions, RowPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// File name of the configuration, inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "prizedraw.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub draw: DrawConfig,
}

/// The `[roster]` table: what an uploaded CSV must look like.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub required_columns: Vec<String>,
    pub display_columns: Vec<String>,
    pub row_policy: RowPolicySetting,
    pub dedupe_column: Option<String>,
    pub dedupe_case_insensitive: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        RosterConfig {
            required_columns: Vec::new(),
            display_columns: vec!["First_Name".into(), "Last_Name".into()],
            row_policy: RowPolicySetting::Lenient,
            dedupe_column: None,
            dedupe_case_insensitive: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicySetting {
    Lenient,
    Strict,
}

/// The `[draw]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    pub winners: usize,
    pub exclusion: ExclusionMode,
    pub exclusion_column: Option<String>,
    pub exclusion_case_insensitive: bool,
    /// Fixed seed for reproducible draws; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        DrawConfig {
            winners: 5,
            exclusion: ExclusionMode::Row,
            exclusion_column: None,
            exclusion_case_insensitive: false,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionMode {
    None,
    Row,
    Column,
}

impl Config {
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            row_policy: match self.roster.row_policy {
                RowPolicySetting::Lenient => RowPolicy::Lenient,
                RowPolicySetting::Strict => RowPolicy::Strict,
            },
            required_columns: self.roster.required_columns.clone(),
            dedupe: self.roster.dedupe_column.as_ref().map(|column| DedupeRule {
                column: column.clone(),
                case_insensitive: self.roster.dedupe_case_insensitive,
            }),
        }
    }

    /// Falls back to row identity if `column` mode has no column; `validate`
    /// rejects that combination for file-loaded configs.
    pub fn exclusion_scheme(&self) -> ExclusionScheme {
        match (self.draw.exclusion, &self.draw.exclusion_column) {
            (ExclusionMode::None, _) => ExclusionScheme::None,
            (ExclusionMode::Column, Some(name)) => ExclusionScheme::Column {
                name: name.clone(),
                case_insensitive: self.draw.exclusion_case_insensitive,
            },
            (ExclusionMode::Row, _) | (ExclusionMode::Column, None) => ExclusionScheme::Row,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/prizedraw.toml` relative to `base_dir`.
///
/// This does not copy defaults; see `seed_config_file`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    load_config_file(&base_dir.join("config").join(CONFIG_FILE))
}

/// Load and validate a single config file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Seed `config/prizedraw.toml` from `defaults/` if it is not there yet.
///
/// Returns the path written, or `None` when a config already exists. An
/// existing config is never overwritten.
pub fn seed_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!("no {} or {}", target.display(), source.display()),
        });
    }

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", dir.display()),
        })?;
    }
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", source.display()),
    })?;

    info!("seeded {} from {}", target.display(), source.display());
    Ok(Some(target))
}

/// Loads config for the current working directory.
///
/// A directory carrying `defaults/` or `config/` is treated as the base
/// (the default file is seeded in first). Otherwise the per-user config file is
/// used if present, and the built-in defaults if not.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;

    if cwd.join("defaults").exists() || cwd.join("config").exists() {
        seed_config_file(&cwd)?;
        return load_config_from(&cwd);
    }

    if let Some(path) = user_config_path().filter(|p| p.exists()) {
        info!("loading user config from {}", path.display());
        return load_config_file(&path);
    }

    info!("no config file found, using built-in defaults");
    Ok(Config::default())
}

/// Per-user config location, e.g. `~/.config/prizedraw/prizedraw.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "prizedraw")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.draw.winners == 0 {
        return Err(ConfigError::ValidationError {
            field: "draw.winners".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.roster.display_columns.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "roster.display_columns".into(),
            message: "must name at least one column".into(),
        });
    }

    let named: &[(&str, Option<&String>)] = &[
        ("roster.dedupe_column", config.roster.dedupe_column.as_ref()),
        ("draw.exclusion_column", config.draw.exclusion_column.as_ref()),
    ];
    for (field, value) in named {
        if value.is_some_and(|v| v.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                field: field.to_string(),
                message: "must not be blank".into(),
            });
        }
    }

    if config.draw.exclusion == ExclusionMode::Column && config.draw.exclusion_column.is_none() {
        return Err(ConfigError::ValidationError {
            field: "draw.exclusion_column".into(),
            message: "required when draw.exclusion = \"column\"".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

//! TOML settings for the `dataminer` binary.
//!
//! Example configuration:
//! ```toml
//! [render]
//! dialect = "tsql"
//!
//! [report]
//! default_limit = 500
//! column_match = "fingerprint"
//!
//! [persist]
//! report_dir = "${HOME}/reports"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::ColumnMatch;
use crate::sql::Dialect;

const CONFIG_ENV: &str = "DATAMINER_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderSettings,
    pub report: ReportSettings,
    pub persist: PersistSettings,
}

/// Output rendering.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Dialect for `sql` output (postgres, tsql).
    pub dialect: Dialect,
}

/// Defaults applied to loaded reports.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Row limit used when neither the report nor the command sets one.
    pub default_limit: Option<u64>,

    /// How column customizations follow SQL edits.
    pub column_match: ColumnMatch,
}

/// Where report files live.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PersistSettings {
    /// Directory relative report paths resolve against
    /// (supports ${ENV_VAR} expansion).
    pub report_dir: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `DATAMINER_CONFIG`
    /// 2. `./dataminer.toml`
    /// 3. `~/.config/dataminer/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("dataminer.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("dataminer").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.report.default_limit == Some(0) {
            return Err(SettingsError::InvalidConfig(
                "report.default_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve a report path against `persist.report_dir`.
    ///
    /// Absolute paths, and every path when no directory is configured, are
    /// returned unchanged.
    pub fn report_path<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, SettingsError> {
        let path = path.as_ref();
        match &self.persist.report_dir {
            Some(dir) if path.is_relative() => Ok(PathBuf::from(expand_env_vars(dir)?).join(path)),
            _ => Ok(path.to_path_buf()),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Lone $
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}

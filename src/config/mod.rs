//! Configuration for the `dataminer` binary.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, PersistSettings, RenderSettings, ReportSettings, Settings, SettingsError,
};

//! Report persistence.
//!
//! A [`ReportPersistor`] stores and retrieves a report's portable
//! [`ReportHash`]; the report itself never touches storage. The crate ships
//! one implementation, [`YamlPersistor`].

mod yaml;

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ReportHash;

pub use yaml::YamlPersistor;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Pathname cannot be blank")]
    BlankPath,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid report document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Storage for a report's portable form.
pub trait ReportPersistor {
    fn save(&self, report: &ReportHash) -> Result<(), PersistError>;

    fn load(&self) -> Result<ReportHash, PersistError>;
}

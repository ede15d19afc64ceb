use std::fs;
use std::path::{Path, PathBuf};

use super::{PersistError, ReportPersistor};
use crate::model::ReportHash;

/// Reads and writes a report as a YAML file.
///
/// SQL is trimmed and its line endings normalized before writing, so the
/// document stores it as a literal block that diffs line by line.
#[derive(Debug, Clone)]
pub struct YamlPersistor {
    path: PathBuf,
}

impl YamlPersistor {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let path = path.as_ref();
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(PersistError::BlankPath);
        }
        Ok(YamlPersistor {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ReportPersistor for YamlPersistor {
    fn save(&self, report: &ReportHash) -> Result<(), PersistError> {
        let mut document = report.clone();
        document.sql = normalize_sql(&report.sql);
        let text = serde_yaml::to_string(&document)?;
        fs::write(&self.path, text).map_err(|e| self.io_error(e))?;
        log::debug!("saved report to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<ReportHash, PersistError> {
        let text = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

fn normalize_sql(sql: &str) -> String {
    sql.trim().replace("\r\n", "\n").replace('\r', "\n")
}

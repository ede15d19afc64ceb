//! # Dataminer
//!
//! A portable, parameterizable model of a single SELECT query.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     SQL text                             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::engine]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Report (baseline tree + columns)               │
//! │   Column names, captions, fingerprints, parameters       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [apply_params / order / paging]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Working tree                            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::engine::deparse + dialect]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Runnable SQL                            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use dataminer::prelude::*;
//!
//! let mut report = Report::new();
//! report.set_sql("SELECT id, name FROM users WHERE id = 2").unwrap();
//!
//! let name = OperatorValue::new("=", vec!["John".into()], DataType::String).unwrap();
//! report.apply_params(&[QueryParameter::new("name", name)]).unwrap();
//!
//! assert_eq!(
//!     report.runnable_sql().unwrap(),
//!     "SELECT id, name FROM users WHERE id = 2 AND name = 'John'"
//! );
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod persist;
pub mod sql;

pub use error::{Error, Result};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::model::{
        Column, ColumnMatch, ControlType, DataType, ListDef, OperatorValue,
        QueryParameter, QueryParameterDefinition, Report, ReportHash, Value,
    };
    pub use crate::persist::{ReportPersistor, YamlPersistor};
    pub use crate::sql::Dialect;
}

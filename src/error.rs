//! Crate-wide error taxonomy.
//!
//! - [`Error::Syntax`] - SQL text fails to parse, or a dialect cannot express
//!   the requested rendering.
//! - [`Error::Argument`] - a validation failure at the point of construction
//!   or assignment.
//! - [`Error::State`] - an operation was invoked before its preconditions
//!   (usually "SQL has been set") were met.

use thiserror::Error;

use crate::persist::PersistError;
use crate::sql::engine::EngineError;

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the report model.
#[derive(Debug, Error)]
pub enum Error {
    /// SQL could not be parsed, or cannot be rendered for a dialect.
    #[error("SQL syntax error: {0}")]
    Syntax(String),

    /// Input failed validation.
    #[error("{0}")]
    Argument(String),

    /// Operation called in the wrong state.
    #[error("{0}")]
    State(String),

    /// Reading or writing a persisted report failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl Error {
    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        Error::Argument(msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        Error::State(msg.into())
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        Error::Syntax(err.to_string())
    }
}

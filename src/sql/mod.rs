//! SQL plumbing for the report model.
//!
//! - [`engine`] - parse SQL text into a tree and deparse it back
//! - [`shape`] - classify expression nodes the model knows how to read
//! - [`rewrite`] - value-semantics clause replacement on query trees
//! - [`dialect`] - output dialects for runnable SQL

pub mod dialect;
pub mod engine;
pub mod rewrite;
pub mod shape;

pub use dialect::Dialect;
pub use engine::{deparse, parse, parse_fragment, EngineError};
pub use shape::ExprShape;

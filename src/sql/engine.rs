//! The SQL engine: text to tree and back.
//!
//! Parsing is delegated to sqlparser-rs with the PostgreSQL dialect, and
//! deparsing is the tree's `Display` implementation. Every clause the report
//! model splices into a query (predicates, sort lists, array expressions) is
//! produced by parsing a small throwaway fragment through [`parse_fragment`]
//! and lifting the wanted sub-node out of it.

use sqlparser::ast::{Query, Statement};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::{Parser, ParserError};
use thiserror::Error;

/// Errors raised by the engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("{0}")]
    Parse(#[from] ParserError),

    #[error("fragment `{0}` did not parse to a single query")]
    NotAQuery(String),
}

/// Parse SQL text into statements.
pub fn parse(sql: &str) -> Result<Vec<Statement>, EngineError> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)?;
    log::debug!("parsed {} statement(s)", statements.len());
    Ok(statements)
}

/// Parse a generated fragment that must be exactly one query.
pub fn parse_fragment(sql: &str) -> Result<Query, EngineError> {
    let mut statements = parse(sql)?;
    match (statements.pop(), statements.is_empty()) {
        (Some(Statement::Query(query)), true) => Ok(*query),
        _ => Err(EngineError::NotAQuery(sql.to_string())),
    }
}

/// Render a query tree back to SQL text.
pub fn deparse(query: &Query) -> String {
    query.to_string()
}

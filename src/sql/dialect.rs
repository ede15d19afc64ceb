//! Output dialects for runnable SQL.
//!
//! Reports are parsed and deparsed as PostgreSQL. Other targets are reached
//! by post-processing the deparsed text:
//!
//! | Dialect | Identifier delimiters | Row limit |
//! |---------|-----------------------|-----------|
//! | Postgres | kept | `LIMIT n [OFFSET m]` |
//! | TSql | stripped | `SELECT TOP n`, no OFFSET |

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Trailing `LIMIT n` of a deparsed query.
static TRAILING_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+LIMIT\s+(\d+)\s*$").unwrap());

/// Leading `SELECT [DISTINCT]` keyword(s).
static LEADING_SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*SELECT(\s+DISTINCT)?\s+").unwrap());

/// A single-quoted string literal or an identifier delimiter. Doubled
/// quotes inside a literal match as adjacent literals.
static LITERAL_OR_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"'[^']*'|""#).unwrap());

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    /// SQL Server.
    TSql,
}

impl Dialect {
    /// Parse a dialect name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "tsql" | "mssql" | "sqlserver" => Ok(Dialect::TSql),
            other => Err(Error::argument(format!("Unsupported dialect: {}", other))),
        }
    }

    /// Dialect name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::TSql => "tsql",
        }
    }

    /// Rewrite deparsed PostgreSQL text for this dialect.
    ///
    /// `has_offset` reports whether the tree the text came from carries an
    /// OFFSET clause; T-SQL `TOP` cannot express one.
    pub fn delimit(&self, sql: &str, has_offset: bool) -> Result<String> {
        match self {
            Dialect::Postgres => Ok(sql.to_string()),
            Dialect::TSql => {
                if has_offset {
                    return Err(Error::Syntax(
                        "OFFSET is not supported for the tsql dialect".to_string(),
                    ));
                }
                Ok(limit_to_top(&strip_delimiters(sql)))
            }
        }
    }
}

/// Drop `"` identifier delimiters, leaving string literals intact.
fn strip_delimiters(sql: &str) -> String {
    LITERAL_OR_DELIMITER
        .replace_all(sql, |caps: &regex::Captures<'_>| match &caps[0] {
            "\"" => String::new(),
            literal => literal.to_string(),
        })
        .into_owned()
}

fn limit_to_top(sql: &str) -> String {
    let Some(caps) = TRAILING_LIMIT.captures(sql) else {
        return sql.to_string();
    };
    let count = caps[1].to_string();
    let without_limit = TRAILING_LIMIT.replace(sql, "");

    match LEADING_SELECT.find(&without_limit) {
        Some(m) => format!(
            "{}TOP {} {}",
            m.as_str(),
            count,
            &without_limit[m.end()..]
        ),
        None => without_limit.into_owned(),
    }
}

//! A validated operator / values / data type triple.
//!
//! Construction checks arity and coercion up front, so an `OperatorValue`
//! that exists can always be rendered.

use std::fmt;

use super::types::{DataType, Value};
use crate::error::{Error, Result};

/// Comparison operator for a query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gte,
    Lte,
    NotEq,
    Gt,
    Lt,
    Between,
    In,
    InOrNull,
    MatchOrNull,
    StartsWith,
    EndsWith,
    Contains,
    IsNull,
    NotNull,
}

impl Operator {
    pub const ALL: [Operator; 15] = [
        Operator::Eq,
        Operator::Gte,
        Operator::Lte,
        Operator::NotEq,
        Operator::Gt,
        Operator::Lt,
        Operator::Between,
        Operator::In,
        Operator::InOrNull,
        Operator::MatchOrNull,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Contains,
        Operator::IsNull,
        Operator::NotNull,
    ];

    /// Parse an operator token, case-insensitively.
    pub fn parse(token: &str) -> Result<Self> {
        let wanted = token.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.token() == wanted)
            .ok_or_else(|| Error::argument(format!("Invalid operator - \"{}\"", token)))
    }

    /// The vocabulary token, e.g. `>=` or `starts_with`.
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::NotEq => "<>",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Between => "between",
            Operator::In => "in",
            Operator::InOrNull => "in_or_null",
            Operator::MatchOrNull => "match_or_null",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Contains => "contains",
            Operator::IsNull => "is_null",
            Operator::NotNull => "not_null",
        }
    }

    /// SQL spelling of the operator.
    pub fn for_sql(&self) -> &'static str {
        match self {
            Operator::StartsWith | Operator::EndsWith | Operator::Contains => "~~",
            Operator::IsNull => "is",
            Operator::NotNull => "is not",
            other => other.token(),
        }
    }

    /// Human phrase, e.g. "is any of".
    pub fn for_text(&self) -> &'static str {
        match self {
            Operator::Eq => "equals",
            Operator::Gte => "greater than or equal to",
            Operator::Lte => "less than or equal to",
            Operator::NotEq => "not equal to",
            Operator::Gt => "greater than",
            Operator::Lt => "less than",
            Operator::Between => "between",
            Operator::In => "is any of",
            Operator::InOrNull => "is blank or any of",
            Operator::MatchOrNull => "is blank or equals",
            Operator::StartsWith => "starts with",
            Operator::EndsWith => "ends with",
            Operator::Contains => "contains",
            Operator::IsNull => "is blank",
            Operator::NotNull => "is not blank",
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Operator::StartsWith | Operator::EndsWith | Operator::Contains
        )
    }

    pub fn is_null_test(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::NotNull)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Operator::In | Operator::InOrNull)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Right-hand side and comparison kind of one filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorValue {
    operator: Operator,
    values: Vec<Value>,
    data_type: DataType,
}

impl OperatorValue {
    /// Validate and build. Fails on an unknown operator, wrong arity,
    /// unordered BETWEEN bounds or values that do not coerce to `data_type`.
    pub fn new(operator: &str, values: Vec<Value>, data_type: DataType) -> Result<Self> {
        let op_val = OperatorValue {
            operator: Operator::parse(operator)?,
            values,
            data_type,
        };
        op_val.validate()?;
        Ok(op_val)
    }

    /// Same operator and values under another data type, re-validated.
    pub fn with_data_type(mut self, data_type: DataType) -> Result<Self> {
        self.data_type = data_type;
        self.validate()?;
        Ok(self)
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn operator_for_sql(&self) -> &'static str {
        self.operator.for_sql()
    }

    pub fn operator_for_text(&self) -> &'static str {
        self.operator.for_text()
    }

    /// SQL literal text for every value.
    pub fn values_for_sql(&self) -> Vec<String> {
        self.values.iter().map(|v| self.sql_literal(v)).collect()
    }

    fn sql_literal(&self, value: &Value) -> String {
        if self.operator.is_null_test() {
            return "NULL".to_string();
        }
        match value {
            Value::Bool(true) => "'t'".to_string(),
            Value::Bool(false) => "'f'".to_string(),
            Value::Null => "NULL".to_string(),
            _ => match self.operator {
                Operator::StartsWith => quote(&format!("{}%", value)),
                Operator::EndsWith => quote(&format!("%{}", value)),
                Operator::Contains => quote(&format!("%{}%", value)),
                _ => match self.data_type {
                    DataType::Integer => value
                        .as_i64()
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| quote(&value.to_string())),
                    DataType::Number => value
                        .as_f64()
                        .map(|x| x.to_string())
                        .unwrap_or_else(|| quote(&value.to_string())),
                    _ => quote(&value.to_string()),
                },
            },
        }
    }

    fn validate(&self) -> Result<()> {
        match self.operator {
            Operator::IsNull | Operator::NotNull => return Ok(()),
            Operator::Between => self.validate_between()?,
            Operator::In | Operator::InOrNull => {
                if self.values.iter().any(Value::is_null) {
                    return Err(Error::argument("IN values cannot be null"));
                }
            }
            _ => {
                if self.values.first().map_or(true, Value::is_null) {
                    return Err(Error::argument("Parameter must have a value"));
                }
            }
        }
        self.validate_coercion()
    }

    fn validate_between(&self) -> Result<()> {
        if self.values.len() < 2 || self.values[..2].iter().any(Value::is_blank) {
            return Err(Error::argument(
                "Must have from and to values for BETWEEN operator",
            ));
        }
        let order = self.values[0].compare_as(&self.values[1], self.data_type);
        if order == Some(std::cmp::Ordering::Greater) {
            return Err(Error::argument(
                "End of date range cannot be less than start of range for BETWEEN operator",
            ));
        }
        Ok(())
    }

    fn validate_coercion(&self) -> Result<()> {
        if !self.data_type.is_numeric() || self.operator.is_pattern() {
            return Ok(());
        }
        for value in &self.values {
            let coerces = match (value, self.data_type) {
                (Value::Null | Value::Bool(_), _) => true,
                (_, DataType::Integer) => value.as_i64().is_some(),
                _ => value.as_f64().is_some(),
            };
            if !coerces {
                return Err(Error::argument(format!(
                    "Value \"{}\" is not a valid {}",
                    value, self.data_type
                )));
            }
        }
        Ok(())
    }
}

/// Single-quote a string literal, doubling embedded quotes.
pub(crate) fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

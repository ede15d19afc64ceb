//! A column bound to an operator value, rendered as a WHERE predicate.

use std::fmt;

use super::operator_value::{Operator, OperatorValue};
use super::parameter_definition::QueryParameterDefinition;
use super::types::DataType;
use crate::error::Result;

/// One filter condition on a (possibly qualified) column.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    qualified_column_name: String,
    operator_value: OperatorValue,
    is_or_range: bool,
}

impl QueryParameter {
    pub fn new(qualified_column_name: impl Into<String>, operator_value: OperatorValue) -> Self {
        QueryParameter {
            qualified_column_name: qualified_column_name.into(),
            operator_value,
            is_or_range: false,
        }
    }

    /// Render every value as its own comparison, OR-joined.
    pub fn or_range(mut self) -> Self {
        self.is_or_range = true;
        self
    }

    /// Bind to a definition's column. A definition's non-default data type
    /// overrides a default (string) one on the operator value.
    pub fn from_definition(
        definition: &QueryParameterDefinition,
        operator_value: OperatorValue,
    ) -> Result<Self> {
        let operator_value = if operator_value.data_type() == DataType::String
            && definition.data_type != DataType::String
        {
            operator_value.with_data_type(definition.data_type)?
        } else {
            operator_value
        };
        Ok(QueryParameter::new(definition.column.clone(), operator_value))
    }

    pub fn qualified_column_name(&self) -> &str {
        &self.qualified_column_name
    }

    pub fn operator_value(&self) -> &OperatorValue {
        &self.operator_value
    }

    pub fn is_or_range(&self) -> bool {
        self.is_or_range
    }

    /// Last segment of the qualified name.
    pub fn column_name(&self) -> &str {
        self.qualified_column_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_column_name)
    }

    /// Human-readable phrase, e.g. `status is any of a, b or c`.
    pub fn to_text(&self) -> String {
        let name = self.column_name();
        let op = self.operator_value.operator();
        let phrase = op.for_text();
        let values: Vec<String> = self
            .operator_value
            .values()
            .iter()
            .map(ToString::to_string)
            .collect();

        match op {
            Operator::IsNull | Operator::NotNull => format!("{} {}", name, phrase),
            Operator::Between => format!("{} {} {} and {}", name, phrase, values[0], values[1]),
            Operator::InOrNull if values.is_empty() => format!("{} is blank", name),
            Operator::In if values.is_empty() => format!("{} {} nothing", name, phrase),
            Operator::In | Operator::InOrNull => {
                format!("{} {} {}", name, phrase, join_or(&values))
            }
            _ if self.is_or_range => format!("{} {} {}", name, phrase, join_or(&values)),
            _ => format!("{} {} {}", name, phrase, values[0]),
        }
    }
}

/// SQL predicate text.
impl fmt::Display for QueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let col = &self.qualified_column_name;
        let op = self.operator_value.operator();
        let values = self.operator_value.values_for_sql();

        match op {
            Operator::IsNull => write!(f, "{} IS NULL", col),
            Operator::NotNull => write!(f, "{} IS NOT NULL", col),
            Operator::Between => write!(f, "{} BETWEEN {} AND {}", col, values[0], values[1]),
            Operator::In if values.is_empty() => f.write_str("(1 = 2)"),
            Operator::In => write!(f, "{} IN ({})", col, values.join(", ")),
            Operator::InOrNull if values.is_empty() => write!(f, "{} IS NULL", col),
            Operator::InOrNull => {
                write!(f, "({} IN ({}) OR {} IS NULL)", col, values.join(", "), col)
            }
            Operator::MatchOrNull => write!(f, "({} = {} OR {} IS NULL)", col, values[0], col),
            _ if self.is_or_range => {
                let parts: Vec<String> = values
                    .iter()
                    .map(|v| format!("{} {} {}", col, op.for_sql(), v))
                    .collect();
                write!(f, "({})", parts.join(" OR "))
            }
            _ => write!(f, "{} {} {}", col, op.for_sql(), values[0]),
        }
    }
}

/// `a`, `a or b`, `a, b or c`.
fn join_or(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

//! UI metadata for a report parameter.
//!
//! A definition describes how a parameter is captured (caption, control,
//! default, selectable values) independently of any value it is later
//! applied with. Definitions are identified by their column: two
//! definitions for the same column compare equal.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::{ControlType, DataType, Value};
use crate::error::{Error, Result};

static DATA_CHANGING_SQL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(insert|update|delete)\b").unwrap());

static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)order\s+by").unwrap());

// ============================================================================
// List sources
// ============================================================================

/// Where a parameter's selectable values come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListDef {
    /// A value-list query, resolved by the caller.
    Query(String),
    /// A literal list of values.
    Values(Vec<Value>),
    /// Literal label/value pairs, in order.
    Mapping(#[serde(with = "ordered_map")] Vec<(String, Value)>),
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOption {
    pub label: String,
    pub value: Value,
}

impl ListOption {
    fn same(value: Value) -> Self {
        ListOption {
            label: value.to_string(),
            value,
        }
    }
}

/// What a [`ListResolver`] hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedList {
    /// Result rows. A one-column row is its own label; otherwise the first
    /// column is the label and the last the value.
    Rows(Vec<Vec<Value>>),
    Scalars(Vec<Value>),
    Pairs(Vec<(String, Value)>),
    /// Comma-separated text.
    Delimited(String),
}

impl ResolvedList {
    fn into_options(self) -> Vec<ListOption> {
        match self {
            ResolvedList::Rows(rows) => rows
                .into_iter()
                .filter_map(|mut row| {
                    let value = row.pop()?;
                    Some(match row.into_iter().next() {
                        Some(label) => ListOption {
                            label: label.to_string(),
                            value,
                        },
                        None => ListOption::same(value),
                    })
                })
                .collect(),
            ResolvedList::Scalars(values) => values.into_iter().map(ListOption::same).collect(),
            ResolvedList::Pairs(pairs) => pairs
                .into_iter()
                .map(|(label, value)| ListOption { label, value })
                .collect(),
            ResolvedList::Delimited(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| ListOption::same(Value::from(s)))
                .collect(),
        }
    }
}

/// Resolves a list definition into options, typically by running the
/// value-list query against a database.
pub trait ListResolver {
    fn resolve(&self, list_def: &ListDef) -> Result<ResolvedList>;
}

impl<F> ListResolver for F
where
    F: Fn(&ListDef) -> Result<ResolvedList>,
{
    fn resolve(&self, list_def: &ListDef) -> Result<ResolvedList> {
        self(list_def)
    }
}

// ============================================================================
// Definition
// ============================================================================

#[derive(Debug, Clone)]
pub struct QueryParameterDefinition {
    /// Possibly qualified column name the parameter filters on.
    pub column: String,
    pub caption: String,
    pub data_type: DataType,
    pub control_type: ControlType,
    pub ui_priority: i32,
    pub default_value: Value,
    list_def: Option<ListDef>,
    ordered_list: bool,
    list_values: Vec<ListOption>,
}

impl QueryParameterDefinition {
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        QueryParameterDefinition {
            caption: column.clone(),
            column,
            data_type: DataType::default(),
            control_type: ControlType::default(),
            ui_priority: 1,
            default_value: Value::Null,
            list_def: None,
            ordered_list: false,
            list_values: Vec::new(),
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_control_type(mut self, control_type: ControlType) -> Self {
        self.control_type = control_type;
        self
    }

    pub fn with_ui_priority(mut self, ui_priority: i32) -> Self {
        self.ui_priority = ui_priority;
        self
    }

    pub fn with_default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn with_list_def(mut self, list_def: ListDef) -> Result<Self> {
        self.set_list_def(Some(list_def))?;
        Ok(self)
    }

    /// Replace the list source. Query text that could modify data is
    /// rejected; an `ORDER BY` in it marks the list as ordered.
    pub fn set_list_def(&mut self, list_def: Option<ListDef>) -> Result<()> {
        let ordered = match &list_def {
            Some(ListDef::Query(sql)) => {
                if DATA_CHANGING_SQL.is_match(sql) {
                    return Err(Error::argument(format!(
                        "List definition for {} must not modify data: {}",
                        self.column, sql
                    )));
                }
                ORDER_BY.is_match(sql)
            }
            _ => false,
        };
        self.list_def = list_def;
        self.ordered_list = ordered;
        self.list_values.clear();
        Ok(())
    }

    pub fn list_def(&self) -> Option<&ListDef> {
        self.list_def.as_ref()
    }

    pub fn list_is_ordered(&self) -> bool {
        self.ordered_list
    }

    /// Whether the options are spelled out in the definition itself.
    pub fn includes_list_options(&self) -> bool {
        matches!(
            self.list_def,
            Some(ListDef::Values(_)) | Some(ListDef::Mapping(_))
        )
    }

    /// Options from the last `build_list*` call.
    pub fn list_values(&self) -> &[ListOption] {
        &self.list_values
    }

    /// Build options from a literal list definition.
    ///
    /// A query definition needs a resolver; see [`Self::build_list_with`].
    pub fn build_list(&mut self) -> Result<&[ListOption]> {
        self.list_values = match &self.list_def {
            None => Vec::new(),
            Some(ListDef::Values(values)) => ResolvedList::Scalars(values.clone()).into_options(),
            Some(ListDef::Mapping(pairs)) => ResolvedList::Pairs(pairs.clone()).into_options(),
            Some(ListDef::Query(_)) => {
                return Err(Error::state(format!(
                    "List definition for {} is a query and needs a resolver",
                    self.column
                )))
            }
        };
        Ok(&self.list_values)
    }

    /// Build options by handing the list definition to `resolver`.
    pub fn build_list_with<R>(&mut self, resolver: &R) -> Result<&[ListOption]>
    where
        R: ListResolver + ?Sized,
    {
        self.list_values = match &self.list_def {
            None => Vec::new(),
            Some(list_def) => resolver.resolve(list_def)?.into_options(),
        };
        log::debug!(
            "built {} list option(s) for {}",
            self.list_values.len(),
            self.column
        );
        Ok(&self.list_values)
    }

    pub fn to_hash(&self) -> ParameterDefinitionHash {
        ParameterDefinitionHash {
            column: self.column.clone(),
            caption: self.caption.clone(),
            data_type: self.data_type,
            control_type: self.control_type,
            ui_priority: self.ui_priority,
            default_value: self.default_value.clone(),
            ordered_list: self.ordered_list,
            list_def: self.list_def.clone(),
            list_values: self.list_values.clone(),
        }
    }

    /// Rebuild from the portable form. The list definition is re-validated.
    pub fn from_hash(hash: ParameterDefinitionHash) -> Result<Self> {
        let mut definition = QueryParameterDefinition::new(hash.column)
            .with_caption(hash.caption)
            .with_data_type(hash.data_type)
            .with_control_type(hash.control_type)
            .with_ui_priority(hash.ui_priority)
            .with_default_value(hash.default_value);
        definition.set_list_def(hash.list_def)?;
        definition.list_values = hash.list_values;
        Ok(definition)
    }
}

impl PartialEq for QueryParameterDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column
    }
}

impl fmt::Display for QueryParameterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PARAM COL: {}: CAPTION: {} TYPE: {} UI: {} DEFAULT: {}",
            self.column, self.caption, self.data_type, self.control_type, self.default_value
        )
    }
}

/// Portable form of a [`QueryParameterDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinitionHash {
    pub column: String,
    pub caption: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub control_type: ControlType,
    #[serde(default = "default_ui_priority")]
    pub ui_priority: i32,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub ordered_list: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_def: Option<ListDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list_values: Vec<ListOption>,
}

fn default_ui_priority() -> i32 {
    1
}

/// Serde adapter keeping label/value pairs as an ordered map.
mod ordered_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use crate::model::types::Value;

    pub fn serialize<S>(pairs: &[(String, Value)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (label, value) in pairs {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, Value)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = Vec<(String, Value)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of labels to values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, value)) = access.next_entry::<String, Value>()? {
                    pairs.push((label, value));
                }
                Ok(pairs)
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

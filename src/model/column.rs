//! One target-list entry of a report's query, plus its UI metadata.
//!
//! Structural attributes (name, namespaced name, function name,
//! fingerprint) are derived from the parsed entry every time the report's
//! SQL is set. Everything else is user data, carried across redefinitions
//! with [`Column::update_from`] and persisted as [`ColumnAttributes`].

use inflector::Inflector;
use serde::{Deserialize, Serialize};
use sqlparser::ast::{Expr, FunctionArg, FunctionArgExpr, FunctionArguments, SelectItem, Value as SqlValue};
use thiserror::Error;

use super::operator_value::quote;
use super::types::DataType;
use crate::error::{Error, Result};
use crate::sql::shape::{join_path, ExprShape};

const AGGREGATES: [&str; 5] = ["sum", "avg", "min", "max", "count"];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FingerprintError {
    #[error("expression `{0}` produced an empty fingerprint")]
    Empty(String),
}

/// Construction options for a [`Column`].
#[derive(Debug, Clone, Default)]
pub struct ColumnOptions {
    pub data_type: DataType,
    pub width: Option<u32>,
    pub format: Option<String>,
    pub hide: bool,
    pub pinned: bool,
    pub groupable: bool,
    pub group_by_seq: Option<u32>,
    pub group_sum: bool,
    pub group_avg: bool,
    pub group_min: bool,
    pub group_max: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    namespaced_name: Option<String>,
    function_name: Option<String>,
    fingerprint: Option<String>,
    source: SelectItem,

    pub sequence_no: usize,
    pub caption: String,
    pub data_type: DataType,
    pub width: Option<u32>,
    pub format: Option<String>,
    pub hide: bool,
    pub pinned: bool,
    pub groupable: bool,
    pub group_by_seq: Option<u32>,
    pub group_sum: bool,
    pub group_avg: bool,
    pub group_min: bool,
    pub group_max: bool,
}

impl Column {
    pub fn new(sequence_no: usize, item: &SelectItem) -> Result<Self> {
        Self::with_options(sequence_no, item, ColumnOptions::default())
    }

    /// Build from a target-list entry. Fails on wildcards and on
    /// expressions that cannot be named without an alias.
    pub fn with_options(sequence_no: usize, item: &SelectItem, options: ColumnOptions) -> Result<Self> {
        let (expr, alias) = match item {
            SelectItem::UnnamedExpr(expr) => (expr, None),
            SelectItem::ExprWithAlias { expr, alias } => (expr, Some(alias.value.clone())),
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                return Err(Error::argument("Cannot have * as a column selector"));
            }
        };

        let shape = ExprShape::of(expr);
        let function_name = match shape {
            ExprShape::FuncCall(func) => func.name.0.last().map(|ident| ident.value.clone()),
            _ => None,
        };
        let namespaced_name = match shape {
            ExprShape::ColumnRef(parts) => Some(join_path(parts)),
            _ => None,
        };
        let name = match (alias, shape) {
            (Some(alias), _) => alias,
            (None, ExprShape::FuncCall(_)) => function_name.clone().unwrap_or_default(),
            (None, ExprShape::ColumnRef(parts)) => parts
                .last()
                .map(|ident| ident.value.clone())
                .unwrap_or_default(),
            (None, other) => {
                return Err(Error::argument(format!(
                    "Unable to name column {} ({}) - give it an alias",
                    sequence_no,
                    other.kind()
                )));
            }
        };
        if name.is_empty() {
            return Err(Error::argument(format!("Column {} has an empty name", sequence_no)));
        }

        let fingerprint = match fingerprint(expr) {
            Ok(fp) => Some(fp),
            Err(err) => {
                log::warn!("column {}: {}", name, err);
                None
            }
        };

        Ok(Column {
            caption: default_caption(&name),
            name,
            namespaced_name,
            function_name,
            fingerprint,
            source: item.clone(),
            sequence_no,
            data_type: options.data_type,
            width: options.width,
            format: options.format,
            hide: options.hide,
            pinned: options.pinned,
            groupable: options.groupable,
            group_by_seq: options.group_by_seq,
            group_sum: options.group_sum,
            group_avg: options.group_avg,
            group_min: options.group_min,
            group_max: options.group_max,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted reference path (`alias.column`) for plain column references.
    pub fn namespaced_name(&self) -> Option<&str> {
        self.namespaced_name.as_deref()
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// The target-list entry this column was built from.
    pub fn source(&self) -> &SelectItem {
        &self.source
    }

    pub fn is_aggregate(&self) -> bool {
        self.function_name
            .as_deref()
            .is_some_and(|f| AGGREGATES.contains(&f.to_lowercase().as_str()))
    }

    /// Whether `item` is structurally the same expression as this column.
    pub fn matches_node(&self, item: &SelectItem) -> bool {
        let Some(expr) = select_item_expr(item) else {
            return false;
        };
        match (&self.fingerprint, fingerprint(expr)) {
            (Some(mine), Ok(theirs)) => *mine == theirs,
            _ => false,
        }
    }

    /// Literal results of a CASE column, first-seen order, no duplicates.
    pub fn case_string_values(&self) -> Vec<String> {
        let mut values = Vec::new();
        if let Some(expr) = select_item_expr(&self.source) {
            if let ExprShape::Case { .. } = ExprShape::of(expr) {
                collect_case_values(expr, &mut values);
            }
        }
        values
    }

    /// Copy user-editable attributes from a previous incarnation.
    pub fn update_from(&mut self, previous: Option<&Column>) -> &mut Self {
        if let Some(prev) = previous {
            self.caption = prev.caption.clone();
            self.data_type = prev.data_type;
            self.width = prev.width;
            self.format = prev.format.clone();
            self.hide = prev.hide;
            self.pinned = prev.pinned;
            self.groupable = prev.groupable;
            self.group_by_seq = prev.group_by_seq;
            self.group_sum = prev.group_sum;
            self.group_avg = prev.group_avg;
            self.group_min = prev.group_min;
            self.group_max = prev.group_max;
        }
        self
    }

    pub fn to_hash(&self) -> ColumnAttributes {
        ColumnAttributes {
            sequence_no: self.sequence_no,
            caption: self.caption.clone(),
            data_type: self.data_type,
            width: self.width,
            format: self.format.clone(),
            hide: self.hide,
            pinned: self.pinned,
            groupable: self.groupable,
            group_by_seq: self.group_by_seq,
            group_sum: self.group_sum,
            group_avg: self.group_avg,
            group_min: self.group_min,
            group_max: self.group_max,
        }
    }

    pub fn modify_from_hash(&mut self, attrs: &ColumnAttributes) {
        self.sequence_no = attrs.sequence_no;
        self.caption = attrs.caption.clone();
        self.data_type = attrs.data_type;
        self.width = attrs.width;
        self.format = attrs.format.clone();
        self.hide = attrs.hide;
        self.pinned = attrs.pinned;
        self.groupable = attrs.groupable;
        self.group_by_seq = attrs.group_by_seq;
        self.group_sum = attrs.group_sum;
        self.group_avg = attrs.group_avg;
        self.group_min = attrs.group_min;
        self.group_max = attrs.group_max;
    }
}

/// Persisted, user-editable column attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAttributes {
    pub sequence_no: usize,
    pub caption: String,
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub hide: bool,
    pub pinned: bool,
    pub groupable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by_seq: Option<u32>,
    pub group_sum: bool,
    pub group_avg: bool,
    pub group_min: bool,
    pub group_max: bool,
}

fn default_caption(name: &str) -> String {
    name.strip_suffix("_id").unwrap_or(name).to_sentence_case()
}

fn select_item_expr(item: &SelectItem) -> Option<&Expr> {
    match item {
        SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => Some(expr),
        _ => None,
    }
}

// ============================================================================
// Fingerprint
// ============================================================================

/// Structural signature of an expression: literals, identifiers and node
/// tags in depth-first order, joined with `.`.
///
/// String literals keep their quotes so `name` and `'name'` differ. Calls,
/// operators and lists are bracketed with `(` / `)` atoms, and call
/// modifiers (`DISTINCT`, `FILTER`, `WITHIN GROUP`, `OVER`) are included.
pub fn fingerprint(expr: &Expr) -> std::result::Result<String, FingerprintError> {
    let mut atoms = Vec::new();
    collect_atoms(expr, &mut atoms);
    if atoms.is_empty() {
        return Err(FingerprintError::Empty(expr.to_string()));
    }
    Ok(atoms.join("."))
}

fn collect_atoms(expr: &Expr, atoms: &mut Vec<String>) {
    match ExprShape::of(expr) {
        ExprShape::ColumnRef(parts) => atoms.extend(parts.iter().map(ToString::to_string)),
        ExprShape::FuncCall(func) => {
            atoms.extend(func.name.0.iter().map(ToString::to_string));
            if !matches!(func.parameters, FunctionArguments::None) {
                atoms.push(func.parameters.to_string());
            }
            atoms.push("(".to_string());
            match &func.args {
                FunctionArguments::None => {}
                FunctionArguments::Subquery(query) => atoms.push(query.to_string()),
                FunctionArguments::List(list) => {
                    if let Some(treatment) = &list.duplicate_treatment {
                        atoms.push(treatment.to_string());
                    }
                    for (index, arg) in list.args.iter().enumerate() {
                        if index > 0 {
                            atoms.push(",".to_string());
                        }
                        collect_arg_atoms(arg, atoms);
                    }
                    atoms.extend(list.clauses.iter().map(ToString::to_string));
                }
            }
            atoms.push(")".to_string());
            if let Some(filter) = &func.filter {
                atoms.push("FILTER".to_string());
                bracketed(atoms, |atoms| collect_atoms(filter, atoms));
            }
            if let Some(treatment) = &func.null_treatment {
                atoms.push(treatment.to_string());
            }
            if !func.within_group.is_empty() {
                atoms.push("WITHIN GROUP".to_string());
                atoms.extend(func.within_group.iter().map(ToString::to_string));
            }
            if let Some(over) = &func.over {
                atoms.push("OVER".to_string());
                atoms.push(over.to_string());
            }
        }
        ExprShape::Const(value) => atoms.push(match value {
            SqlValue::Number(n, _) => n.clone(),
            SqlValue::SingleQuotedString(s) => quote(s),
            SqlValue::Boolean(b) => b.to_string().to_uppercase(),
            SqlValue::Null => "NULL".to_string(),
            other => other.to_string(),
        }),
        ExprShape::Case {
            operand,
            conditions,
            results,
            else_result,
        } => {
            atoms.push("CASE".to_string());
            if let Some(operand) = operand {
                collect_atoms(operand, atoms);
            }
            for (condition, result) in conditions.iter().zip(results) {
                atoms.push("WHEN".to_string());
                collect_atoms(condition, atoms);
                atoms.push("THEN".to_string());
                collect_atoms(result, atoms);
            }
            if let Some(else_result) = else_result {
                atoms.push("ELSE".to_string());
                collect_atoms(else_result, atoms);
            }
            atoms.push("END".to_string());
        }
        ExprShape::TypeCast { expr, data_type } => {
            bracketed(atoms, |atoms| collect_atoms(expr, atoms));
            atoms.push("::".to_string());
            atoms.push(data_type.to_string());
        }
        ExprShape::BinaryExpr { left, op, right } => bracketed(atoms, |atoms| {
            collect_atoms(left, atoms);
            atoms.push(op.to_string());
            collect_atoms(right, atoms);
        }),
        ExprShape::UnaryExpr { op, expr } => {
            atoms.push(op.to_string());
            bracketed(atoms, |atoms| collect_atoms(expr, atoms));
        }
        ExprShape::NullTest { expr, negated } => {
            bracketed(atoms, |atoms| collect_atoms(expr, atoms));
            atoms.push(if negated { "IS NOT NULL" } else { "IS NULL" }.to_string());
        }
        ExprShape::InList {
            expr,
            list,
            negated,
        } => {
            bracketed(atoms, |atoms| collect_atoms(expr, atoms));
            atoms.push(if negated { "NOT IN" } else { "IN" }.to_string());
            collect_list_atoms(list, atoms);
        }
        ExprShape::Between {
            expr,
            low,
            high,
            negated,
        } => {
            bracketed(atoms, |atoms| collect_atoms(expr, atoms));
            atoms.push(if negated { "NOT BETWEEN" } else { "BETWEEN" }.to_string());
            bracketed(atoms, |atoms| collect_atoms(low, atoms));
            atoms.push("AND".to_string());
            bracketed(atoms, |atoms| collect_atoms(high, atoms));
        }
        ExprShape::Nested(inner) => bracketed(atoms, |atoms| collect_atoms(inner, atoms)),
        ExprShape::SubLink(query) => {
            atoms.push("SUBQUERY".to_string());
            atoms.push(query.to_string());
        }
        ExprShape::Array(elems) => {
            atoms.push("ARRAY".to_string());
            collect_list_atoms(elems, atoms);
        }
        ExprShape::Unsupported(other) => {
            // Kept as one opaque atom so distinct unknown shapes stay distinct.
            log::debug!("fingerprint keeps unsupported expression `{}` as text", other);
            atoms.push(format!("{{{}}}", other));
        }
    }
}

fn collect_arg_atoms(arg: &FunctionArg, atoms: &mut Vec<String>) {
    let arg_expr = match arg {
        FunctionArg::Unnamed(arg_expr) => arg_expr,
        FunctionArg::Named { name, arg, .. } => {
            atoms.push(format!("{}=>", name));
            arg
        }
        other => {
            atoms.push(other.to_string());
            return;
        }
    };
    match arg_expr {
        FunctionArgExpr::Expr(e) => collect_atoms(e, atoms),
        FunctionArgExpr::QualifiedWildcard(name) => {
            atoms.extend(name.0.iter().map(ToString::to_string));
            atoms.push("*".to_string());
        }
        FunctionArgExpr::Wildcard => atoms.push("*".to_string()),
    }
}

fn collect_list_atoms(list: &[Expr], atoms: &mut Vec<String>) {
    bracketed(atoms, |atoms| {
        for (index, item) in list.iter().enumerate() {
            if index > 0 {
                atoms.push(",".to_string());
            }
            collect_atoms(item, atoms);
        }
    });
}

fn bracketed(atoms: &mut Vec<String>, inner: impl FnOnce(&mut Vec<String>)) {
    atoms.push("(".to_string());
    inner(atoms);
    atoms.push(")".to_string());
}

// ============================================================================
// CASE values
// ============================================================================

fn collect_case_values(expr: &Expr, values: &mut Vec<String>) {
    let ExprShape::Case {
        results,
        else_result,
        ..
    } = ExprShape::of(expr)
    else {
        return;
    };
    for result in results.iter().chain(else_result) {
        let found = match ExprShape::of(result) {
            ExprShape::Const(SqlValue::SingleQuotedString(s)) => Some(s.clone()),
            ExprShape::Const(SqlValue::Number(n, _)) => Some(n.clone()),
            ExprShape::Case { .. } => {
                collect_case_values(result, values);
                None
            }
            _ => None,
        };
        if let Some(value) = found {
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }
}

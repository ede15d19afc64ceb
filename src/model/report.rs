//! The report: one parsed SELECT plus its columns, parameters and paging.
//!
//! A report keeps two trees. The *parsed* tree is the baseline produced by
//! [`Report::set_sql`]. The *working* tree is a copy derived from it by
//! [`Report::apply_params`] / [`Report::replace_where`]; it is rebuilt from
//! the baseline on every application that carries parameters and discarded
//! whenever the SQL is set again. Runnable SQL comes from the working tree when there is one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlparser::ast::{BinaryOperator, Expr, OrderByExpr, Query, SelectItem, SetExpr, Statement};

use super::column::{Column, ColumnAttributes};
use super::parameter_definition::{ParameterDefinitionHash, QueryParameterDefinition};
use super::query_parameter::QueryParameter;
use crate::error::{Error, Result};
use crate::persist::ReportPersistor;
use crate::sql::dialect::Dialect;
use crate::sql::engine::{self, deparse};
use crate::sql::rewrite::{self, refers_to};

/// How customizations are carried over when the SQL is redefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnMatch {
    /// Match previous columns by name.
    #[default]
    Name,
    /// Match by expression fingerprint first, then by name.
    Fingerprint,
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub caption: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub external_settings: serde_json::Map<String, serde_json::Value>,
    pub column_match: ColumnMatch,
    sql: Option<String>,
    parsed: Option<Query>,
    working: Option<Query>,
    columns: Vec<Column>,
    order: Option<Vec<OrderByExpr>>,
    query_parameter_definitions: Vec<QueryParameterDefinition>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caption(caption: impl Into<String>) -> Self {
        Report {
            caption: Some(caption.into()),
            ..Self::default()
        }
    }

    // ========================================================================
    // SQL
    // ========================================================================

    /// The SQL text exactly as last set.
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// Parse and adopt new SQL.
    ///
    /// The statement must be a single plain SELECT whose target entries all
    /// have distinct names and none of which is a wildcard. Customizations
    /// of matching previous columns are carried over. On failure the report
    /// is left exactly as it was.
    pub fn set_sql(&mut self, sql: &str) -> Result<()> {
        let mut statements = engine::parse(sql)?;
        if statements.len() != 1 {
            return Err(Error::argument("Only a single SELECT statement is allowed"));
        }
        let query = match statements.pop() {
            Some(Statement::Query(query)) if matches!(*query.body, SetExpr::Select(_)) => *query,
            _ => return Err(Error::argument("Only SELECT is allowed")),
        };

        let columns = self.build_columns(&query)?;
        let limit = query
            .limit
            .as_ref()
            .map(|expr| literal_count("LIMIT", expr))
            .transpose()?;
        let offset = query
            .offset
            .as_ref()
            .map(|offset| literal_count("OFFSET", &offset.value))
            .transpose()?;

        log::debug!("report sql set with {} column(s)", columns.len());
        self.order = query.order_by.as_ref().map(|o| o.exprs.clone());
        self.limit = limit;
        self.offset = offset;
        self.columns = columns;
        self.parsed = Some(query);
        self.working = None;
        self.sql = Some(sql.to_string());
        Ok(())
    }

    /// Columns for every target entry of `query`, with customizations
    /// copied from the current columns.
    fn build_columns(&self, query: &Query) -> Result<Vec<Column>> {
        let projection = rewrite::select(query)
            .map(|s| s.projection.as_slice())
            .unwrap_or_default();

        let mut columns: Vec<Column> = Vec::with_capacity(projection.len());
        for (index, item) in projection.iter().enumerate() {
            let mut column = Column::new(index + 1, item)?;
            if columns.iter().any(|c| c.name() == column.name()) {
                return Err(Error::argument(format!(
                    "SQL has duplicate column names: {}",
                    column.name()
                )));
            }
            let previous = self.previous_column(&column);
            column.update_from(previous);
            columns.push(column);
        }
        Ok(columns)
    }

    /// The current column whose customizations `column` inherits. In
    /// fingerprint mode a same-named match wins over other matches.
    fn previous_column(&self, column: &Column) -> Option<&Column> {
        let same_name = |c: &&Column| c.name() == column.name();
        let by_name = || self.columns.iter().find(same_name);
        match (self.column_match, column.fingerprint()) {
            (ColumnMatch::Fingerprint, Some(fp)) => {
                let same_shape = |c: &&Column| c.fingerprint() == Some(fp);
                self.columns
                    .iter()
                    .filter(same_shape)
                    .find(same_name)
                    .or_else(|| self.columns.iter().find(same_shape))
                    .or_else(by_name)
            }
            _ => by_name(),
        }
    }

    fn parsed(&self) -> Result<&Query> {
        self.parsed
            .as_ref()
            .ok_or_else(|| Error::state("SQL string has not yet been set"))
    }

    /// Relation names the query reads from.
    pub fn tables(&self) -> Result<Vec<String>> {
        Ok(rewrite::tables(self.parsed()?))
    }

    // ========================================================================
    // Columns
    // ========================================================================

    /// Columns in target-list order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name() == name)
    }

    /// Columns sorted by `sequence_no`.
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.sequence_no);
        columns
    }

    fn require_columns(&self, names: &[&str]) -> Result<Vec<Column>> {
        names
            .iter()
            .map(|name| {
                self.column(name)
                    .cloned()
                    .ok_or_else(|| Error::argument(format!("Unknown column: {}", name)))
            })
            .collect()
    }

    /// Remove columns from the query itself, along with any ORDER BY or
    /// GROUP BY key that references them.
    pub fn remove_columns(&mut self, names: &[&str]) -> Result<()> {
        let removed = self.require_columns(names)?;
        let mut parsed = self.parsed()?.clone();
        let mut working = self.working.clone();

        for column in &removed {
            parsed = strip_column(parsed, column);
            working = working.map(|tree| strip_column(tree, column));
            if let (Some(path), Some(order)) = (column.namespaced_name(), self.order.as_mut()) {
                order.retain(|o| !refers_to(&o.expr, path));
            }
        }
        if self.order.as_ref().is_some_and(Vec::is_empty) {
            self.order = None;
        }

        log::debug!("removed column(s) {}", names.join(", "));
        self.columns.retain(|c| !names.contains(&c.name()));
        self.sql = Some(deparse(&parsed));
        self.parsed = Some(parsed);
        self.working = working;
        Ok(())
    }

    /// Replace columns with one `ARRAY[...]` column placed first.
    pub fn convert_columns_to_array(&mut self, new_name: &str, names: &[&str]) -> Result<()> {
        let converted = self.require_columns(names)?;
        let elements: Vec<String> = converted
            .iter()
            .filter_map(|c| match c.source() {
                SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                    Some(expr.to_string())
                }
                _ => None,
            })
            .collect();
        let target = rewrite::parse_target(&format!(
            "ARRAY[{}] AS {}",
            elements.join(", "),
            new_name
        ))?;

        let mut parsed = self.parsed()?.clone();
        for column in &converted {
            parsed = rewrite::without_target(parsed, column.source());
        }
        let parsed = rewrite::with_leading_target(parsed, target);
        let columns = self.build_columns(&parsed)?;

        log::debug!("converted {} into array column {}", names.join(", "), new_name);
        self.columns = columns;
        self.sql = Some(deparse(&parsed));
        self.parsed = Some(parsed);
        self.working = None;
        Ok(())
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    pub fn query_parameter_definitions(&self) -> &[QueryParameterDefinition] {
        &self.query_parameter_definitions
    }

    pub fn parameter_definition(&self, column: &str) -> Option<&QueryParameterDefinition> {
        self.query_parameter_definitions
            .iter()
            .find(|def| def.column == column)
    }

    pub fn add_parameter_definition(&mut self, definition: QueryParameterDefinition) -> Result<()> {
        if self.query_parameter_definitions.contains(&definition) {
            return Err(Error::argument(format!(
                "Duplicate parameter definition for {}",
                definition.column
            )));
        }
        self.query_parameter_definitions.push(definition);
        Ok(())
    }

    /// Build the working tree from the baseline with the current limit and
    /// offset, AND-ing `params` onto any existing WHERE clause.
    ///
    /// With no `params` the last applied filter is kept and only paging is
    /// refreshed.
    pub fn apply_params(&mut self, params: &[QueryParameter]) -> Result<()> {
        let tree = match &self.working {
            Some(working) if params.is_empty() => working.clone(),
            _ => self.parsed()?.clone(),
        };
        self.apply_to(tree, params)
    }

    /// Like [`Self::apply_params`], but the baseline WHERE clause is dropped
    /// so only `params` filter the query.
    pub fn replace_where(&mut self, params: &[QueryParameter]) -> Result<()> {
        let tree = rewrite::with_where(self.parsed()?.clone(), None);
        self.apply_to(tree, params)
    }

    fn apply_to(&mut self, tree: Query, params: &[QueryParameter]) -> Result<()> {
        let tree = rewrite::with_offset(rewrite::with_limit(tree, self.limit), self.offset);
        if params.is_empty() {
            self.working = Some(tree);
            return Ok(());
        }

        let predicates = params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" AND ");
        // The existing clause is merged as text. A top-level OR is
        // parenthesized so the new predicates bind to all of it.
        let merged = match rewrite::select(&tree).and_then(|s| s.selection.as_ref()) {
            None => predicates,
            Some(existing @ Expr::BinaryOp {
                op: BinaryOperator::Or,
                ..
            }) => format!("({}) AND {}", existing, predicates),
            Some(existing) => format!("{} AND {}", existing, predicates),
        };
        log::debug!("applying WHERE {}", merged);

        let selection = rewrite::parse_where(&merged)?;
        self.working = Some(rewrite::with_where(tree, selection));
        Ok(())
    }

    // ========================================================================
    // Ordering and output
    // ========================================================================

    pub fn order(&self) -> Option<&[OrderByExpr]> {
        self.order.as_deref()
    }

    /// Replace the sort list from ORDER BY text. `None` or blank clears it.
    pub fn set_order_by(&mut self, order: Option<&str>) -> Result<()> {
        self.order = match order.map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(rewrite::parse_order_by(text)?),
        };
        Ok(())
    }

    fn runnable_tree(&self) -> Result<Query> {
        let tree = match &self.working {
            Some(working) => working.clone(),
            None => self.parsed()?.clone(),
        };
        Ok(rewrite::with_order_by(tree, self.order.as_deref()))
    }

    /// SQL to execute, reflecting applied parameters, paging and order.
    pub fn runnable_sql(&self) -> Result<String> {
        Ok(deparse(&self.runnable_tree()?))
    }

    /// Runnable SQL rewritten for `dialect`.
    pub fn runnable_sql_delimited(&self, dialect: Dialect) -> Result<String> {
        let tree = self.runnable_tree()?;
        dialect.delimit(&deparse(&tree), tree.offset.is_some())
    }

    /// `SELECT count(*)` over the runnable query, without order or paging.
    pub fn count_query(&self) -> Result<String> {
        let counted = rewrite::count_rows(&self.runnable_tree()?)?;
        Ok(deparse(&counted))
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn to_hash(&self) -> ReportHash {
        ReportHash {
            caption: self.caption.clone(),
            sql: self.sql.clone().unwrap_or_default(),
            limit: self.limit,
            offset: self.offset,
            external_settings: serde_json::Value::Object(self.external_settings.clone()),
            column_match: self.column_match,
            columns: self
                .columns
                .iter()
                .map(|c| (c.name().to_string(), c.to_hash()))
                .collect(),
            query_parameter_definitions: self
                .query_parameter_definitions
                .iter()
                .map(QueryParameterDefinition::to_hash)
                .collect(),
        }
    }

    /// Replay the saved SQL, then overlay the saved attributes. Blank SQL
    /// yields a report with no SQL set, as saved by an empty report.
    pub fn update_from_hash(&mut self, hash: ReportHash) -> Result<()> {
        let serde_json::Value::Object(external_settings) = hash.external_settings else {
            return Err(Error::argument("External settings must be a map"));
        };

        let mut next = Report {
            column_match: hash.column_match,
            ..Report::default()
        };
        if !hash.sql.trim().is_empty() {
            next.columns = self.columns.clone();
            next.set_sql(&hash.sql)?;
        }
        for (name, attrs) in &hash.columns {
            let column = next.column_mut(name).ok_or_else(|| {
                Error::argument(format!("Saved column {} is not in the report SQL", name))
            })?;
            column.modify_from_hash(attrs);
        }
        for definition in hash.query_parameter_definitions {
            next.add_parameter_definition(QueryParameterDefinition::from_hash(definition)?)?;
        }
        next.caption = hash.caption;
        next.limit = hash.limit;
        next.offset = hash.offset;
        next.external_settings = external_settings;

        *self = next;
        Ok(())
    }

    pub fn from_hash(hash: ReportHash) -> Result<Self> {
        let mut report = Report::new();
        report.update_from_hash(hash)?;
        Ok(report)
    }

    pub fn save(&self, persistor: &dyn ReportPersistor) -> Result<()> {
        persistor.save(&self.to_hash())?;
        Ok(())
    }

    pub fn load(persistor: &dyn ReportPersistor) -> Result<Self> {
        Self::from_hash(persistor.load()?)
    }
}

fn strip_column(tree: Query, column: &Column) -> Query {
    let tree = rewrite::without_target(tree, column.source());
    match column.namespaced_name() {
        Some(path) => rewrite::without_group_key(rewrite::without_sort_key(tree, path), path),
        None => tree,
    }
}

fn literal_count(clause: &str, expr: &Expr) -> Result<u64> {
    rewrite::int_value(expr).ok_or_else(|| {
        Error::argument(format!("{} must be an integer literal, got {}", clause, expr))
    })
}

/// Portable form of a [`Report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHash {
    #[serde(default)]
    pub caption: Option<String>,
    pub sql: String,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default = "empty_settings")]
    pub external_settings: serde_json::Value,
    #[serde(default)]
    pub column_match: ColumnMatch,
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnAttributes>,
    #[serde(default)]
    pub query_parameter_definitions: Vec<ParameterDefinitionHash>,
}

fn empty_settings() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

//! Tree transformations over a parsed query.
//!
//! Every transformation takes a `Query` by value and hands back the changed
//! tree, so a report's baseline and working trees never alias each other.
//! The only nodes built by hand are the integer literals used for LIMIT and
//! OFFSET; everything else is lifted out of a parsed fragment.

use sqlparser::ast::{
    Expr, GroupByExpr, Offset, OffsetRows, OrderBy, OrderByExpr, Query, Select, SelectItem,
    SetExpr, TableFactor, TableWithJoins, Value,
};

use super::engine::{parse_fragment, EngineError};
use super::shape::{join_path, ExprShape};

// ============================================================================
// Access
// ============================================================================

/// The SELECT body of a query, if it has one.
pub fn select(query: &Query) -> Option<&Select> {
    match &*query.body {
        SetExpr::Select(select) => Some(&**select),
        _ => None,
    }
}

/// Mutable access to the SELECT body of a query.
pub fn select_mut(query: &mut Query) -> Option<&mut Select> {
    match &mut *query.body {
        SetExpr::Select(select) => Some(&mut **select),
        _ => None,
    }
}

/// Integer literal node.
pub fn int_literal(value: u64) -> Expr {
    Expr::Value(Value::Number(value.to_string(), false))
}

/// Read a non-negative integer literal.
pub fn int_value(expr: &Expr) -> Option<u64> {
    match expr {
        Expr::Value(Value::Number(text, _)) => text.parse().ok(),
        _ => None,
    }
}

/// Whether an expression is a column reference with the given dotted path.
pub fn refers_to(expr: &Expr, path: &str) -> bool {
    matches!(ExprShape::of(expr), ExprShape::ColumnRef(parts) if join_path(parts) == path)
}

// ============================================================================
// Clause replacement
// ============================================================================

/// Set or clear LIMIT. Zero clears it.
pub fn with_limit(mut query: Query, limit: Option<u64>) -> Query {
    query.limit = limit.filter(|n| *n > 0).map(int_literal);
    query
}

/// Set or clear OFFSET. Zero clears it.
pub fn with_offset(mut query: Query, offset: Option<u64>) -> Query {
    query.offset = offset.filter(|n| *n > 0).map(|n| Offset {
        value: int_literal(n),
        rows: OffsetRows::None,
    });
    query
}

/// Replace the ORDER BY list. `None` or an empty list clears it.
pub fn with_order_by(mut query: Query, order: Option<&[OrderByExpr]>) -> Query {
    query.order_by = match order {
        Some(exprs) if !exprs.is_empty() => Some(OrderBy {
            exprs: exprs.to_vec(),
            interpolate: None,
        }),
        _ => None,
    };
    query
}

/// Replace the WHERE clause.
pub fn with_where(mut query: Query, selection: Option<Expr>) -> Query {
    if let Some(select) = select_mut(&mut query) {
        select.selection = selection;
    }
    query
}

// ============================================================================
// Fragment lifting
// ============================================================================

/// Parse `SELECT 1 WHERE <predicate>` and lift its WHERE clause.
pub fn parse_where(predicate: &str) -> Result<Option<Expr>, EngineError> {
    let fragment = parse_fragment(&format!("SELECT 1 WHERE {}", predicate))?;
    Ok(select(&fragment).and_then(|s| s.selection.clone()))
}

/// Parse `SELECT 1 ORDER BY <list>` and lift its sort list.
pub fn parse_order_by(list: &str) -> Result<Vec<OrderByExpr>, EngineError> {
    let fragment = parse_fragment(&format!("SELECT 1 ORDER BY {}", list))?;
    Ok(fragment.order_by.map(|o| o.exprs).unwrap_or_default())
}

/// Parse `SELECT <item>` and lift its single target entry.
pub fn parse_target(item: &str) -> Result<SelectItem, EngineError> {
    let fragment = parse_fragment(&format!("SELECT {}", item))?;
    select(&fragment)
        .and_then(|s| s.projection.first().cloned())
        .ok_or_else(|| EngineError::NotAQuery(item.to_string()))
}

// ============================================================================
// Target list, sort and group keys
// ============================================================================

/// Remove the first target entry equal to `item`.
pub fn without_target(mut query: Query, item: &SelectItem) -> Query {
    if let Some(select) = select_mut(&mut query) {
        if let Some(pos) = select.projection.iter().position(|p| p == item) {
            select.projection.remove(pos);
        }
    }
    query
}

/// Insert a target entry at the front of the target list.
pub fn with_leading_target(mut query: Query, item: SelectItem) -> Query {
    if let Some(select) = select_mut(&mut query) {
        select.projection.insert(0, item);
    }
    query
}

/// Remove every ORDER BY key that references `path`.
pub fn without_sort_key(mut query: Query, path: &str) -> Query {
    if let Some(order_by) = query.order_by.as_mut() {
        order_by.exprs.retain(|o| !refers_to(&o.expr, path));
        if order_by.exprs.is_empty() {
            query.order_by = None;
        }
    }
    query
}

/// Remove every GROUP BY key that references `path`.
pub fn without_group_key(mut query: Query, path: &str) -> Query {
    if let Some(select) = select_mut(&mut query) {
        if let GroupByExpr::Expressions(keys, _) = &mut select.group_by {
            keys.retain(|key| !refers_to(key, path));
        }
    }
    query
}

fn has_group_keys(select: &Select) -> bool {
    match &select.group_by {
        GroupByExpr::All(_) => true,
        GroupByExpr::Expressions(keys, _) => !keys.is_empty(),
    }
}

// ============================================================================
// Derived queries
// ============================================================================

/// A `count(*)` variant of `query` without ordering or paging.
///
/// Plain queries get their target list replaced. Grouped, DISTINCT or
/// HAVING queries are wrapped so the count is over result rows.
pub fn count_rows(query: &Query) -> Result<Query, EngineError> {
    let mut base = query.clone();
    base.order_by = None;
    base.limit = None;
    base.offset = None;
    base.fetch = None;

    let wrap = match select(&base) {
        Some(s) => s.distinct.is_some() || s.having.is_some() || has_group_keys(s),
        None => true,
    };
    if wrap {
        return parse_fragment(&format!("SELECT count(*) FROM ({}) AS counted_rows", base));
    }

    let counter = parse_target("count(*)")?;
    if let Some(select) = select_mut(&mut base) {
        select.projection = vec![counter];
    }
    Ok(base)
}

/// Relation names referenced in FROM and JOIN clauses, first-seen order.
pub fn tables(query: &Query) -> Vec<String> {
    let mut names = Vec::new();
    collect_query_tables(query, &mut names);
    names
}

fn collect_query_tables(query: &Query, names: &mut Vec<String>) {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            collect_query_tables(&cte.query, names);
        }
    }
    collect_set_tables(&query.body, names);
}

fn collect_set_tables(body: &SetExpr, names: &mut Vec<String>) {
    match body {
        SetExpr::Select(select) => {
            for table in &select.from {
                collect_join_tables(table, names);
            }
        }
        SetExpr::Query(query) => collect_query_tables(query, names),
        SetExpr::SetOperation { left, right, .. } => {
            collect_set_tables(left, names);
            collect_set_tables(right, names);
        }
        _ => {}
    }
}

fn collect_join_tables(table: &TableWithJoins, names: &mut Vec<String>) {
    collect_factor_tables(&table.relation, names);
    for join in &table.joins {
        collect_factor_tables(&join.relation, names);
    }
}

fn collect_factor_tables(factor: &TableFactor, names: &mut Vec<String>) {
    match factor {
        TableFactor::Table { name, .. } => {
            let name = name.to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        TableFactor::Derived { subquery, .. } => collect_query_tables(subquery, names),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => collect_join_tables(table_with_joins, names),
        _ => {}
    }
}

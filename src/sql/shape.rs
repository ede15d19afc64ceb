//! Closed view over the expression shapes the report model understands.
//!
//! The engine's `Expr` is a very large enum. Name resolution, fingerprinting
//! and CASE value extraction only care about a handful of its variants, so
//! they match on [`ExprShape`] instead. Anything outside that vocabulary is
//! [`ExprShape::Unsupported`] and each caller decides whether to skip it or
//! fail.

use std::slice;

use sqlparser::ast::{BinaryOperator, DataType, Expr, Function, Ident, Query, UnaryOperator, Value};

/// A borrowed, classified expression node.
#[derive(Debug, Clone, Copy)]
pub enum ExprShape<'a> {
    /// `col` or `alias.col`.
    ColumnRef(&'a [Ident]),
    /// `fn(args...)`.
    FuncCall(&'a Function),
    /// A literal constant.
    Const(&'a Value),
    /// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`.
    Case {
        operand: Option<&'a Expr>,
        conditions: &'a [Expr],
        results: &'a [Expr],
        else_result: Option<&'a Expr>,
    },
    /// `CAST(expr AS type)` or `expr::type`.
    TypeCast {
        expr: &'a Expr,
        data_type: &'a DataType,
    },
    BinaryExpr {
        left: &'a Expr,
        op: &'a BinaryOperator,
        right: &'a Expr,
    },
    UnaryExpr {
        op: &'a UnaryOperator,
        expr: &'a Expr,
    },
    /// `expr IS [NOT] NULL`.
    NullTest { expr: &'a Expr, negated: bool },
    /// `expr [NOT] IN (list)`.
    InList {
        expr: &'a Expr,
        list: &'a [Expr],
        negated: bool,
    },
    /// `expr [NOT] BETWEEN low AND high`.
    Between {
        expr: &'a Expr,
        low: &'a Expr,
        high: &'a Expr,
        negated: bool,
    },
    /// `( expr )`.
    Nested(&'a Expr),
    /// `( SELECT ... )`.
    SubLink(&'a Query),
    /// `ARRAY[...]`.
    Array(&'a [Expr]),
    Unsupported(&'a Expr),
}

impl<'a> ExprShape<'a> {
    /// Classify an expression.
    pub fn of(expr: &'a Expr) -> Self {
        match expr {
            Expr::Identifier(ident) => ExprShape::ColumnRef(slice::from_ref(ident)),
            Expr::CompoundIdentifier(parts) => ExprShape::ColumnRef(parts),
            Expr::Function(func) => ExprShape::FuncCall(func),
            Expr::Value(value) => ExprShape::Const(value),
            Expr::Case {
                operand,
                conditions,
                results,
                else_result,
                ..
            } => ExprShape::Case {
                operand: operand.as_deref(),
                conditions,
                results,
                else_result: else_result.as_deref(),
            },
            Expr::Cast {
                expr, data_type, ..
            } => ExprShape::TypeCast { expr, data_type },
            Expr::BinaryOp { left, op, right, .. } => ExprShape::BinaryExpr { left, op, right },
            Expr::UnaryOp { op, expr, .. } => ExprShape::UnaryExpr { op, expr },
            Expr::IsNull(expr) => ExprShape::NullTest {
                expr,
                negated: false,
            },
            Expr::IsNotNull(expr) => ExprShape::NullTest {
                expr,
                negated: true,
            },
            Expr::InList {
                expr,
                list,
                negated,
                ..
            } => ExprShape::InList {
                expr,
                list,
                negated: *negated,
            },
            Expr::Between {
                expr,
                negated,
                low,
                high,
                ..
            } => ExprShape::Between {
                expr,
                low,
                high,
                negated: *negated,
            },
            Expr::Nested(inner) => ExprShape::Nested(inner),
            Expr::Subquery(query) => ExprShape::SubLink(query),
            Expr::Array(array) => ExprShape::Array(&array.elem),
            other => ExprShape::Unsupported(other),
        }
    }

    /// Short tag for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExprShape::ColumnRef(_) => "column reference",
            ExprShape::FuncCall(_) => "function call",
            ExprShape::Const(_) => "constant",
            ExprShape::Case { .. } => "CASE expression",
            ExprShape::TypeCast { .. } => "type cast",
            ExprShape::BinaryExpr { .. } => "binary expression",
            ExprShape::UnaryExpr { .. } => "unary expression",
            ExprShape::NullTest { .. } => "null test",
            ExprShape::InList { .. } => "IN list",
            ExprShape::Between { .. } => "BETWEEN",
            ExprShape::Nested(_) => "nested expression",
            ExprShape::SubLink(_) => "subquery",
            ExprShape::Array(_) => "array",
            ExprShape::Unsupported(_) => "unsupported expression",
        }
    }
}

/// Dot-joined identifier path, e.g. `u.name`.
pub fn join_path(parts: &[Ident]) -> String {
    parts
        .iter()
        .map(|ident| ident.value.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

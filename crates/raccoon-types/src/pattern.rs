// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compile-time values and first-match arm selection.

use raccoon_ast::expr::{Expr, ExprKind, Literal, MatchArm, Pattern, PatternKind, UnaryOp};

/// A value known at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl ConstValue {
    /// The value of a literal expression, looking through negation and parens.
    pub fn from_expr(expr: &Expr) -> Option<ConstValue> {
        match &expr.kind {
            ExprKind::Int(n) => Some(ConstValue::Int(*n)),
            ExprKind::Float(x) => Some(ConstValue::Float(*x)),
            ExprKind::String(s) => Some(ConstValue::Str(s.clone())),
            ExprKind::Bool(b) => Some(ConstValue::Bool(*b)),
            ExprKind::Paren(inner) => ConstValue::from_expr(inner),
            ExprKind::Unary { op: UnaryOp::Neg, operand } => match ConstValue::from_expr(operand)? {
                ConstValue::Int(n) => Some(ConstValue::Int(n.wrapping_neg())),
                ConstValue::Float(x) => Some(ConstValue::Float(-x)),
                _ => None,
            },
            _ => None,
        }
    }

    fn matches_literal(&self, lit: &Literal) -> bool {
        match (self, lit) {
            (ConstValue::Int(a), Literal::Int(b)) => a == b,
            (ConstValue::Float(a), Literal::Float(b)) => a == b,
            // An int pattern against a float scrutinee was widened.
            (ConstValue::Float(a), Literal::Int(b)) => *a == *b as f64,
            (ConstValue::Str(a), Literal::Str(b)) => a == b,
            (ConstValue::Bool(a), Literal::Bool(b)) => a == b,
            _ => false,
        }
    }
}

/// Whether `pattern` matches `value`. Paths never match a literal value.
pub fn pattern_matches(pattern: &Pattern, value: &ConstValue) -> bool {
    match &pattern.kind {
        PatternKind::Wildcard | PatternKind::Binding(_) => true,
        PatternKind::Literal(lit) => value.matches_literal(lit),
        PatternKind::Or(alternatives) => alternatives.iter().any(|p| pattern_matches(p, value)),
        PatternKind::Path(_) | PatternKind::TupleStruct { .. } | PatternKind::Struct { .. } => false,
    }
}

/// Index of the first arm whose pattern matches `value`.
pub fn select_arm(arms: &[MatchArm], value: &ConstValue) -> Option<usize> {
    arms.iter().position(|arm| pattern_matches(&arm.pattern, value))
}

/// Whether `pattern` matches every value of its type.
pub fn is_irrefutable(pattern: &Pattern) -> bool {
    match &pattern.kind {
        PatternKind::Wildcard | PatternKind::Binding(_) => true,
        PatternKind::Or(alternatives) => alternatives.iter().any(is_irrefutable),
        // A struct has a single shape, so only its fields can refute.
        PatternKind::Struct { fields, .. } => fields.iter().all(|f| is_irrefutable(&f.pattern)),
        PatternKind::Literal(_) | PatternKind::Path(_) | PatternKind::TupleStruct { .. } => false,
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type checker error and warning types.

use raccoon_ast::Span;

use crate::types::Type;

/// A type error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("mismatched types: expected {expected}, found {found}")]
    Mismatch { expected: Type, found: Type, span: Span },
    #[error("this function takes {expected} argument{} but {found} {} supplied", plural(*expected), were(*found))]
    ArityMismatch { expected: usize, found: usize, span: Span },
    #[error("type {ty} is not callable")]
    NotCallable { ty: Type, span: Span },
    /// `candidates` are the fields the type does have.
    #[error("no field `{field}` on type {ty}")]
    NoSuchField { ty: Type, field: String, candidates: Vec<String>, span: Span },
    #[error("field `{field}` specified more than once")]
    DuplicateField { field: String, span: Span, previous: Span },
    #[error("missing field{} {} in initializer of {ty}", plural(fields.len()), quoted(fields))]
    MissingFields { ty: Type, fields: Vec<String>, span: Span },
    #[error("`{name}` is not a struct with named fields")]
    NotANamedStruct { name: String, span: Span },
    #[error("cannot assign twice to constant `{name}`")]
    AssignToConst { name: String, span: Span, decl_span: Span },
    #[error("invalid left-hand side of assignment")]
    InvalidAssignTarget { span: Span },
    #[error("function `{function}` must return a value of type {expected}")]
    MissingReturn { function: String, expected: Type, span: Span },
    #[error("cannot infer the element type of an empty array")]
    CannotInfer { span: Span },
    #[error("range start {start} is greater than its end {end}")]
    InvalidRange { start: i64, end: i64, span: Span },
    #[error("ranges are only allowed as `for` iterables and slice indices")]
    MisplacedRange { span: Span },
    #[error("cannot apply `{op}` to a value of type {ty}")]
    InvalidOperand { op: String, ty: Type, span: Span },
    #[error("cannot index into a value of type {ty}")]
    NotIndexable { ty: Type, span: Span },
    #[error("cannot iterate over a value of type {ty}")]
    NotIterable { ty: Type, span: Span },
    #[error("expected value, found {what} `{name}`")]
    NotAValue { name: String, what: String, span: Span },
    #[error("`{name}` cannot print a value of type ()")]
    UnitArgument { name: String, span: Span },
    #[error("pattern of {ty} does not mention field{} {}", plural(fields.len()), quoted(fields))]
    MissingPatternFields { ty: Type, fields: Vec<String>, span: Span },
}

impl TypeError {
    /// The primary span of the error.
    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::NotCallable { span, .. }
            | TypeError::NoSuchField { span, .. }
            | TypeError::DuplicateField { span, .. }
            | TypeError::MissingFields { span, .. }
            | TypeError::NotANamedStruct { span, .. }
            | TypeError::AssignToConst { span, .. }
            | TypeError::InvalidAssignTarget { span }
            | TypeError::MissingReturn { span, .. }
            | TypeError::CannotInfer { span }
            | TypeError::InvalidRange { span, .. }
            | TypeError::MisplacedRange { span }
            | TypeError::InvalidOperand { span, .. }
            | TypeError::NotIndexable { span, .. }
            | TypeError::NotIterable { span, .. }
            | TypeError::NotAValue { span, .. }
            | TypeError::UnitArgument { span, .. }
            | TypeError::MissingPatternFields { span, .. } => *span,
        }
    }
}

/// A type warning. Warnings never stop compilation on their own.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeWarning {
    #[error("unreachable pattern")]
    UnreachableArm { span: Span, covered_by: Span },
    #[error("non-exhaustive match: {} not covered", quoted(missing))]
    NonExhaustiveMatch { missing: Vec<String>, span: Span },
}

impl TypeWarning {
    pub fn span(&self) -> Span {
        match self {
            TypeWarning::UnreachableArm { span, .. } | TypeWarning::NonExhaustiveMatch { span, .. } => *span,
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn were(n: usize) -> &'static str {
    if n == 1 { "was" } else { "were" }
}

fn quoted(names: &[String]) -> String {
    names.iter().map(|n| format!("`{}`", n)).collect::<Vec<_>>().join(", ")
}

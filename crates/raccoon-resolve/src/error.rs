// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolution error types.

use raccoon_ast::Span;
use thiserror::Error;

/// A name resolution error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
}

impl ResolveError {
    pub fn undefined(name: String, candidates: Vec<String>, span: Span) -> Self {
        Self { kind: ResolveErrorKind::UndefinedSymbol { name, candidates }, span }
    }

    pub fn undefined_type(name: String, candidates: Vec<String>, span: Span) -> Self {
        Self { kind: ResolveErrorKind::UndefinedType { name, candidates }, span }
    }

    pub fn undefined_variant(enum_name: String, name: String, candidates: Vec<String>, span: Span) -> Self {
        Self { kind: ResolveErrorKind::UndefinedVariant { enum_name, name, candidates }, span }
    }

    pub fn duplicate(name: String, span: Span, previous: Span) -> Self {
        Self { kind: ResolveErrorKind::DuplicateDefinition { name, previous }, span }
    }

    pub fn not_visible(name: String, span: Span, defined_at: Span) -> Self {
        Self { kind: ResolveErrorKind::NotVisible { name, defined_at }, span }
    }

    pub fn not_a_module(name: String, span: Span) -> Self {
        Self { kind: ResolveErrorKind::NotAModule { name }, span }
    }

    pub fn not_a_type(name: String, span: Span) -> Self {
        Self { kind: ResolveErrorKind::NotAType { name }, span }
    }

    pub fn unresolved_import(path: String, span: Span) -> Self {
        Self { kind: ResolveErrorKind::UnresolvedImport { path }, span }
    }

    pub fn import_cycle(chain: Vec<String>, span: Span) -> Self {
        Self { kind: ResolveErrorKind::ImportCycle { chain }, span }
    }

    pub fn too_many_supers(span: Span) -> Self {
        Self { kind: ResolveErrorKind::TooManySupers, span }
    }

    pub fn binding_in_or_pattern(name: String, span: Span) -> Self {
        Self { kind: ResolveErrorKind::BindingInOrPattern { name }, span }
    }

    pub fn invalid_break(span: Span) -> Self {
        Self { kind: ResolveErrorKind::InvalidBreak, span }
    }

    pub fn invalid_continue(span: Span) -> Self {
        Self { kind: ResolveErrorKind::InvalidContinue, span }
    }

    pub fn return_outside_fn(span: Span) -> Self {
        Self { kind: ResolveErrorKind::ReturnOutsideFn, span }
    }
}

/// The kind of resolution error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveErrorKind {
    /// `candidates` are the names visible at the use site, for suggestions.
    #[error("cannot find value `{name}` in this scope")]
    UndefinedSymbol { name: String, candidates: Vec<String> },

    #[error("cannot find type `{name}` in this scope")]
    UndefinedType { name: String, candidates: Vec<String> },

    #[error("no variant named `{name}` in enum `{enum_name}`")]
    UndefinedVariant { enum_name: String, name: String, candidates: Vec<String> },

    #[error("the name `{name}` is defined multiple times")]
    DuplicateDefinition { name: String, previous: Span },

    #[error("`{name}` is private")]
    NotVisible { name: String, defined_at: Span },

    #[error("`{name}` is not a module or enum")]
    NotAModule { name: String },

    #[error("expected type, found `{name}`")]
    NotAType { name: String },

    #[error("unresolved import `{path}`")]
    UnresolvedImport { path: String },

    #[error("import cycle: {}", chain.join(" -> "))]
    ImportCycle { chain: Vec<String> },

    #[error("too many leading `super` keywords")]
    TooManySupers,

    #[error("or-pattern alternatives cannot bind `{name}`")]
    BindingInOrPattern { name: String },

    #[error("`break` outside of a loop")]
    InvalidBreak,

    #[error("`continue` outside of a loop")]
    InvalidContinue,

    #[error("`return` outside of a function")]
    ReturnOutsideFn,
}

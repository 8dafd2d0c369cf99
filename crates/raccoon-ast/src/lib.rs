// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Raccoon language.
//!
//! This crate defines the AST nodes shared between the lexer, parser,
//! resolver, type checker, and formatter.

pub mod span;
pub mod token;
pub mod ty;
pub mod expr;
pub mod stmt;
pub mod decl;

pub use span::{FileId, LineMap, Position, SourceFile, SourceMap, Span};

/// Unique identifier for AST nodes.
///
/// Used by semantic analysis passes to track resolution results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}

/// A name together with the span it was written at.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }
}

/// A `::`-separated path such as `shapes::Circle` or `super::helper`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub segments: Vec<Ident>,
    pub span: Span,
}

impl Path {
    pub fn single(ident: Ident) -> Self {
        let span = ident.span;
        Self { segments: vec![ident], span }
    }

    /// The single segment's name, if this path has exactly one segment.
    pub fn as_single(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [only] => Some(only.name.as_str()),
            _ => None,
        }
    }

    /// The last segment's name.
    pub fn last_name(&self) -> &str {
        self.segments.last().map(|s| s.name.as_str()).unwrap_or("")
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "::")?;
            }
            write!(f, "{}", seg.name)?;
        }
        Ok(())
    }
}

/// Root of a parsed source file.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub items: Vec<decl::Item>,
    pub span: Span,
}

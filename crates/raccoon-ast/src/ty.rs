// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type annotations as written in source.

use crate::{NodeId, Path, Span};

/// A type as written, e.g. `int`, `shapes::Point`, `float[][]`, `()`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub id: NodeId,
    pub kind: TypeRefKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRefKind {
    /// A named type: a primitive (`int`, `float`, `bool`, `str`) or a struct/enum path.
    Path(Path),
    /// Postfix array type `T[]`.
    Array(Box<TypeRef>),
    /// `()`
    Unit,
}

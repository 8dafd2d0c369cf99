// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement AST nodes.

use crate::decl::Item;
use crate::expr::Expr;
use crate::ty::TypeRef;
use crate::{Ident, NodeId, Span};

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Let binding (mutable)
    Let {
        name: Ident,
        ty: Option<TypeRef>,
        init: Expr,
    },
    /// Const binding (never reassigned)
    Const {
        name: Ident,
        ty: Option<TypeRef>,
        init: Expr,
    },
    /// `fn`, `struct` or `enum` declared inside a block; visible to the
    /// whole block but not to anything outside it
    Item(Box<Item>),
    /// Block-like expression used as a statement, no `;`
    Expr(Expr),
    /// Expression followed by `;`
    Semi(Expr),
}

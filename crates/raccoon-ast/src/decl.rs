// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration (item) AST nodes.

use crate::expr::{Block, Expr};
use crate::ty::TypeRef;
use crate::{FileId, Ident, NodeId, Path, Span};

/// A module-level item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: NodeId,
    pub kind: ItemKind,
    pub is_pub: bool,
    pub span: Span,
}

impl Item {
    /// The name this item introduces, if it introduces exactly one.
    pub fn name(&self) -> Option<&Ident> {
        match &self.kind {
            ItemKind::Fn(f) => Some(&f.name),
            ItemKind::Struct(s) => Some(&s.name),
            ItemKind::Enum(e) => Some(&e.name),
            ItemKind::Const(c) => Some(&c.name),
            ItemKind::Mod(m) => Some(&m.name),
            ItemKind::Use(_) => None,
        }
    }
}

/// The kind of item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// Function declaration
    Fn(FnDecl),
    /// Struct declaration
    Struct(StructDecl),
    /// Enum declaration
    Enum(EnumDecl),
    /// Module-level constant
    Const(ConstDecl),
    /// Module declaration
    Mod(ModDecl),
    /// Import
    Use(UseDecl),
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    /// Return type (None means unit)
    pub ret_ty: Option<TypeRef>,
    pub body: Block,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub id: NodeId,
    pub name: Ident,
    pub ty: TypeRef,
}

/// A struct declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Ident,
    pub kind: StructKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructKind {
    /// `struct P { x: int }`
    Named(Vec<Field>),
    /// `struct P(int, int);`
    Tuple(Vec<TupleField>),
    /// `struct P;`
    Unit,
}

/// A named struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Ident,
    pub ty: TypeRef,
    pub is_pub: bool,
}

/// A positional struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleField {
    pub ty: TypeRef,
    pub is_pub: bool,
}

/// An enum declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Ident,
    pub variants: Vec<Variant>,
}

/// An enum variant. `fields` is None for unit variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: Ident,
    pub fields: Option<Vec<TypeRef>>,
    pub span: Span,
}

/// A module-level constant declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: Ident,
    pub ty: TypeRef,
    pub init: Expr,
}

/// A module declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ModDecl {
    pub name: Ident,
    pub body: ModBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModBody {
    /// `mod m { ... }`
    Inline(Vec<Item>),
    /// `mod m;` not yet loaded
    External,
    /// `mod m;` after its file has been loaded
    Loaded { items: Vec<Item>, file: FileId },
}

impl ModBody {
    pub fn items(&self) -> &[Item] {
        match self {
            ModBody::Inline(items) | ModBody::Loaded { items, .. } => items,
            ModBody::External => &[],
        }
    }
}

/// An import declaration.
///
/// Syntax:
/// - `use a::b;` - brings `b` into scope
/// - `use a::b as c;` - renamed
/// - `use a::{b, c::d};` - nested group
/// - `use a::*;` - every public item of `a`
#[derive(Debug, Clone, PartialEq)]
pub struct UseDecl {
    pub tree: UseTree,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseTree {
    pub prefix: Path,
    pub kind: UseTreeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UseTreeKind {
    /// Import the prefix itself, optionally renamed.
    Simple(Option<Ident>),
    Nested(Vec<UseTree>),
    Glob,
}

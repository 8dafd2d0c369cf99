// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Local bindings and the symbol table.

use raccoon_ast::{NodeId, Span};

/// Unique identifier for a local binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Where a local binding comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Let,
    Const,
    Param,
    /// Loop variable of a `for`.
    ForBinding,
    /// Name bound by a match pattern.
    PatternBinding,
}

/// A declared local.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Whether the binding may be assigned to.
    pub mutable: bool,
    /// Where this symbol was declared.
    pub span: Span,
    /// The declaring node: a statement, parameter, `for` expression or pattern.
    pub node: NodeId,
}

/// Table of all locals in a program.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { symbols: Vec::new() }
    }

    /// Insert a new symbol and return its ID.
    pub fn insert(&mut self, name: String, kind: SymbolKind, span: Span, node: NodeId) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        // Only `const` locals are immutable.
        let mutable = kind != SymbolKind::Const;
        self.symbols.push(Symbol { id, name, kind, mutable, span, node });
        id
    }

    /// Get a symbol by ID.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// Iterate over all symbols.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

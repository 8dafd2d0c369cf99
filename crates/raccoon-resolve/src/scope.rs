// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Scope tree for name resolution.

use std::collections::HashMap;

use crate::module::ModuleId;
use crate::symbol::SymbolId;

/// Unique identifier for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// The kind of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Item scope of a module; lookups continue in the module namespace.
    Module(ModuleId),
    /// Function scope (parameters).
    Function,
    /// Block scope.
    Block,
    /// Loop body (for break/continue validation).
    Loop,
    /// Match arm (pattern bindings).
    Arm,
    /// A block that declares items; they live in this anonymous module.
    Items(ModuleId),
}

/// A scope in the scope tree.
///
/// `parent` is an index into the tree, never an owning pointer, so a scope
/// can be looked up after it has been exited.
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub bindings: HashMap<String, SymbolId>,
}

/// Tree of scopes for name lookup.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: Option<ScopeId>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self { scopes: Vec::new(), current: None }
    }

    /// Push a new scope as a child of the current one.
    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope { id, parent: self.current, kind, bindings: HashMap::new() });
        self.current = Some(id);
        id
    }

    /// Pop the current scope and return to parent.
    pub fn pop(&mut self) {
        if let Some(scope) = self.current.and_then(|id| self.scopes.get(id.0 as usize)) {
            self.current = scope.parent;
        }
    }

    pub fn current(&self) -> Option<ScopeId> {
        self.current
    }

    /// Get a scope by ID.
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    /// Scopes from the current one outwards.
    fn chain(&self) -> impl Iterator<Item = &Scope> {
        let mut next = self.current;
        std::iter::from_fn(move || {
            let scope = self.scopes.get(next?.0 as usize)?;
            next = scope.parent;
            Some(scope)
        })
    }

    /// Scopes whose locals are visible here: up to and including the
    /// innermost function, so a nested `fn` never sees its parent's locals.
    fn locals_chain(&self) -> impl Iterator<Item = &Scope> {
        let mut done = false;
        self.chain().take_while(move |scope| {
            if done {
                return false;
            }
            done = scope.kind == ScopeKind::Function;
            true
        })
    }

    /// Look up a local in the current scope chain.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.locals_chain().find_map(|scope| scope.bindings.get(name).copied())
    }

    /// The module whose items are visible from the current scope.
    pub fn module(&self) -> Option<ModuleId> {
        self.chain().find_map(|scope| match scope.kind {
            ScopeKind::Module(m) | ScopeKind::Items(m) => Some(m),
            _ => None,
        })
    }

    /// Define a name in the current scope.
    /// Shadowing is allowed - a new binding replaces the previous one.
    pub fn define(&mut self, name: String, symbol: SymbolId) {
        if let Some(scope) = self.current.and_then(|id| self.scopes.get_mut(id.0 as usize)) {
            scope.bindings.insert(name, symbol);
        }
    }

    /// Whether `name` is already bound in the innermost scope.
    pub fn defined_here(&self, name: &str) -> bool {
        self.chain().next().is_some_and(|scope| scope.bindings.contains_key(name))
    }

    /// Check if we're inside a loop of the current function.
    pub fn in_loop(&self) -> bool {
        for scope in self.chain() {
            match scope.kind {
                ScopeKind::Loop => return true,
                ScopeKind::Function | ScopeKind::Module(_) => return false,
                _ => {}
            }
        }
        false
    }

    /// Whether a `return` here belongs to a function body.
    pub fn in_function(&self) -> bool {
        for scope in self.chain() {
            match scope.kind {
                ScopeKind::Function => return true,
                ScopeKind::Module(_) => return false,
                _ => {}
            }
        }
        false
    }

    /// Names of every local visible from the current scope.
    pub fn visible_names(&self) -> Vec<String> {
        self.locals_chain().flat_map(|scope| scope.bindings.keys().cloned()).collect()
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scopes_shadow_and_pop() {
        let mut tree = ScopeTree::new();
        tree.push(ScopeKind::Module(ModuleId(0)));
        tree.push(ScopeKind::Function);
        tree.define("x".to_string(), SymbolId(0));
        tree.push(ScopeKind::Block);
        tree.define("x".to_string(), SymbolId(1));
        assert_eq!(tree.lookup("x"), Some(SymbolId(1)));
        tree.pop();
        assert_eq!(tree.lookup("x"), Some(SymbolId(0)));
        assert_eq!(tree.module(), Some(ModuleId(0)));
    }

    #[test]
    fn loops_do_not_cross_function_boundaries() {
        let mut tree = ScopeTree::new();
        tree.push(ScopeKind::Module(ModuleId(0)));
        tree.push(ScopeKind::Function);
        assert!(!tree.in_loop());
        tree.push(ScopeKind::Loop);
        tree.push(ScopeKind::Block);
        assert!(tree.in_loop());
    }

    #[test]
    fn returns_need_a_function() {
        let mut tree = ScopeTree::new();
        tree.push(ScopeKind::Module(ModuleId(0)));
        tree.push(ScopeKind::Block);
        assert!(!tree.in_function());
        tree.push(ScopeKind::Function);
        tree.push(ScopeKind::Loop);
        assert!(tree.in_function());
    }

    #[test]
    fn nested_functions_do_not_see_outer_locals() {
        let mut tree = ScopeTree::new();
        tree.push(ScopeKind::Module(ModuleId(0)));
        tree.push(ScopeKind::Function);
        tree.define("outer".to_string(), SymbolId(0));
        tree.push(ScopeKind::Block);
        tree.push(ScopeKind::Items(ModuleId(1)));
        tree.push(ScopeKind::Loop);
        assert!(tree.in_loop());
        assert_eq!(tree.module(), Some(ModuleId(1)));
        assert_eq!(tree.lookup("outer"), Some(SymbolId(0)));

        tree.push(ScopeKind::Function);
        tree.define("param".to_string(), SymbolId(1));
        assert_eq!(tree.lookup("outer"), None);
        assert_eq!(tree.lookup("param"), Some(SymbolId(1)));
        assert!(!tree.in_loop());
        assert_eq!(tree.visible_names(), vec!["param".to_string()]);
    }

    #[test]
    fn exited_scopes_remain_addressable() {
        let mut tree = ScopeTree::new();
        let module = tree.push(ScopeKind::Module(ModuleId(0)));
        let block = tree.push(ScopeKind::Block);
        tree.pop();
        let scope = tree.get(block).expect("scope kept");
        assert_eq!(scope.parent, Some(module));
        assert_eq!(tree.current(), Some(module));
    }
}

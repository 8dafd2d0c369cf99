// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type checker implementation.

use std::collections::HashMap;

use raccoon_ast::{Module, NodeId, Span};
use raccoon_resolve::{DefId, ResolvedProgram, SymbolId};

use crate::types::Type;

mod builtins;
mod check_expr;
mod check_fn;
mod check_pattern;
mod check_stmt;
mod declarations;
mod errors;
mod type_defs;
mod type_table;

pub use errors::{TypeError, TypeWarning};
pub use type_defs::{FnSig, StructFields, TypeDef, TypedProgram, VariantDef};
pub use type_table::TypeTable;

pub struct TypeChecker {
    /// Output of name resolution.
    pub(super) resolved: ResolvedProgram,
    /// Type registry.
    pub(super) types: TypeTable,
    pub(super) fn_sigs: HashMap<DefId, FnSig>,
    /// Declared types of module-level constants.
    pub(super) const_types: HashMap<DefId, Type>,
    /// Types assigned to nodes.
    pub(super) node_types: HashMap<NodeId, Type>,
    /// Types assigned to locals.
    pub(super) local_types: HashMap<SymbolId, Type>,
    pub(super) selected_arms: HashMap<NodeId, usize>,
    pub(super) errors: Vec<TypeError>,
    pub(super) warnings: Vec<TypeWarning>,
    /// Current function's return type (for checking return expressions).
    pub(super) current_return_type: Option<Type>,
    /// One entry per enclosing loop: whether it contains a `break`.
    pub(super) loops: Vec<bool>,
}

/// Outcome of checking: the typed program plus everything found wrong with it.
#[derive(Debug)]
pub struct CheckResult {
    pub program: TypedProgram,
    pub errors: Vec<TypeError>,
    pub warnings: Vec<TypeWarning>,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl TypeChecker {
    /// Create a new type checker.
    pub fn new(resolved: ResolvedProgram) -> Self {
        Self {
            resolved,
            types: TypeTable::new(),
            fn_sigs: HashMap::new(),
            const_types: HashMap::new(),
            node_types: HashMap::new(),
            local_types: HashMap::new(),
            selected_arms: HashMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            current_return_type: None,
            loops: Vec::new(),
        }
    }

    pub fn check(mut self, module: &Module) -> CheckResult {
        self.collect_type_declarations(&module.items);
        self.collect_signatures(&module.items);
        self.check_items(&module.items);

        tracing::debug!(
            types = self.types.len(),
            functions = self.fn_sigs.len(),
            expressions = self.node_types.len(),
            errors = self.errors.len(),
            warnings = self.warnings.len(),
            "type checking finished"
        );

        CheckResult {
            program: TypedProgram {
                resolved: self.resolved,
                types: self.types,
                fn_sigs: self.fn_sigs,
                node_types: self.node_types,
                local_types: self.local_types,
                selected_arms: self.selected_arms,
            },
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Record the type of an expression node and pass it through.
    pub(super) fn record(&mut self, node: NodeId, ty: Type) -> Type {
        self.node_types.insert(node, ty.clone());
        ty
    }

    /// Report a mismatch unless `found` fits where `expected` is required.
    pub(super) fn require(&mut self, expected: &Type, found: &Type, span: Span) -> bool {
        if expected.accepts(found) {
            return true;
        }
        self.errors.push(TypeError::Mismatch { expected: expected.clone(), found: found.clone(), span });
        false
    }
}

// ============================================================================
// Public API
// ============================================================================

pub fn typecheck(resolved: ResolvedProgram, module: &Module) -> CheckResult {
    TypeChecker::new(resolved).check(module)
}

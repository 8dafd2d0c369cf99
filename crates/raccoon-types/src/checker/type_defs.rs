// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type definitions used throughout the checker.

use std::collections::HashMap;

use raccoon_ast::NodeId;
use raccoon_resolve::{DefId, ResolvedProgram, SymbolId};

use super::type_table::TypeTable;

use crate::types::Type;

/// Information about a user-defined type.
#[derive(Debug, Clone)]
pub enum TypeDef {
    Struct {
        name: String,
        def: DefId,
        fields: StructFields,
    },
    Enum {
        name: String,
        def: DefId,
        variants: Vec<VariantDef>,
    },
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Struct { name, .. } | TypeDef::Enum { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StructFields {
    Named(Vec<(String, Type)>),
    Tuple(Vec<Type>),
    Unit,
}

/// An enum variant. `fields` is None for unit variants.
#[derive(Debug, Clone)]
pub struct VariantDef {
    pub name: String,
    pub fields: Option<Vec<Type>>,
}

/// Function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FnSig {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl FnSig {
    pub fn to_type(&self) -> Type {
        Type::Fn { params: self.params.clone(), ret: Box::new(self.ret.clone()) }
    }
}

/// Result of type checking.
#[derive(Debug)]
pub struct TypedProgram {
    /// Everything name resolution produced.
    pub resolved: ResolvedProgram,
    /// Type table with all struct and enum definitions.
    pub types: TypeTable,
    /// Function signatures by definition.
    pub fn_sigs: HashMap<DefId, FnSig>,
    /// Computed type for each expression node.
    pub node_types: HashMap<NodeId, Type>,
    /// Types of locals, including unannotated `let` bindings.
    pub local_types: HashMap<SymbolId, Type>,
    /// Matches on a literal scrutinee, to the index of the arm that runs.
    pub selected_arms: HashMap<NodeId, usize>,
}

impl TypedProgram {
    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.node_types.get(&node)
    }
}

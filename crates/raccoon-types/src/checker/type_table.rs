// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Central type registry.

use std::collections::HashMap;

use raccoon_resolve::DefId;

use super::type_defs::{StructFields, TypeDef, VariantDef};

use crate::types::{Type, TypeId};

/// Central registry of all structs and enums in the program, keyed by their
/// definitions so that identity is the qualified declared name.
#[derive(Debug, Default)]
pub struct TypeTable {
    pub(super) types: Vec<TypeDef>,
    pub(super) by_def: HashMap<DefId, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user-defined type.
    pub fn register_type(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        let key = match &def {
            TypeDef::Struct { def, .. } | TypeDef::Enum { def, .. } => *def,
        };
        self.types.push(def);
        self.by_def.insert(key, id);
        id
    }

    /// Get a type definition by ID.
    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.0 as usize)
    }

    pub(super) fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeDef> {
        self.types.get_mut(id.0 as usize)
    }

    /// The type a struct or enum definition declares.
    pub fn type_of_def(&self, def: DefId) -> Option<Type> {
        let id = *self.by_def.get(&def)?;
        let name = self.get(id)?.name().to_string();
        Some(Type::Named { id, name })
    }

    pub fn id_of_def(&self, def: DefId) -> Option<TypeId> {
        self.by_def.get(&def).copied()
    }

    pub fn struct_fields(&self, id: TypeId) -> Option<&StructFields> {
        match self.get(id)? {
            TypeDef::Struct { fields, .. } => Some(fields),
            TypeDef::Enum { .. } => None,
        }
    }

    pub fn variants(&self, id: TypeId) -> Option<&[VariantDef]> {
        match self.get(id)? {
            TypeDef::Enum { variants, .. } => Some(variants),
            TypeDef::Struct { .. } => None,
        }
    }

    /// Type of named field `field` on struct `id`.
    pub fn field_type(&self, id: TypeId, field: &str) -> Option<&Type> {
        match self.struct_fields(id)? {
            StructFields::Named(fields) => fields.iter().find(|(n, _)| n == field).map(|(_, t)| t),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter()
    }
}

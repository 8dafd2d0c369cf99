// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration collection: struct and enum layouts, function signatures and
//! constant types, gathered before any body is checked.

use raccoon_ast::decl::{Item, ItemKind, StructKind};
use raccoon_ast::ty::{TypeRef, TypeRefKind};
use raccoon_resolve::{Primitive, Resolution};

use super::type_defs::{FnSig, StructFields, TypeDef, VariantDef};
use super::TypeChecker;

use crate::types::Type;

impl TypeChecker {
    /// Register every struct and enum so that field types can refer to any of them.
    pub(super) fn collect_type_declarations(&mut self, items: &[Item]) {
        for item in items {
            self.collect_type_declaration(item);
        }
    }

    pub(super) fn collect_type_declaration(&mut self, item: &Item) {
        let Some(def) = self.resolved.item_defs.get(&item.id).copied() else {
            return;
        };
        let name = self.resolved.def(def).qualified.clone();
        match &item.kind {
            ItemKind::Struct(_) => {
                self.types.register_type(TypeDef::Struct { name, def, fields: StructFields::Unit });
            }
            ItemKind::Enum(_) => {
                self.types.register_type(TypeDef::Enum { name, def, variants: Vec::new() });
            }
            ItemKind::Mod(m) => self.collect_type_declarations(m.body.items()),
            _ => {}
        }
    }

    /// Fill in layouts and signatures now that every type name is known.
    pub(super) fn collect_signatures(&mut self, items: &[Item]) {
        for item in items {
            self.collect_signature(item);
        }
    }

    pub(super) fn collect_signature(&mut self, item: &Item) {
        let Some(def) = self.resolved.item_defs.get(&item.id).copied() else {
            return;
        };
        match &item.kind {
            ItemKind::Struct(s) => {
                let fields = match &s.kind {
                    StructKind::Named(fields) => StructFields::Named(
                        fields.iter().map(|f| (f.name.name.clone(), self.lower_type(&f.ty))).collect(),
                    ),
                    StructKind::Tuple(fields) => {
                        StructFields::Tuple(fields.iter().map(|f| self.lower_type(&f.ty)).collect())
                    }
                    StructKind::Unit => StructFields::Unit,
                };
                if let Some(TypeDef::Struct { fields: slot, .. }) =
                    self.types.id_of_def(def).and_then(|id| self.types.get_mut(id))
                {
                    *slot = fields;
                }
            }
            ItemKind::Enum(e) => {
                let variants: Vec<VariantDef> = e
                    .variants
                    .iter()
                    .map(|v| VariantDef {
                        name: v.name.name.clone(),
                        fields: v.fields.as_ref().map(|tys| tys.iter().map(|t| self.lower_type(t)).collect()),
                    })
                    .collect();
                if let Some(TypeDef::Enum { variants: slot, .. }) =
                    self.types.id_of_def(def).and_then(|id| self.types.get_mut(id))
                {
                    *slot = variants;
                }
            }
            ItemKind::Fn(f) => {
                let params = f.params.iter().map(|p| self.lower_type(&p.ty)).collect();
                let ret = f.ret_ty.as_ref().map(|t| self.lower_type(t)).unwrap_or(Type::Unit);
                self.fn_sigs.insert(def, FnSig { params, ret });
            }
            ItemKind::Const(c) => {
                let ty = self.lower_type(&c.ty);
                self.const_types.insert(def, ty);
            }
            ItemKind::Mod(m) => self.collect_signatures(m.body.items()),
            ItemKind::Use(_) => {}
        }
    }

    /// Turn a written type into a `Type`. Unresolved names become `Error`;
    /// the resolver already reported them.
    pub(super) fn lower_type(&self, ty: &TypeRef) -> Type {
        match &ty.kind {
            TypeRefKind::Unit => Type::Unit,
            TypeRefKind::Array(elem) => Type::array(self.lower_type(elem)),
            TypeRefKind::Path(_) => match self.resolved.resolution(ty.id) {
                Some(Resolution::Primitive(p)) => match p {
                    Primitive::Int => Type::Int,
                    Primitive::Float => Type::Float,
                    Primitive::Bool => Type::Bool,
                    Primitive::Str => Type::Str,
                },
                Some(Resolution::Def(def)) => self.types.type_of_def(def).unwrap_or(Type::Error),
                _ => Type::Error,
            },
        }
    }
}

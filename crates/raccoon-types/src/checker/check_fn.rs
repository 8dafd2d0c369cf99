// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Function-level checking and return analysis.

use raccoon_ast::decl::{FnDecl, Item, ItemKind};
use raccoon_ast::Span;

use super::errors::TypeError;
use super::TypeChecker;

use crate::types::Type;

impl TypeChecker {
    pub(super) fn check_items(&mut self, items: &[Item]) {
        for item in items {
            self.check_item(item);
        }
    }

    pub(super) fn check_item(&mut self, item: &Item) {
        let def = self.resolved.item_defs.get(&item.id).copied();
        match &item.kind {
            ItemKind::Fn(f) => {
                let sig = def.and_then(|d| self.fn_sigs.get(&d).cloned());
                let (params, ret) = match sig {
                    Some(sig) => (sig.params, sig.ret),
                    None => (vec![Type::Error; f.params.len()], Type::Error),
                };
                self.check_fn(f, params, ret);
            }
            ItemKind::Const(c) => {
                let ty = def.and_then(|d| self.const_types.get(&d).cloned()).unwrap_or(Type::Error);
                self.check_expr_expecting(&c.init, &ty);
            }
            ItemKind::Mod(m) => self.check_items(m.body.items()),
            ItemKind::Struct(_) | ItemKind::Enum(_) | ItemKind::Use(_) => {}
        }
    }

    fn check_fn(&mut self, f: &FnDecl, params: Vec<Type>, ret: Type) {
        for (param, ty) in f.params.iter().zip(params) {
            if let Some(sym) = self.resolved.bindings.get(&param.id).copied() {
                self.local_types.insert(sym, ty);
            }
        }

        // A function nested in a block has its own return type and loops.
        let outer_return = self.current_return_type.replace(ret.clone());
        let outer_loops = std::mem::take(&mut self.loops);

        let body_ty = self.check_block(&f.body, Some(&ret));
        match &f.body.tail {
            Some(tail) => {
                let tail_ty = self.node_types.get(&tail.id).cloned().unwrap_or(Type::Error);
                self.require(&ret, &tail_ty, tail.span);
            }
            None => {
                if ret != Type::Unit && !ret.is_error() && !body_ty.is_never() {
                    let end = f.body.span.end;
                    self.errors.push(TypeError::MissingReturn {
                        function: f.name.name.clone(),
                        expected: ret.clone(),
                        span: Span::new(end.saturating_sub(1), end),
                    });
                }
            }
        }

        self.current_return_type = outer_return;
        self.loops = outer_loops;
    }
}

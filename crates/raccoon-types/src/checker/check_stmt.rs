// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement and block type checking.

use raccoon_ast::decl::Item;
use raccoon_ast::expr::Block;
use raccoon_ast::stmt::{Stmt, StmtKind};

use super::TypeChecker;

use crate::types::Type;

impl TypeChecker {
    /// Check a block. Its type is the tail's type, `()` without a tail, or
    /// `!` when a statement always diverges. The tail is checked against
    /// `expected` but the caller decides whether a mismatch is an error.
    pub(super) fn check_block(&mut self, block: &Block, expected: Option<&Type>) -> Type {
        // Items in a block are visible to all of it, like module items.
        let items: Vec<&Item> = block
            .stmts
            .iter()
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::Item(item) => Some(item.as_ref()),
                _ => None,
            })
            .collect();
        for item in &items {
            self.collect_type_declaration(item);
        }
        for item in &items {
            self.collect_signature(item);
        }

        let mut diverges = false;
        for stmt in &block.stmts {
            if self.check_stmt(stmt).is_never() {
                diverges = true;
            }
        }
        let ty = match &block.tail {
            Some(tail) => {
                let tail_ty = self.check_expr(tail, expected);
                if diverges { Type::Never } else { tail_ty }
            }
            None if diverges => Type::Never,
            None => Type::Unit,
        };
        self.record(block.id, ty)
    }

    /// Check a statement and return the type of the expression it evaluates.
    pub(super) fn check_stmt(&mut self, stmt: &Stmt) -> Type {
        match &stmt.kind {
            StmtKind::Let { ty, init, .. } | StmtKind::Const { ty, init, .. } => {
                let init_ty = match ty {
                    Some(annotation) => {
                        let declared = self.lower_type(annotation);
                        let found = self.check_expr_expecting(init, &declared);
                        self.bind_local(stmt, declared);
                        found
                    }
                    None => {
                        let found = self.check_expr(init, None);
                        self.bind_local(stmt, found.clone());
                        found
                    }
                };
                init_ty
            }
            StmtKind::Expr(expr) | StmtKind::Semi(expr) => self.check_expr(expr, None),
            StmtKind::Item(item) => {
                self.check_item(item);
                Type::Unit
            }
        }
    }

    fn bind_local(&mut self, stmt: &Stmt, ty: Type) {
        if let Some(sym) = self.resolved.bindings.get(&stmt.id).copied() {
            self.local_types.insert(sym, ty);
        }
    }
}

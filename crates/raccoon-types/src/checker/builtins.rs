// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Calls to the builtin output functions.

use raccoon_ast::expr::Expr;
use raccoon_ast::Span;
use raccoon_resolve::Builtin;

use super::errors::TypeError;
use super::TypeChecker;

use crate::types::Type;

impl TypeChecker {
    /// `print` takes exactly one value, `println` takes at most one. Any
    /// type other than `()` can be printed.
    pub(super) fn check_builtin_call(&mut self, builtin: Builtin, func: &Expr, args: &[Expr], span: Span) -> Type {
        let (min, max) = match builtin {
            Builtin::Print => (1, 1),
            Builtin::Println => (0, 1),
        };

        let arg_types: Vec<Type> = args.iter().map(|arg| self.check_expr(arg, None)).collect();

        if args.len() < min {
            self.errors.push(TypeError::ArityMismatch { expected: min, found: args.len(), span });
        } else if args.len() > max {
            self.errors.push(TypeError::ArityMismatch { expected: max, found: args.len(), span });
        }

        for (arg, ty) in args.iter().zip(&arg_types) {
            if *ty == Type::Unit {
                self.errors.push(TypeError::UnitArgument { name: builtin.name().to_string(), span: arg.span });
            }
        }

        self.record(func.id, Type::Fn { params: arg_types, ret: Box::new(Type::Unit) });
        Type::Unit
    }
}

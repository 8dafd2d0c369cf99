// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression type checking.

use std::collections::HashMap;

use raccoon_ast::expr::{BinOp, Block, Expr, ExprKind, FieldInit, FieldName, OpCategory, UnaryOp};
use raccoon_ast::{Path, Span};
use raccoon_resolve::{DefId, DefKind, Resolution};

use super::errors::TypeError;
use super::type_defs::{FnSig, StructFields};
use super::TypeChecker;

use crate::pattern::ConstValue;
use crate::types::Type;

impl TypeChecker {
    /// Check an expression, record its type and return it.
    ///
    /// `expected` is a hint: it drives int-literal widening and the element
    /// type of empty arrays, but a mismatch against it is not reported here.
    pub(super) fn check_expr(&mut self, expr: &Expr, expected: Option<&Type>) -> Type {
        let ty = self.infer_expr(expr, expected);
        self.record(expr.id, ty)
    }

    /// Check an expression that must have type `expected`.
    pub(super) fn check_expr_expecting(&mut self, expr: &Expr, expected: &Type) -> Type {
        let ty = self.check_expr(expr, Some(expected));
        self.require(expected, &ty, value_span(expr));
        ty
    }

    fn infer_expr(&mut self, expr: &Expr, expected: Option<&Type>) -> Type {
        match &expr.kind {
            // An integer literal checked against `float` is a float.
            ExprKind::Int(_) => match expected {
                Some(Type::Float) => Type::Float,
                _ => Type::Int,
            },
            ExprKind::Float(_) => Type::Float,
            ExprKind::String(_) => Type::Str,
            ExprKind::Bool(_) => Type::Bool,
            ExprKind::Path(path) => self.check_path_value(expr, path),
            ExprKind::Paren(inner) => self.check_expr(inner, expected),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, expected),
            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right, expected),
            ExprKind::Assign { target, value } => {
                let target_ty = self.check_place(target);
                self.check_expr_expecting(value, &target_ty);
                Type::Unit
            }
            ExprKind::AssignOp { op, target, value } => {
                let target_ty = self.check_place(target);
                let value_ty = self.check_expr(value, Some(&target_ty));
                match op.category() {
                    OpCategory::Bitwise => self.bitwise_result(*op, target_ty, value_ty, target.span, value.span),
                    _ => self.arithmetic_result(*op, target_ty, value_ty, target.span, value.span),
                };
                Type::Unit
            }
            ExprKind::Call { func, args } => self.check_call(func, args, expr.span),
            ExprKind::Field { object, field, field_span } => self.check_field(object, field, *field_span),
            ExprKind::Index { object, index } => self.check_index(object, index),
            ExprKind::StructLit { path, fields } => self.check_struct_lit(expr, path, fields),
            ExprKind::Array(elems) => self.check_array(elems, expected, expr.span),
            ExprKind::Block(block) => self.check_block(block, expected),
            ExprKind::If { cond, then_branch, else_branch } => {
                self.check_if(cond, then_branch, else_branch.as_deref(), expected)
            }
            ExprKind::Match { scrutinee, arms } => self.check_match(expr, scrutinee, arms, expected),
            ExprKind::Loop(body) => {
                self.loops.push(false);
                self.check_loop_body(body);
                let has_break = self.loops.pop().unwrap_or(false);
                if has_break { Type::Unit } else { Type::Never }
            }
            ExprKind::While { cond, body } => {
                self.check_expr_expecting(cond, &Type::Bool);
                self.loops.push(false);
                self.check_loop_body(body);
                self.loops.pop();
                Type::Unit
            }
            ExprKind::For { iter, body, .. } => {
                let elem = if self.check_range_operand(iter) {
                    Type::Int
                } else {
                    match self.check_expr(iter, None) {
                        Type::Array(elem) => *elem,
                        Type::Error => Type::Error,
                        other => {
                            self.errors.push(TypeError::NotIterable { ty: other, span: iter.span });
                            Type::Error
                        }
                    }
                };
                if let Some(sym) = self.resolved.bindings.get(&expr.id).copied() {
                    self.local_types.insert(sym, elem);
                }
                self.loops.push(false);
                self.check_loop_body(body);
                self.loops.pop();
                Type::Unit
            }
            ExprKind::Range { start, end } => {
                self.check_range_bounds(start.as_deref(), end.as_deref());
                self.errors.push(TypeError::MisplacedRange { span: expr.span });
                Type::Error
            }
            ExprKind::Return(value) => {
                let expected = self.current_return_type.clone().unwrap_or(Type::Error);
                match value {
                    Some(value) => {
                        self.check_expr_expecting(value, &expected);
                    }
                    None => {
                        self.require(&expected, &Type::Unit, expr.span);
                    }
                }
                Type::Never
            }
            ExprKind::Break => {
                if let Some(has_break) = self.loops.last_mut() {
                    *has_break = true;
                }
                Type::Never
            }
            ExprKind::Continue => Type::Never,
        }
    }

    // ------------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------------

    fn check_path_value(&mut self, expr: &Expr, path: &Path) -> Type {
        match self.resolved.resolution(expr.id) {
            // Unresolved: the resolver already reported it.
            None => Type::Error,
            Some(Resolution::Local(sym)) => self.local_types.get(&sym).cloned().unwrap_or(Type::Error),
            Some(Resolution::Def(def)) => self.def_value_type(def, path, expr.span),
            Some(Resolution::Builtin(builtin)) => {
                self.not_a_value(builtin.name().to_string(), "builtin function", expr.span);
                Type::Error
            }
            Some(Resolution::Primitive(prim)) => {
                self.not_a_value(prim.name().to_string(), "type", expr.span);
                Type::Error
            }
        }
    }

    /// The type of a module-level definition used as a value.
    pub(super) fn def_value_type(&mut self, def: DefId, path: &Path, span: Span) -> Type {
        let kind = self.resolved.def(def).kind.clone();
        match kind {
            DefKind::Fn => self.fn_sigs.get(&def).map(FnSig::to_type).unwrap_or(Type::Error),
            DefKind::Const => self.const_types.get(&def).cloned().unwrap_or(Type::Error),
            DefKind::Struct => {
                let Some(ty @ Type::Named { id, .. }) = self.types.type_of_def(def) else {
                    return Type::Error;
                };
                match self.types.struct_fields(id) {
                    Some(StructFields::Unit) => ty,
                    Some(StructFields::Tuple(fields)) => Type::Fn { params: fields.clone(), ret: Box::new(ty) },
                    _ => {
                        self.not_a_value(path.to_string(), "struct", span);
                        Type::Error
                    }
                }
            }
            DefKind::Variant { parent, index } => {
                let Some(ty @ Type::Named { id, .. }) = self.types.type_of_def(parent) else {
                    return Type::Error;
                };
                match self.types.variants(id).and_then(|vs| vs.get(index)).map(|v| v.fields.clone()) {
                    Some(None) => ty,
                    Some(Some(fields)) => Type::Fn { params: fields, ret: Box::new(ty) },
                    None => Type::Error,
                }
            }
            DefKind::Enum { .. } => {
                self.not_a_value(path.to_string(), "enum", span);
                Type::Error
            }
            DefKind::Mod(_) => {
                self.not_a_value(path.to_string(), "module", span);
                Type::Error
            }
        }
    }

    pub(super) fn not_a_value(&mut self, name: String, what: &str, span: Span) {
        self.errors.push(TypeError::NotAValue { name, what: what.to_string(), span });
    }

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, expected: Option<&Type>) -> Type {
        match op {
            UnaryOp::Neg => {
                let hint = expected.filter(|t| t.is_numeric());
                let ty = self.check_expr(operand, hint);
                match ty {
                    Type::Int | Type::Float | Type::Error => ty,
                    other => self.invalid_operand(op.symbol(), other, operand.span),
                }
            }
            UnaryOp::Not => match self.check_expr(operand, Some(&Type::Bool)) {
                Type::Bool => Type::Bool,
                Type::Error => Type::Error,
                other => self.invalid_operand(op.symbol(), other, operand.span),
            },
            UnaryOp::BitNot => match self.check_expr(operand, Some(&Type::Int)) {
                Type::Int => Type::Int,
                Type::Error => Type::Error,
                other => self.invalid_operand(op.symbol(), other, operand.span),
            },
        }
    }

    fn check_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, expected: Option<&Type>) -> Type {
        match op.category() {
            OpCategory::Logical => {
                self.check_expr_expecting(left, &Type::Bool);
                self.check_expr_expecting(right, &Type::Bool);
                Type::Bool
            }
            OpCategory::Comparison => {
                let (lt, rt) = self.check_operands(left, right, None);
                if !lt.accepts(&rt) && !rt.accepts(&lt) {
                    self.errors.push(TypeError::Mismatch { expected: lt, found: rt, span: right.span });
                }
                Type::Bool
            }
            OpCategory::Arithmetic => {
                let hint = expected.filter(|t| t.is_numeric()).cloned();
                let (lt, rt) = self.check_operands(left, right, hint);
                self.arithmetic_result(op, lt, rt, left.span, right.span)
            }
            OpCategory::Bitwise => {
                let (lt, rt) = self.check_operands(left, right, None);
                self.bitwise_result(op, lt, rt, left.span, right.span)
            }
        }
    }

    /// Check both operands, letting a `float` on either side widen an integer
    /// literal on the other. Literal-only operands are checked last so the
    /// result does not depend on operand order.
    fn check_operands(&mut self, left: &Expr, right: &Expr, hint: Option<Type>) -> (Type, Type) {
        if is_int_literal(left) && !is_int_literal(right) {
            let rt = self.check_expr(right, hint.as_ref());
            let left_hint = if rt == Type::Float { Some(Type::Float) } else { hint };
            let lt = self.check_expr(left, left_hint.as_ref());
            (lt, rt)
        } else {
            let lt = self.check_expr(left, hint.as_ref());
            let right_hint = if lt == Type::Float { Some(Type::Float) } else { hint };
            let rt = self.check_expr(right, right_hint.as_ref());
            (lt, rt)
        }
    }

    pub(super) fn arithmetic_result(&mut self, op: BinOp, lt: Type, rt: Type, lspan: Span, rspan: Span) -> Type {
        match (&lt, &rt) {
            (Type::Error | Type::Never, _) | (_, Type::Error | Type::Never) => Type::Error,
            (l, _) if !l.is_numeric() => self.invalid_operand(op.symbol(), lt, lspan),
            (_, r) if !r.is_numeric() => self.invalid_operand(op.symbol(), rt, rspan),
            (l, r) if l == r => lt,
            _ => {
                self.errors.push(TypeError::Mismatch { expected: lt, found: rt, span: rspan });
                Type::Error
            }
        }
    }

    pub(super) fn bitwise_result(&mut self, op: BinOp, lt: Type, rt: Type, lspan: Span, rspan: Span) -> Type {
        match (&lt, &rt) {
            (Type::Error | Type::Never, _) | (_, Type::Error | Type::Never) => Type::Error,
            (Type::Int, Type::Int) => Type::Int,
            (Type::Int, _) => self.invalid_operand(op.symbol(), rt, rspan),
            _ => self.invalid_operand(op.symbol(), lt, lspan),
        }
    }

    fn invalid_operand(&mut self, op: &str, ty: Type, span: Span) -> Type {
        self.errors.push(TypeError::InvalidOperand { op: op.to_string(), ty, span });
        Type::Error
    }

    // ------------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------------

    /// Check an assignment target and return its type.
    fn check_place(&mut self, target: &Expr) -> Type {
        let ty = self.check_expr(target, None);
        match &target.kind {
            ExprKind::Path(_) => match self.resolved.resolution(target.id) {
                None => {}
                Some(Resolution::Local(_)) => self.check_not_const(target),
                Some(Resolution::Def(def)) if self.resolved.def(def).kind == DefKind::Const => {
                    self.check_not_const(target)
                }
                Some(_) => self.errors.push(TypeError::InvalidAssignTarget { span: target.span }),
            },
            ExprKind::Field { object, .. } | ExprKind::Index { object, .. } => {
                let mut root = object.as_ref();
                while let ExprKind::Field { object, .. } | ExprKind::Index { object, .. } | ExprKind::Paren(object) =
                    &root.kind
                {
                    root = object.as_ref();
                }
                if matches!(root.kind, ExprKind::Path(_)) {
                    self.check_not_const(root);
                }
            }
            _ => self.errors.push(TypeError::InvalidAssignTarget { span: target.span }),
        }
        ty
    }

    /// Report an assignment through `path` if it names a constant.
    fn check_not_const(&mut self, path: &Expr) {
        let (name, decl_span) = match self.resolved.resolution(path.id) {
            Some(Resolution::Local(sym)) => match self.resolved.symbol(sym) {
                Some(symbol) if !symbol.mutable => (symbol.name.clone(), symbol.span),
                _ => return,
            },
            Some(Resolution::Def(def)) => {
                let def = self.resolved.def(def);
                if def.kind != DefKind::Const {
                    return;
                }
                (def.name.clone(), def.span)
            }
            _ => return,
        };
        self.errors.push(TypeError::AssignToConst { name, span: path.span, decl_span });
    }

    // ------------------------------------------------------------------------
    // Calls, fields, indexing
    // ------------------------------------------------------------------------

    fn check_call(&mut self, func: &Expr, args: &[Expr], span: Span) -> Type {
        if let Some(Resolution::Builtin(builtin)) = self.resolved.resolution(func.id) {
            if matches!(func.kind, ExprKind::Path(_)) {
                return self.check_builtin_call(builtin, func, args, span);
            }
        }

        match self.check_expr(func, None) {
            Type::Fn { params, ret } => {
                if params.len() != args.len() {
                    self.errors.push(TypeError::ArityMismatch { expected: params.len(), found: args.len(), span });
                    for arg in args {
                        self.check_expr(arg, None);
                    }
                } else {
                    for (arg, param) in args.iter().zip(&params) {
                        self.check_expr_expecting(arg, param);
                    }
                }
                *ret
            }
            other => {
                if !other.is_error() {
                    self.errors.push(TypeError::NotCallable { ty: other, span: func.span });
                }
                for arg in args {
                    self.check_expr(arg, None);
                }
                Type::Error
            }
        }
    }

    fn check_field(&mut self, object: &Expr, field: &FieldName, field_span: Span) -> Type {
        let object_ty = self.check_expr(object, None);
        let Type::Named { id, .. } = &object_ty else {
            if !object_ty.is_error() {
                self.errors.push(TypeError::NoSuchField {
                    ty: object_ty.clone(),
                    field: field.to_string(),
                    candidates: Vec::new(),
                    span: field_span,
                });
            }
            return Type::Error;
        };

        let (found, candidates) = match (self.types.struct_fields(*id), field) {
            (Some(StructFields::Named(fields)), FieldName::Named(name)) => (
                fields.iter().find(|(n, _)| n == name).map(|(_, t)| t.clone()),
                fields.iter().map(|(n, _)| n.clone()).collect(),
            ),
            (Some(StructFields::Tuple(fields)), FieldName::Index(i)) => {
                (fields.get(*i).cloned(), (0..fields.len()).map(|i| i.to_string()).collect())
            }
            (Some(StructFields::Named(fields)), FieldName::Index(_)) => {
                (None, fields.iter().map(|(n, _)| n.clone()).collect())
            }
            _ => (None, Vec::new()),
        };

        match found {
            Some(ty) => ty,
            None => {
                self.errors.push(TypeError::NoSuchField {
                    ty: object_ty,
                    field: field.to_string(),
                    candidates,
                    span: field_span,
                });
                Type::Error
            }
        }
    }

    fn check_index(&mut self, object: &Expr, index: &Expr) -> Type {
        let object_ty = self.check_expr(object, None);
        let is_slice = self.check_range_operand(index);
        if !is_slice {
            self.check_expr_expecting(index, &Type::Int);
        }
        match object_ty {
            Type::Array(elem) => {
                if is_slice { Type::Array(elem) } else { *elem }
            }
            Type::Str => Type::Str,
            Type::Error => Type::Error,
            other => {
                self.errors.push(TypeError::NotIndexable { ty: other, span: object.span });
                Type::Error
            }
        }
    }

    /// If `expr` is a range, check it in a position where ranges are allowed.
    fn check_range_operand(&mut self, expr: &Expr) -> bool {
        let ExprKind::Range { start, end } = &expr.kind else {
            return false;
        };
        self.check_range_bounds(start.as_deref(), end.as_deref());
        self.record(expr.id, Type::Range);
        true
    }

    fn check_range_bounds(&mut self, start: Option<&Expr>, end: Option<&Expr>) {
        for bound in [start, end].into_iter().flatten() {
            self.check_expr_expecting(bound, &Type::Int);
        }
        if let (Some(s), Some(e)) = (start, end) {
            if let (Some(ConstValue::Int(a)), Some(ConstValue::Int(b))) =
                (ConstValue::from_expr(s), ConstValue::from_expr(e))
            {
                if a > b {
                    self.errors.push(TypeError::InvalidRange { start: a, end: b, span: s.span.to(e.span) });
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------------

    fn check_struct_lit(&mut self, expr: &Expr, path: &Path, fields: &[FieldInit]) -> Type {
        let declared = match self.resolved.resolution(expr.id) {
            Some(Resolution::Def(def)) => match self.types.type_of_def(def) {
                Some(ty @ Type::Named { id, .. }) => match self.types.struct_fields(id) {
                    Some(StructFields::Named(declared)) => Some((ty, declared.clone())),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        };

        let Some((ty, declared)) = declared else {
            if self.resolved.resolution(expr.id).is_some() {
                self.errors.push(TypeError::NotANamedStruct { name: path.to_string(), span: path.span });
            }
            for field in fields {
                self.check_expr(&field.value, None);
            }
            return Type::Error;
        };

        let mut seen: HashMap<&str, Span> = HashMap::new();
        for init in fields {
            let name = init.name.name.as_str();
            if let Some(previous) = seen.get(name) {
                self.errors.push(TypeError::DuplicateField {
                    field: name.to_string(),
                    span: init.name.span,
                    previous: *previous,
                });
                self.check_expr(&init.value, None);
                continue;
            }
            seen.insert(name, init.name.span);
            match declared.iter().find(|(n, _)| n == name) {
                Some((_, field_ty)) => {
                    self.check_expr_expecting(&init.value, field_ty);
                }
                None => {
                    self.errors.push(TypeError::NoSuchField {
                        ty: ty.clone(),
                        field: name.to_string(),
                        candidates: declared.iter().map(|(n, _)| n.clone()).collect(),
                        span: init.name.span,
                    });
                    self.check_expr(&init.value, None);
                }
            }
        }

        let missing: Vec<String> =
            declared.iter().filter(|(n, _)| !seen.contains_key(n.as_str())).map(|(n, _)| n.clone()).collect();
        if !missing.is_empty() {
            self.errors.push(TypeError::MissingFields { ty: ty.clone(), fields: missing, span: path.span });
        }
        ty
    }

    fn check_array(&mut self, elems: &[Expr], expected: Option<&Type>, span: Span) -> Type {
        if let Some(Type::Array(elem)) = expected {
            let elem = (**elem).clone();
            for e in elems {
                self.check_expr_expecting(e, &elem);
            }
            return Type::array(elem);
        }

        let Some((first, rest)) = elems.split_first() else {
            self.errors.push(TypeError::CannotInfer { span });
            return Type::Error;
        };
        let elem = self.check_expr(first, None);
        for e in rest {
            self.check_expr_expecting(e, &elem);
        }
        Type::array(elem)
    }

    // ------------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------------

    fn check_if(&mut self, cond: &Expr, then_branch: &Block, else_branch: Option<&Expr>, expected: Option<&Type>) -> Type {
        self.check_expr_expecting(cond, &Type::Bool);
        match else_branch {
            None => {
                let then_ty = self.check_block(then_branch, Some(&Type::Unit));
                self.require(&Type::Unit, &then_ty, block_value_span(then_branch));
                Type::Unit
            }
            Some(else_expr) => {
                let then_ty = self.check_block(then_branch, expected);
                let else_hint = match expected {
                    Some(ty) => Some(ty.clone()),
                    None if !then_ty.is_never() => Some(then_ty.clone()),
                    None => None,
                };
                let else_ty = self.check_expr(else_expr, else_hint.as_ref());
                self.join_branches(then_ty, else_ty, value_span(else_expr))
            }
        }
    }

    /// The type of two branches that must agree.
    pub(super) fn join_branches(&mut self, first: Type, second: Type, span: Span) -> Type {
        match (&first, &second) {
            (Type::Never, _) | (Type::Error, _) => second,
            (_, Type::Never) | (_, Type::Error) => first,
            _ if first.accepts(&second) => first,
            _ => {
                self.errors.push(TypeError::Mismatch { expected: first, found: second, span });
                Type::Error
            }
        }
    }

    fn check_loop_body(&mut self, body: &Block) {
        let ty = self.check_block(body, Some(&Type::Unit));
        self.require(&Type::Unit, &ty, block_value_span(body));
    }
}

/// An integer literal, or arithmetic built only from them, such as `-(2 + 3)`.
fn is_int_literal(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Int(_) => true,
        ExprKind::Unary { op: UnaryOp::Neg, operand } => is_int_literal(operand),
        ExprKind::Paren(inner) => is_int_literal(inner),
        ExprKind::Binary { op, left, right } => {
            op.category() == OpCategory::Arithmetic && is_int_literal(left) && is_int_literal(right)
        }
        _ => false,
    }
}

/// Where the value of an expression comes from, for error labels.
pub(super) fn value_span(expr: &Expr) -> Span {
    match &expr.kind {
        ExprKind::Block(block) => block_value_span(block),
        _ => expr.span,
    }
}

fn block_value_span(block: &Block) -> Span {
    match &block.tail {
        Some(tail) => value_span(tail),
        None => block.span,
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Match expressions and pattern checking.

use std::collections::HashMap;

use raccoon_ast::expr::{Expr, FieldPattern, Literal, MatchArm, Pattern, PatternKind};
use raccoon_ast::{Path, Span};
use raccoon_resolve::{DefKind, Resolution};

use super::check_expr::value_span;
use super::errors::{TypeError, TypeWarning};
use super::type_defs::StructFields;
use super::TypeChecker;

use crate::pattern::{is_irrefutable, select_arm, ConstValue};
use crate::types::Type;

/// What a path in a pattern refers to: the type it matches and, for
/// constructors with a payload, the payload types.
struct PatternTarget {
    ty: Type,
    fields: Option<Vec<Type>>,
}

impl TypeChecker {
    pub(super) fn check_match(
        &mut self,
        expr: &Expr,
        scrutinee: &Expr,
        arms: &[MatchArm],
        expected: Option<&Type>,
    ) -> Type {
        let scrutinee_ty = self.check_expr(scrutinee, None);

        let mut result: Option<Type> = None;
        let mut diverges = !arms.is_empty();
        let mut catch_all: Option<Span> = None;

        for arm in arms {
            if let Some(covered_by) = catch_all {
                self.warnings.push(TypeWarning::UnreachableArm { span: arm.pattern.span, covered_by });
            }
            self.check_pattern(&arm.pattern, &scrutinee_ty);
            if catch_all.is_none() && is_irrefutable(&arm.pattern) {
                catch_all = Some(arm.pattern.span);
            }

            let hint = expected.cloned().or_else(|| result.clone());
            let ty = self.check_expr(&arm.body, hint.as_ref());
            if ty.is_never() {
                continue;
            }
            diverges = false;
            result = Some(match result.take() {
                None => ty,
                Some(first) => self.join_branches(first, ty, value_span(&arm.body)),
            });
        }

        if catch_all.is_none() {
            self.check_exhaustive(&scrutinee_ty, arms, expr.span);
        }

        if let Some(value) = ConstValue::from_expr(scrutinee) {
            if let Some(index) = select_arm(arms, &value) {
                self.selected_arms.insert(expr.id, index);
            }
        }

        if diverges { Type::Never } else { result.unwrap_or(Type::Unit) }
    }

    /// Check `pattern` against a scrutinee of type `expected`, giving its
    /// bindings their types.
    fn check_pattern(&mut self, pattern: &Pattern, expected: &Type) {
        match &pattern.kind {
            PatternKind::Wildcard => {}
            PatternKind::Binding(_) => {
                if let Some(sym) = self.resolved.bindings.get(&pattern.id).copied() {
                    self.local_types.insert(sym, expected.clone());
                }
            }
            PatternKind::Literal(lit) => {
                let ty = match lit {
                    Literal::Int(_) if *expected == Type::Float => Type::Float,
                    Literal::Int(_) => Type::Int,
                    Literal::Float(_) => Type::Float,
                    Literal::Str(_) => Type::Str,
                    Literal::Bool(_) => Type::Bool,
                };
                self.require(expected, &ty, pattern.span);
            }
            PatternKind::Path(path) => {
                let Some(target) = self.pattern_target(pattern, path) else {
                    return;
                };
                if let Some(fields) = &target.fields {
                    self.errors.push(TypeError::ArityMismatch { expected: fields.len(), found: 0, span: pattern.span });
                }
                self.require(expected, &target.ty, pattern.span);
            }
            PatternKind::TupleStruct { path, fields } => {
                let target = self.pattern_target(pattern, path);
                let payload = match &target {
                    Some(PatternTarget { ty, fields: Some(payload) }) => {
                        self.require(expected, ty, pattern.span);
                        if payload.len() == fields.len() {
                            Some(payload.clone())
                        } else {
                            self.errors.push(TypeError::ArityMismatch {
                                expected: payload.len(),
                                found: fields.len(),
                                span: pattern.span,
                            });
                            None
                        }
                    }
                    Some(PatternTarget { ty, fields: None }) => {
                        self.require(expected, ty, pattern.span);
                        self.errors.push(TypeError::ArityMismatch { expected: 0, found: fields.len(), span: pattern.span });
                        None
                    }
                    None => None,
                };
                match payload {
                    Some(payload) => {
                        for (field, ty) in fields.iter().zip(&payload) {
                            self.check_pattern(field, ty);
                        }
                    }
                    None => {
                        for field in fields {
                            self.check_pattern(field, &Type::Error);
                        }
                    }
                }
            }
            PatternKind::Struct { path, fields, rest } => self.check_struct_pattern(pattern, path, fields, *rest, expected),
            PatternKind::Or(alternatives) => {
                for alt in alternatives {
                    self.check_pattern(alt, expected);
                }
            }
        }
    }

    fn check_struct_pattern(
        &mut self,
        pattern: &Pattern,
        path: &Path,
        fields: &[FieldPattern],
        rest: bool,
        expected: &Type,
    ) {
        let declared = match self.resolved.resolution(pattern.id) {
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
            if self.resolved.resolution(pattern.id).is_some() {
                self.errors.push(TypeError::NotANamedStruct { name: path.to_string(), span: path.span });
            }
            for field in fields {
                self.check_pattern(&field.pattern, &Type::Error);
            }
            return;
        };
        self.require(expected, &ty, pattern.span);

        let mut seen: HashMap<&str, Span> = HashMap::new();
        for field in fields {
            let name = field.name.name.as_str();
            let field_ty = if let Some(previous) = seen.get(name) {
                self.errors.push(TypeError::DuplicateField {
                    field: name.to_string(),
                    span: field.name.span,
                    previous: *previous,
                });
                Type::Error
            } else {
                seen.insert(name, field.name.span);
                match declared.iter().find(|(n, _)| n == name) {
                    Some((_, field_ty)) => field_ty.clone(),
                    None => {
                        self.errors.push(TypeError::NoSuchField {
                            ty: ty.clone(),
                            field: name.to_string(),
                            candidates: declared.iter().map(|(n, _)| n.clone()).collect(),
                            span: field.name.span,
                        });
                        Type::Error
                    }
                }
            };
            self.check_pattern(&field.pattern, &field_ty);
        }

        if !rest {
            let missing: Vec<String> =
                declared.iter().filter(|(n, _)| !seen.contains_key(n.as_str())).map(|(n, _)| n.clone()).collect();
            if !missing.is_empty() {
                self.errors.push(TypeError::MissingPatternFields { ty, fields: missing, span: path.span });
            }
        }
    }

    /// Look up the variant, struct or constant a pattern path names.
    fn pattern_target(&mut self, pattern: &Pattern, path: &Path) -> Option<PatternTarget> {
        let Some(Resolution::Def(def)) = self.resolved.resolution(pattern.id) else {
            return None;
        };
        let kind = self.resolved.def(def).kind.clone();
        match kind {
            DefKind::Variant { parent, index } => {
                let ty = self.types.type_of_def(parent)?;
                let Type::Named { id, .. } = &ty else {
                    return None;
                };
                let fields = self.types.variants(*id)?.get(index)?.fields.clone();
                Some(PatternTarget { ty, fields })
            }
            DefKind::Struct => {
                let ty = self.types.type_of_def(def)?;
                let Type::Named { id, .. } = &ty else {
                    return None;
                };
                match self.types.struct_fields(*id)? {
                    StructFields::Unit => Some(PatternTarget { ty, fields: None }),
                    StructFields::Tuple(fields) => {
                        let fields = Some(fields.clone());
                        Some(PatternTarget { ty, fields })
                    }
                    StructFields::Named(_) => {
                        self.not_a_value(path.to_string(), "struct", path.span);
                        None
                    }
                }
            }
            DefKind::Const => {
                let ty = self.const_types.get(&def).cloned()?;
                Some(PatternTarget { ty, fields: None })
            }
            other => {
                self.not_a_value(path.to_string(), other.describe(), path.span);
                None
            }
        }
    }

    /// Warn about a `bool` or enum match that misses values.
    fn check_exhaustive(&mut self, ty: &Type, arms: &[MatchArm], span: Span) {
        let missing: Vec<String> = match ty {
            Type::Bool => [true, false]
                .into_iter()
                .filter(|b| !arms.iter().any(|arm| covers_bool(&arm.pattern, *b)))
                .map(|b| b.to_string())
                .collect(),
            Type::Named { id, name } => {
                let Some(variants) = self.types.variants(*id) else {
                    return;
                };
                let enum_name = name.rsplit("::").next().unwrap_or(name);
                variants
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| !arms.iter().any(|arm| self.covers_variant(&arm.pattern, *index)))
                    .map(|(_, v)| match v.fields {
                        Some(_) => format!("{}::{}(..)", enum_name, v.name),
                        None => format!("{}::{}", enum_name, v.name),
                    })
                    .collect()
            }
            _ => return,
        };

        if !missing.is_empty() {
            self.warnings.push(TypeWarning::NonExhaustiveMatch { missing, span });
        }
    }

    fn covers_variant(&self, pattern: &Pattern, index: usize) -> bool {
        let names_variant = || {
            matches!(
                self.resolved.resolution(pattern.id),
                Some(Resolution::Def(def)) if matches!(self.resolved.def(def).kind, DefKind::Variant { index: i, .. } if i == index)
            )
        };
        match &pattern.kind {
            PatternKind::Wildcard | PatternKind::Binding(_) => true,
            PatternKind::Path(_) => names_variant(),
            PatternKind::TupleStruct { fields, .. } => names_variant() && fields.iter().all(is_irrefutable),
            PatternKind::Or(alternatives) => alternatives.iter().any(|p| self.covers_variant(p, index)),
            PatternKind::Literal(_) | PatternKind::Struct { .. } => false,
        }
    }
}

fn covers_bool(pattern: &Pattern, value: bool) -> bool {
    match &pattern.kind {
        PatternKind::Wildcard | PatternKind::Binding(_) => true,
        PatternKind::Literal(Literal::Bool(b)) => *b == value,
        PatternKind::Or(alternatives) => alternatives.iter().any(|p| covers_bool(p, value)),
        _ => false,
    }
}

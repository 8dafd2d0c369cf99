// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type system and type checker for the Raccoon language.
//!
//! Runs after name resolution. Every expression gets a type; declared
//! annotations are required for bindings whose initializer alone does not
//! determine one (empty arrays), and integer literals widen to `float` where
//! a float is expected.

mod checker;
mod pattern;
mod types;

pub use checker::{
    typecheck, CheckResult, FnSig, StructFields, TypeChecker, TypeDef, TypeError, TypeTable, TypeWarning,
    TypedProgram, VariantDef,
};
pub use pattern::{is_irrefutable, pattern_matches, select_arm, ConstValue};
pub use types::{Type, TypeId};

#[cfg(test)]
mod tests {
    use super::*;
    use raccoon_ast::expr::ExprKind;
    use raccoon_ast::stmt::{Stmt, StmtKind};
    use raccoon_ast::decl::ItemKind;
    use raccoon_ast::Module;

    fn check_src(source: &str) -> (Module, CheckResult) {
        let lexed = raccoon_lexer::Lexer::new(source).tokenize();
        assert!(lexed.errors.is_empty(), "lex errors: {:?}", lexed.errors);
        let parsed = raccoon_parser::Parser::new(lexed.tokens).parse();
        assert!(parsed.is_ok(), "parse errors: {:?}", parsed.errors);
        let resolved = raccoon_resolve::resolve(&parsed.module);
        assert!(resolved.is_ok(), "resolve errors: {:?}", resolved.errors);
        let result = typecheck(resolved.program, &parsed.module);
        (parsed.module, result)
    }

    fn errors(source: &str) -> Vec<TypeError> {
        check_src(source).1.errors
    }

    fn fn_body_stmts<'a>(module: &'a Module, name: &str) -> &'a [Stmt] {
        module
            .items
            .iter()
            .find_map(|item| match &item.kind {
                ItemKind::Fn(f) if f.name.name == name => Some(f.body.stmts.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    #[test]
    fn well_typed_program_has_no_errors() {
        let src = "fn add(a: int, b: int) -> int { a + b }\n\
                   fn main() { let s = add(2, 3); println(s); }";
        let (_, result) = check_src(src);
        assert!(result.is_ok(), "{:?}", result.errors);
    }

    #[test]
    fn int_literal_widens_to_float() {
        assert!(errors("fn main() { let x: float = 2; let y = x * 2 + 1; }").is_empty());
    }

    #[test]
    fn float_does_not_narrow_to_int() {
        let errs = errors("fn main() { let x: int = 2.0; }");
        assert!(matches!(errs.as_slice(), [TypeError::Mismatch { expected: Type::Int, found: Type::Float, .. }]));
    }

    #[test]
    fn mixed_arithmetic_on_variables_is_an_error() {
        let errs = errors("fn main() { let a = 1; let b = 2.5; let c = a + b; }");
        assert!(matches!(errs.as_slice(), [TypeError::Mismatch { .. }]));
    }

    #[test]
    fn call_result_has_return_type() {
        let src = "fn add(a: int, b: int) -> int { a + b }\nfn main() { let s = add(2, 3); }";
        let (module, result) = check_src(src);
        assert!(result.is_ok());
        let stmts = fn_body_stmts(&module, "main");
        let StmtKind::Let { init, .. } = &stmts[0].kind else {
            panic!("expected let");
        };
        assert!(matches!(init.kind, ExprKind::Call { .. }));
        assert_eq!(result.program.type_of(init.id), Some(&Type::Int));
    }

    #[test]
    fn arity_is_checked() {
        let errs = errors("fn add(a: int, b: int) -> int { a + b }\nfn main() { add(1); }");
        assert!(matches!(errs.as_slice(), [TypeError::ArityMismatch { expected: 2, found: 1, .. }]));
    }

    #[test]
    fn missing_return_value() {
        let errs = errors("fn f() -> int { let x = 1; }");
        assert!(matches!(errs.as_slice(), [TypeError::MissingReturn { .. }]));
    }

    #[test]
    fn diverging_body_needs_no_tail() {
        assert!(errors("fn f() -> int { return 1; }\nfn g() -> int { loop { } }").is_empty());
    }

    #[test]
    fn bare_return_in_int_function() {
        let errs = errors("fn f() -> int { return; }");
        assert!(matches!(errs.as_slice(), [TypeError::Mismatch { expected: Type::Int, found: Type::Unit, .. }]));
    }

    #[test]
    fn struct_literal_fields_in_any_order() {
        let src = "struct Point { x: int, y: int }\nfn main() { let p = Point { y: 2, x: 1 }; let s = p.x + p.y; }";
        assert!(errors(src).is_empty());
    }

    #[test]
    fn struct_literal_missing_and_unknown_fields() {
        let src = "struct Point { x: int, y: int }\nfn main() { let p = Point { x: 1, z: 2 }; }";
        let errs = errors(src);
        assert_eq!(errs.len(), 2, "{:?}", errs);
        assert!(errs.iter().any(|e| matches!(e, TypeError::NoSuchField { field, candidates, .. }
            if field == "z" && candidates.contains(&"y".to_string()))));
        assert!(errs.iter().any(|e| matches!(e, TypeError::MissingFields { fields, .. } if fields == &["y"])));
    }

    #[test]
    fn duplicate_struct_literal_field() {
        let src = "struct P { x: int }\nfn main() { let p = P { x: 1, x: 2 }; }";
        let errs = errors(src);
        assert!(matches!(errs.as_slice(), [TypeError::DuplicateField { .. }]));
    }

    #[test]
    fn assignment_to_const_points_at_declaration() {
        let src = "fn main() { const LIMIT: int = 3; LIMIT = 4; }";
        let errs = errors(src);
        let [TypeError::AssignToConst { name, span, decl_span }] = errs.as_slice() else {
            panic!("unexpected errors: {:?}", errs);
        };
        assert_eq!(name, "LIMIT");
        assert!(decl_span.start < span.start);
    }

    #[test]
    fn assignment_to_let_is_allowed() {
        assert!(errors("fn main() { let x = 1; x = 2; x += 3; }").is_empty());
    }

    #[test]
    fn if_without_else_must_be_unit() {
        let errs = errors("fn main() { let x = if true { 1 }; }");
        assert!(matches!(errs.as_slice(), [TypeError::Mismatch { expected: Type::Unit, found: Type::Int, .. }]));
    }

    #[test]
    fn if_branches_must_agree() {
        let errs = errors("fn main() { let x = if true { 1 } else { \"no\" }; }");
        assert!(matches!(errs.as_slice(), [TypeError::Mismatch { .. }]));
    }

    #[test]
    fn condition_must_be_bool() {
        let errs = errors("fn main() { while 1 { } }");
        assert!(matches!(errs.as_slice(), [TypeError::Mismatch { expected: Type::Bool, found: Type::Int, .. }]));
    }

    #[test]
    fn empty_array_needs_annotation() {
        assert!(matches!(errors("fn main() { let a = []; }").as_slice(), [TypeError::CannotInfer { .. }]));
        assert!(errors("fn main() { let a: int[] = []; }").is_empty());
    }

    #[test]
    fn indexing_and_slicing() {
        let src = "fn main() { let a = [1, 2, 3]; let x: int = a[0]; let s: int[] = a[1..3]; let t = \"hey\"; let c: str = t[0..1]; }";
        assert!(errors(src).is_empty());
    }

    #[test]
    fn reversed_literal_range_is_an_error() {
        let errs = errors("fn main() { for i in 5..1 { } }");
        assert!(matches!(errs.as_slice(), [TypeError::InvalidRange { start: 5, end: 1, .. }]));
    }

    #[test]
    fn range_outside_loop_or_index() {
        let errs = errors("fn main() { let r = 0..3; }");
        assert!(matches!(errs.as_slice(), [TypeError::MisplacedRange { .. }]));
    }

    #[test]
    fn print_rejects_unit() {
        let errs = errors("fn nothing() { }\nfn main() { println(nothing()); }");
        assert!(matches!(errs.as_slice(), [TypeError::UnitArgument { .. }]));
    }

    #[test]
    fn enum_match_is_checked() {
        let src = "enum Shape { Circle(float), Square(float), Empty }\n\
                   fn area(s: Shape) -> float {\n\
                       match s { Shape::Circle(r) => 3.14 * r * r, Shape::Square(w) => w * w, Shape::Empty => 0 }\n\
                   }";
        let (_, result) = check_src(src);
        assert!(result.is_ok(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn non_exhaustive_enum_match_warns() {
        let src = "enum Color { Red, Green, Blue }\n\
                   fn name(c: Color) -> int { match c { Color::Red => 1, Color::Green => 2 } }";
        let (_, result) = check_src(src);
        assert!(result.is_ok());
        assert!(matches!(result.warnings.as_slice(), [TypeWarning::NonExhaustiveMatch { missing, .. }]
            if missing == &["Color::Blue"]));
    }

    #[test]
    fn arm_after_wildcard_is_unreachable() {
        let src = "fn f(n: int) -> int { match n { _ => 0, 1 => 1 } }";
        let (_, result) = check_src(src);
        assert!(matches!(result.warnings.as_slice(), [TypeWarning::UnreachableArm { .. }]));
    }

    #[test]
    fn literal_scrutinee_selects_first_matching_arm() {
        let src = "fn main() { let x = match 3 { 1 => 10, 3 => 30, _ => 0 }; }";
        let (module, result) = check_src(src);
        assert!(result.is_ok());
        let stmts = fn_body_stmts(&module, "main");
        let StmtKind::Let { init, .. } = &stmts[0].kind else {
            panic!("expected let");
        };
        assert_eq!(result.program.selected_arms.get(&init.id), Some(&1));
    }

    #[test]
    fn wildcard_arm_is_selected_when_nothing_else_matches() {
        let src = "fn main() { let x = match 7 { 1 => 10, _ => 0 }; }";
        let (module, result) = check_src(src);
        let stmts = fn_body_stmts(&module, "main");
        let StmtKind::Let { init, .. } = &stmts[0].kind else {
            panic!("expected let");
        };
        assert_eq!(result.program.selected_arms.get(&init.id), Some(&1));
    }

    #[test]
    fn unknown_field_suggests_candidates() {
        let src = "struct P { value: int }\nfn main() { let p = P { value: 1 }; let v = p.valu; }";
        let errs = errors(src);
        assert!(matches!(errs.as_slice(), [TypeError::NoSuchField { field, candidates, .. }]
            if field == "valu" && candidates == &["value"]));
    }

    #[test]
    fn tuple_structs_and_variants_construct_like_calls() {
        let src = "struct Pair(int, str);\nenum Opt { Some(int), None }\n\
                   fn main() { let p = Pair(1, \"a\"); let n: int = p.0; let o = Opt::Some(3); let q = Opt::None; }";
        assert!(errors(src).is_empty());
    }

    #[test]
    fn named_struct_is_not_a_value() {
        let errs = errors("struct P { x: int }\nfn main() { let p = P; }");
        assert!(matches!(errs.as_slice(), [TypeError::NotAValue { .. }]));
    }

    #[test]
    fn for_over_array_binds_element_type() {
        let src = "fn main() { let names = [\"a\", \"b\"]; for n in names { let s: str = n; } }";
        assert!(errors(src).is_empty());
    }

    #[test]
    fn loop_with_break_is_unit() {
        assert!(errors("fn main() { let x: () = loop { break; }; }").is_empty());
    }
}

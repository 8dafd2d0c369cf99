// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Checker behavior on whole programs.

use raccoon_ast::Module;
use raccoon_types::{typecheck, CheckResult, Type, TypeError};

fn check(source: &str) -> (Module, CheckResult) {
    let lexed = raccoon_lexer::Lexer::new(source).tokenize();
    assert!(lexed.is_ok(), "lex errors: {:?}", lexed.errors);
    let parsed = raccoon_parser::Parser::new(lexed.tokens).parse();
    assert!(parsed.is_ok(), "parse errors: {:?}", parsed.errors);
    let resolved = raccoon_resolve::resolve(&parsed.module);
    assert!(resolved.is_ok(), "resolve errors: {:?}", resolved.errors);
    let result = typecheck(resolved.program, &parsed.module);
    (parsed.module, result)
}

fn errors(source: &str) -> Vec<TypeError> {
    check(source).1.errors
}

#[test]
fn float_annotation_accepts_int_literal_only() {
    assert!(errors("fn main() { let x: float = 2; }").is_empty());
    assert!(matches!(
        errors("fn main() { let x: int = 2.0; }").as_slice(),
        [TypeError::Mismatch { expected: Type::Int, found: Type::Float, .. }]
    ));
}

#[test]
fn widening_reaches_fields_and_arguments() {
    let src = "struct V { x: float }\n\
               fn scale(v: V, k: float) -> float { v.x * k }\n\
               fn main() { let v = V { x: 1 }; let s: float = scale(v, 3); }";
    assert!(errors(src).is_empty(), "{:?}", errors(src));
}

#[test]
fn errors_in_separate_functions_are_all_reported() {
    let src = "fn a() { let x: bool = 1; }\n\
               fn b() { let y: str = true; }\n\
               fn c() -> int { \"no\" }";
    assert_eq!(errors(src).len(), 3);
}

#[test]
fn module_constants_cannot_be_assigned() {
    let src = "const LIMIT: int = 10;\nfn main() { LIMIT = 11; }";
    match errors(src).as_slice() {
        [TypeError::AssignToConst { name, decl_span, .. }] => {
            assert_eq!(name, "LIMIT");
            assert_eq!(&src[decl_span.start..decl_span.end], "LIMIT");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn calls_across_modules_are_typed() {
    let src = "mod math { pub fn add(a: int, b: int) -> int { return a + b; } }\n\
               fn main() { let n: int = math::add(2, 3); let bad: str = math::add(1, 1); }";
    assert!(matches!(
        errors(src).as_slice(),
        [TypeError::Mismatch { expected: Type::Str, found: Type::Int, .. }]
    ));
}

#[test]
fn return_outside_functions_is_rejected_before_checking() {
    let src = "const X: int = return 5;\n\
               const Y: int = { return 6 };\n\
               const Z: int = { fn seven() -> int { return 7; } seven() };";
    let lexed = raccoon_lexer::Lexer::new(src).tokenize();
    let parsed = raccoon_parser::Parser::new(lexed.tokens).parse();
    assert!(parsed.is_ok(), "parse errors: {:?}", parsed.errors);
    let resolved = raccoon_resolve::resolve(&parsed.module);
    let kinds: Vec<_> = resolved.errors.iter().map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![raccoon_resolve::ResolveErrorKind::ReturnOutsideFn, raccoon_resolve::ResolveErrorKind::ReturnOutsideFn]
    );
    let result = typecheck(resolved.program, &parsed.module);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

/// Error kinds, without spans or the order of `expected` and `found`.
fn error_kinds(source: &str) -> Vec<std::mem::Discriminant<TypeError>> {
    errors(source).iter().map(std::mem::discriminant).collect()
}

#[test]
fn widening_ignores_operand_order() {
    let operands = [
        ("x", "(2 + 3)"),
        ("x", "-(4 * 2)"),
        ("x", "((1 - 7) / 2)"),
        ("x", "2.5"),
        ("n", "(2 + 3)"),
        ("n", "1.5"),
        ("x", "n"),
        ("(2 + 3)", "(x * 2)"),
    ];
    for op in ["+", "-", "*", "/"] {
        for (a, b) in operands {
            let program = |l: &str, r: &str| {
                format!("fn main() {{ let x: float = 1.5; let n: int = 2; let r = {} {} {}; }}", l, op, r)
            };
            let forward = program(a, b);
            let swapped = program(b, a);
            assert_eq!(error_kinds(&forward), error_kinds(&swapped), "{} vs {}", forward, swapped);
        }
    }

    assert!(errors("fn main() { let x: float = 1.5; let r = (2 + 3) * x; }").is_empty());
    assert!(errors("fn main() { let x: float = 1.5; let r = x * (2 + 3); }").is_empty());
    assert!(errors("fn main() { let x: float = 1.5; let r = -(2 * 3) - x; }").is_empty());
    assert!(errors("fn main() { let x: float = 1.5; let b = (2 + 3) < x; }").is_empty());
    assert!(matches!(
        errors("fn main() { let x: float = 1.5; let n: int = 2; let r = (n + 3) * x; }").as_slice(),
        [TypeError::Mismatch { expected: Type::Int, found: Type::Float, .. }]
    ));
}

#[test]
fn struct_patterns_type_their_fields() {
    let src = "struct Point { x: int, y: float }\n\
               fn main() {\n\
                   let p = Point { x: 1, y: 2.0 };\n\
                   let s: float = match p { Point { x: 0, y } => y, Point { x, .. } => 1.0 };\n\
               }";
    assert!(errors(src).is_empty(), "{:?}", errors(src));
}

#[test]
fn struct_pattern_field_errors() {
    let src = "struct Point { x: int, y: float }\n\
               fn main() {\n\
                   let p = Point { x: 1, y: 2.0 };\n\
                   let k = match p { Point { x: true, z, .. } => 0, Point { y } => 1 };\n\
               }";
    match errors(src).as_slice() {
        [TypeError::Mismatch { expected: Type::Int, found: Type::Bool, .. }, TypeError::NoSuchField { field, candidates, .. }, TypeError::MissingPatternFields { fields, span, .. }] =>
        {
            assert_eq!(field, "z");
            assert_eq!(candidates, &vec!["x".to_string(), "y".to_string()]);
            assert_eq!(fields, &vec!["x".to_string()]);
            assert_eq!(&src[span.start..span.end], "Point");
        }
        other => panic!("unexpected: {:?}", other),
    }

    let tuple = "struct Pair(int, int);\n\
                 fn main() { let q = Pair(1, 2); let k = match q { Pair { .. } => 0 }; }";
    assert!(matches!(errors(tuple).as_slice(), [TypeError::NotANamedStruct { name, .. }] if name == "Pair"));
}

#[test]
fn nested_items_are_checked_in_place() {
    let src = "fn main() {\n\
                   let n: int = double(2);\n\
                   fn double(v: int) -> int { v * 2 }\n\
                   struct Cell { v: float }\n\
                   let c = Cell { v: 1 };\n\
                   let bad: str = double(3);\n\
               }";
    assert!(matches!(
        errors(src).as_slice(),
        [TypeError::Mismatch { expected: Type::Str, found: Type::Int, .. }]
    ));

    // The outer return type is back in force after a nested function.
    let src = "fn outer() -> str {\n\
                   fn inner() -> int { return 1; }\n\
                   return 5;\n\
               }";
    assert!(matches!(
        errors(src).as_slice(),
        [TypeError::Mismatch { expected: Type::Str, found: Type::Int, .. }]
    ));
}

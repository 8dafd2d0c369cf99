// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the raccoon language.
//!
//! Transforms a token stream into an abstract syntax tree.

mod hints;
mod parser;

pub use parser::{ParseError, ParseErrorKind, ParseResult, Parser};

#[cfg(test)]
mod tests {
    use super::*;
    use raccoon_ast::decl::{ItemKind, ModBody, StructKind, UseTreeKind};
    use raccoon_ast::expr::{BinOp, Block, Expr, ExprKind, FieldName, Literal, PatternKind};
    use raccoon_ast::stmt::StmtKind;

    fn parse(src: &str) -> ParseResult {
        let lex_result = raccoon_lexer::Lexer::new(src).tokenize();
        assert!(lex_result.is_ok(), "Lex errors: {:?}", lex_result.errors);
        Parser::new(lex_result.tokens).parse()
    }

    fn parse_ok(src: &str) -> ParseResult {
        let result = parse(src);
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        result
    }

    /// Body of the first function in `src`.
    fn body(src: &str) -> Block {
        let result = parse_ok(src);
        match &result.module.items[0].kind {
            ItemKind::Fn(f) => f.body.clone(),
            other => panic!("expected fn, got {:?}", other),
        }
    }

    /// Initializer of the first `let` in `main`.
    fn let_init(expr_src: &str) -> Expr {
        let block = body(&format!("fn main() {{ let v = {}; }}", expr_src));
        match &block.stmts[0].kind {
            StmtKind::Let { init, .. } => init.clone(),
            other => panic!("expected let, got {:?}", other),
        }
    }

    fn path_name(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Path(p) => p.to_string(),
            other => panic!("expected path, got {:?}", other),
        }
    }

    #[test]
    fn multiplication_binds_tighter() {
        let e = let_init("1 + 2 * 3");
        let ExprKind::Binary { op: BinOp::Add, left, right } = e.kind else { panic!("expected +") };
        assert_eq!(left.kind, ExprKind::Int(1));
        assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn subtraction_is_left_associative() {
        let e = let_init("a - b - c");
        let ExprKind::Binary { op: BinOp::Sub, left, right } = e.kind else { panic!("expected -") };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Sub, .. }));
        assert_eq!(path_name(&right), "c");
    }

    #[test]
    fn bitwise_or_binds_tighter_than_equality() {
        let e = let_init("a | b == c");
        let ExprKind::Binary { op: BinOp::Eq, left, .. } = e.kind else { panic!("expected ==") };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::BitOr, .. }));
    }

    #[test]
    fn logical_precedence() {
        let e = let_init("a || b && !c");
        let ExprKind::Binary { op: BinOp::Or, right, .. } = e.kind else { panic!("expected ||") };
        let ExprKind::Binary { op: BinOp::And, right: inner, .. } = right.kind else { panic!("expected &&") };
        assert!(matches!(inner.kind, ExprKind::Unary { .. }));
    }

    #[test]
    fn assignment_is_right_associative() {
        let block = body("fn main() { a = b = 1; x += 2; }");
        let StmtKind::Semi(e) = &block.stmts[0].kind else { panic!("expected stmt") };
        let ExprKind::Assign { target, value } = &e.kind else { panic!("expected =") };
        assert_eq!(path_name(target), "a");
        assert!(matches!(value.kind, ExprKind::Assign { .. }));

        let StmtKind::Semi(e) = &block.stmts[1].kind else { panic!("expected stmt") };
        assert!(matches!(e.kind, ExprKind::AssignOp { op: BinOp::Add, .. }));
    }

    #[test]
    fn range_binds_looser_than_arithmetic() {
        let e = let_init("0..n + 1");
        let ExprKind::Range { start: Some(start), end: Some(end) } = e.kind else { panic!("expected range") };
        assert_eq!(start.kind, ExprKind::Int(0));
        assert!(matches!(end.kind, ExprKind::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn struct_literal_in_let() {
        let e = let_init("Point { x: 1, y }");
        let ExprKind::StructLit { path, fields } = e.kind else { panic!("expected struct literal") };
        assert_eq!(path.to_string(), "Point");
        assert_eq!(fields.len(), 2);
        assert!(!fields[0].shorthand);
        assert!(fields[1].shorthand);
    }

    #[test]
    fn brace_after_condition_is_a_block() {
        let block = body("fn main() { if ok { x } }");
        let tail = block.tail.expect("if is the tail");
        let ExprKind::If { cond, then_branch, else_branch } = tail.kind else { panic!("expected if") };
        assert_eq!(path_name(&cond), "ok");
        assert_eq!(path_name(then_branch.tail.as_ref().expect("then tail")), "x");
        assert!(else_branch.is_none());
    }

    #[test]
    fn parens_allow_struct_literal_in_condition() {
        let block = body("fn main() { if (Point { x: 1 }).x == 1 { } }");
        let tail = block.tail.expect("if is the tail");
        let ExprKind::If { cond, .. } = tail.kind else { panic!("expected if") };
        let ExprKind::Binary { left, .. } = cond.kind else { panic!("expected ==") };
        let ExprKind::Field { object, .. } = left.kind else { panic!("expected field") };
        let ExprKind::Paren(inner) = object.kind else { panic!("expected parens") };
        assert!(matches!(inner.kind, ExprKind::StructLit { .. }));
    }

    #[test]
    fn else_if_chain() {
        let block = body("fn main() { if a { 1 } else if b { 2 } else { 3 } }");
        let ExprKind::If { else_branch: Some(els), .. } = block.tail.expect("tail").kind else { panic!() };
        let ExprKind::If { else_branch: Some(last), .. } = els.kind else { panic!("expected else if") };
        assert!(matches!(last.kind, ExprKind::Block(_)));
    }

    #[test]
    fn for_over_ranges() {
        let block = body("fn main() { for i in 0..n { } for j in 0.. { break; } }");
        assert_eq!(block.stmts.len(), 1);
        let StmtKind::Expr(first) = &block.stmts[0].kind else { panic!("expected for stmt") };
        let ExprKind::For { binding, iter, .. } = &first.kind else { panic!("expected for") };
        assert_eq!(binding.name, "i");
        assert!(matches!(iter.kind, ExprKind::Range { end: Some(_), .. }));

        let ExprKind::For { iter, .. } = block.tail.expect("second for").kind else { panic!() };
        assert!(matches!(iter.kind, ExprKind::Range { end: None, .. }));
    }

    #[test]
    fn block_like_statements_need_no_semicolon() {
        let block = body("fn main() { while x { } loop { break; } let y = 1; }");
        assert_eq!(block.stmts.len(), 3);
        assert!(matches!(block.stmts[0].kind, StmtKind::Expr(_)));
        assert!(matches!(block.stmts[1].kind, StmtKind::Expr(_)));
        assert!(block.tail.is_none());
    }

    #[test]
    fn tail_expression() {
        let block = body("fn add(a: int, b: int) -> int { a + b }");
        assert!(block.stmts.is_empty());
        assert!(matches!(block.tail.expect("tail").kind, ExprKind::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn bare_return_before_brace() {
        let block = body("fn f() { return }");
        assert!(matches!(block.tail.expect("tail").kind, ExprKind::Return(None)));
    }

    #[test]
    fn nested_tuple_field_access() {
        let e = let_init("p.0.1");
        let ExprKind::Field { object, field: FieldName::Index(1), .. } = e.kind else { panic!("expected .1") };
        let ExprKind::Field { field: FieldName::Index(0), .. } = object.kind else { panic!("expected .0") };
    }

    #[test]
    fn calls_and_indexing() {
        let e = let_init("f(a, b)[0].len");
        let ExprKind::Field { object, field: FieldName::Named(name), .. } = e.kind else { panic!() };
        assert_eq!(name, "len");
        let ExprKind::Index { object: call, .. } = object.kind else { panic!("expected index") };
        let ExprKind::Call { args, .. } = call.kind else { panic!("expected call") };
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn match_patterns() {
        let e = let_init(
            "match s { Shape::Circle(r) => r, Shape::Unit => 0, 1 | 2 => 3, -1 => 4, n => { n } _ => 5 }",
        );
        let ExprKind::Match { arms, .. } = e.kind else { panic!("expected match") };
        assert_eq!(arms.len(), 6);
        assert!(matches!(arms[0].pattern.kind, PatternKind::TupleStruct { .. }));
        assert!(matches!(arms[1].pattern.kind, PatternKind::Path(_)));
        assert!(matches!(arms[2].pattern.kind, PatternKind::Or(ref alts) if alts.len() == 2));
        assert_eq!(arms[3].pattern.kind, PatternKind::Literal(Literal::Int(-1)));
        assert_eq!(arms[4].pattern.kind, PatternKind::Binding("n".to_string()));
        assert_eq!(arms[5].pattern.kind, PatternKind::Wildcard);
    }

    #[test]
    fn struct_and_enum_items() {
        let result = parse_ok(
            "pub struct P { pub x: int, y: float }\nstruct T(int, pub str);\nstruct U;\nenum Shape { Circle(float), Rect(float, float), Unit }",
        );
        let items = &result.module.items;
        assert_eq!(items.len(), 4);
        assert!(items[0].is_pub);
        let ItemKind::Struct(p) = &items[0].kind else { panic!() };
        assert!(matches!(&p.kind, StructKind::Named(f) if f.len() == 2 && f[0].is_pub && !f[1].is_pub));
        let ItemKind::Struct(t) = &items[1].kind else { panic!() };
        assert!(matches!(&t.kind, StructKind::Tuple(f) if f.len() == 2 && f[1].is_pub));
        let ItemKind::Struct(u) = &items[2].kind else { panic!() };
        assert_eq!(u.kind, StructKind::Unit);
        let ItemKind::Enum(e) = &items[3].kind else { panic!() };
        assert_eq!(e.variants.len(), 3);
        assert!(e.variants[2].fields.is_none());
    }

    #[test]
    fn use_trees() {
        let result = parse_ok("use crate::a::{b, c::d as e};\nuse super::*;\nuse m::f;");
        let ItemKind::Use(u) = &result.module.items[0].kind else { panic!() };
        assert_eq!(u.tree.prefix.to_string(), "crate::a");
        let UseTreeKind::Nested(trees) = &u.tree.kind else { panic!("expected group") };
        assert_eq!(trees.len(), 2);
        assert!(matches!(&trees[1].kind, UseTreeKind::Simple(Some(alias)) if alias.name == "e"));

        let ItemKind::Use(u) = &result.module.items[1].kind else { panic!() };
        assert_eq!(u.tree.kind, UseTreeKind::Glob);
    }

    #[test]
    fn modules_inline_and_external() {
        let result = parse_ok("mod a { pub fn f() { } }\nmod b;");
        let ItemKind::Mod(a) = &result.module.items[0].kind else { panic!() };
        assert!(matches!(&a.body, ModBody::Inline(items) if items.len() == 1));
        let ItemKind::Mod(b) = &result.module.items[1].kind else { panic!() };
        assert_eq!(b.body, ModBody::External);
    }

    #[test]
    fn array_types() {
        let result = parse_ok("fn f(xs: int[][]) -> str[] { [] }");
        let ItemKind::Fn(f) = &result.module.items[0].kind else { panic!() };
        let raccoon_ast::ty::TypeRefKind::Array(inner) = &f.params[0].ty.kind else { panic!("expected array") };
        assert!(matches!(inner.kind, raccoon_ast::ty::TypeRefKind::Array(_)));
    }

    #[test]
    fn module_const_requires_type() {
        let result = parse("const X = 1;");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("type annotation"));
        assert_eq!(result.errors[0].expected.as_deref(), Some("':'"));
    }

    #[test]
    fn missing_semicolon_reports_expected_and_found() {
        let result = parse("fn main() { let x = 1 let y = 2; }");
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.expected.as_deref(), Some("';'"));
        assert_eq!(err.found.as_deref(), Some("'let'"));
        // Recovery keeps the second statement.
        let ItemKind::Fn(f) = &result.module.items[0].kind else { panic!() };
        assert_eq!(f.body.stmts.len(), 1);
    }

    #[test]
    fn recovers_at_next_item() {
        let result = parse("fn a() { let = 1; }\nfn b() { }");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.module.items.len(), 2);
    }

    #[test]
    fn recovers_inside_inline_module() {
        let result = parse("mod m { fn ( }\nfn after() { }");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.module.items.len(), 2);
    }

    #[test]
    fn unclosed_block_at_eof() {
        let result = parse("fn main() { let x = 1;");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].found.as_deref(), Some("end of file"));
    }

    #[test]
    fn items_inside_blocks() {
        let block = body("fn main() { struct P { x: int } fn inner(p: P) -> int { p.x } let y = 1; }");
        assert_eq!(block.stmts.len(), 3);
        let StmtKind::Item(item) = &block.stmts[0].kind else { panic!("expected item") };
        assert!(matches!(item.kind, ItemKind::Struct(_)));
        let StmtKind::Item(item) = &block.stmts[1].kind else { panic!("expected item") };
        assert!(matches!(&item.kind, ItemKind::Fn(f) if f.name.name == "inner"));
    }

    #[test]
    fn module_only_items_are_rejected_in_blocks() {
        let result = parse("fn main() { mod inner { } }");
        assert!(result.errors[0].message.contains("module level"));

        let result = parse("fn main() { pub fn f() { } let x = 1; }");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("`pub`"));
        // Recovery resumes at the `fn`.
        let ItemKind::Fn(f) = &result.module.items[0].kind else { panic!() };
        assert_eq!(f.body.stmts.len(), 2);
    }

    #[test]
    fn struct_patterns() {
        let e = let_init("match p { Point { x: 0, y } => y, Point { x, .. } => x }");
        let ExprKind::Match { arms, .. } = e.kind else { panic!("expected match") };
        let PatternKind::Struct { path, fields, rest } = &arms[0].pattern.kind else { panic!("expected struct") };
        assert_eq!(path.to_string(), "Point");
        assert!(!rest);
        assert_eq!(fields[0].pattern.kind, PatternKind::Literal(Literal::Int(0)));
        assert!(!fields[0].shorthand);
        assert!(fields[1].shorthand);
        assert_eq!(fields[1].pattern.kind, PatternKind::Binding("y".to_string()));
        assert!(matches!(&arms[1].pattern.kind, PatternKind::Struct { fields, rest: true, .. } if fields.len() == 1));
    }

    #[test]
    fn rest_must_end_a_struct_pattern() {
        let result = parse("fn main() { match p { Point { .., x } => 1, _ => 2 } }");
        assert!(!result.is_ok());
        assert!(result.errors[0].hint.as_deref().is_some_and(|h| h.contains("`..`")));
    }

    #[test]
    fn most_negative_int_literal() {
        assert_eq!(let_init("-9223372036854775808").kind, ExprKind::Int(i64::MIN));
        let e = let_init("match n { -9223372036854775808 => 1, _ => 0 }");
        let ExprKind::Match { arms, .. } = e.kind else { panic!("expected match") };
        assert_eq!(arms[0].pattern.kind, PatternKind::Literal(Literal::Int(i64::MIN)));

        let result = parse("fn main() { let v = 9223372036854775808; }");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("too large"));
    }

    #[test]
    fn lexical_error_tokens_stay_silent() {
        let lex_result = raccoon_lexer::Lexer::new("fn main() { let s = \"abc\n let t = 1; }").tokenize();
        assert_eq!(lex_result.errors.len(), 1);
        let result = Parser::new(lex_result.tokens).parse();
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        let ItemKind::Fn(f) = &result.module.items[0].kind else { panic!() };
        assert_eq!(f.body.stmts.len(), 1);
    }

    #[test]
    fn error_count_is_capped() {
        let src = "fn f() { let = 1; }\n".repeat(30);
        let result = parse(&src);
        assert_eq!(result.errors.len(), 20);
    }

    #[test]
    fn node_ids_continue_across_files() {
        let first = parse_ok("fn a() { }");
        let tokens = raccoon_lexer::Lexer::new("fn b() { }").tokenize().tokens;
        let second = Parser::new(tokens).with_first_node_id(first.next_node_id).parse();
        assert!(second.module.items[0].id.0 >= first.next_node_id);
    }
}

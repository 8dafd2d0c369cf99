// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Printing a parsed program and parsing it again must give the same tree.

use raccoon_ast::Module;
use raccoon_fmt::{dump_module, format_module, format_source, format_source_with_config, FormatConfig};

fn parse(src: &str) -> Module {
    let lex = raccoon_lexer::Lexer::new(src).tokenize();
    assert!(lex.is_ok(), "Lex errors: {:?}", lex.errors);
    let result = raccoon_parser::Parser::new(lex.tokens).parse();
    assert!(result.is_ok(), "Parse errors: {:?}\nsource:\n{}", result.errors, src);
    result.module
}

fn assert_round_trip(src: &str) {
    let original = parse(src);
    let printed = format_module(&original, src, 0, &FormatConfig::default());
    let reparsed = parse(&printed);
    assert_eq!(dump_module(&original), dump_module(&reparsed), "printed:\n{}", printed);
    assert_eq!(format_source(&printed), printed, "formatting is not idempotent");
}

const EVERYTHING: &str = r#"
use crate::shapes::{Shape, area as shape_area};
use util::*;

pub const LIMIT: int = 10;

pub struct Point { pub x: float, y: float }
struct Pair(int, pub str);
struct Marker;
struct Empty {}
enum Shape { Circle(float), Rect(float, float), Nothing }

mod util {
    pub fn helper(n: int) -> int { n * 2 }
    mod inner;
}

fn main() {
    let p = Point { x: 1.5, y: 2.0 };
    let q: Point = Point { x: 0.0, y };
    const K: int = -3;
    let xs: int[] = [1, 2, 3];
    let grid: float[][] = [];
    let total = 0;
    total += xs[0] << 2 | 1 & ~3 ^ 7 % 2;
    total >>= 1;
    for i in 0..LIMIT {
        if i == 2 { continue; } else if i > 5 { break; } else { }
    }
    for j in 0.. { break; }
    while !(a && b) || c != d {}
    loop { break; }
    let s = match shape {
        Shape::Circle(r) => r * r,
        Shape::Rect(w, h) => { w * h }
        Shape::Nothing | _ => 0.0,
    };
    let lit = match n { -1 => "neg", 0 | 1 => "small", 2.5 => "float", true => "bool", "s" => "str", other => "big" };
    let t = p.0.1;
    let r = ..5;
    let u = 3..;
    let e = "esc\n\t\"q\"\\ \u{1F600}";
    let v = (1 + 2) * -3;
    let w = (Point { x: 1.0, y: 1.0 }).x;
    x = y = z;
    println(helper(a, b)[1]);
    print("no newline");
    println();
    { let inner = 1; }
    struct Cell { v: int }
    fn bump(c: Cell) -> int { c.v + 1 }
    let picked = match cell { Cell { v: 0 } => 0, Cell { v, .. } => v, Cell { .. } => -1 };
    let most = -9223372036854775808;
    return;
}

fn tail(a: int) -> int { if a >= 0 && a <= 10 { a } else { -a } }
fn unit() -> () { return }
fn big() -> float { 1.0e300 }
"#;

#[test]
fn every_construct_round_trips() {
    assert_round_trip(EVERYTHING);
}

#[test]
fn normalizes_layout() {
    let src = "fn main(){let x=1+2;if x>2{println(x);}}";
    let expected = "\
fn main() {
    let x = 1 + 2;
    if x > 2 {
        println(x);
    }
}
";
    assert_eq!(format_source(src), expected);
}

#[test]
fn keeps_comments_and_blank_lines() {
    let src = "\
// header
fn main() {
    // inside
    let x = 1;

    // before y
    let y = 2;
    // trailing
}
";
    assert_eq!(format_source(src), src);
}

#[test]
fn imports_stay_grouped() {
    let src = "use a::b;\nuse c::d;\n\nfn main() {}\n";
    assert_eq!(format_source(src), src);
}

#[test]
fn long_calls_split_one_argument_per_line() {
    let src = "fn main() { report(first_argument_with_long_name, second_argument_with_long_name, third_argument_with_long_name); }";
    let formatted = format_source(src);
    assert!(formatted.contains("report(\n        first_argument_with_long_name,\n"), "got:\n{}", formatted);
    assert_round_trip(src);
}

#[test]
fn nested_items_are_indented_with_their_block() {
    let src = "fn main() { enum Dir { Up, Down } fn flip(d: Dir) -> Dir { match d { Dir::Up => Dir::Down, _ => Dir::Up } } }";
    let expected = "\
fn main() {
    enum Dir {
        Up,
        Down,
    }
    fn flip(d: Dir) -> Dir {
        match d {
            Dir::Up => Dir::Down,
            _ => Dir::Up,
        }
    }
}
";
    assert_eq!(format_source(src), expected);
}

#[test]
fn indent_width_is_configurable() {
    let config = FormatConfig::default().with_indent(2);
    let formatted = format_source_with_config("fn main() { let x = 1; }", &config);
    assert_eq!(formatted, "fn main() {\n  let x = 1;\n}\n");
}

#[test]
fn invalid_source_is_returned_unchanged() {
    let src = "fn main( { let = ; }";
    assert_eq!(format_source(src), src);
}

#[test]
fn tree_dump_has_no_spans() {
    let module = parse("fn main() { let x = 1 + 2; }");
    let expected = "\
Module
  Fn main
    Block
      Let x
        Binary +
          Int 1
          Int 2
";
    assert_eq!(dump_module(&module), expected);
}

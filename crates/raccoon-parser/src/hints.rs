// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use raccoon_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        // Colon hints
        ("':'", TokenKind::Eq) => Some("use ':' for types, '=' for values"),
        ("':'", _) => Some("syntax: name: Type"),

        // Block hints
        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", TokenKind::Eof) => Some("every '{' needs a matching '}'"),

        // Parentheses and brackets
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),

        // Statement terminator
        ("';'", TokenKind::Ident(_)) => Some("a statement probably ended on the previous line"),
        ("';'", _) => Some("end statements with ';'"),

        // Expression hints
        ("expression", TokenKind::Eq) => Some("put the value after '='"),
        ("expression", TokenKind::Semi) => Some("statement is incomplete"),
        ("expression", _) => Some("try a value, variable, or function call"),

        // Name hints
        ("a name", TokenKind::Int(_)) => Some("names can't start with a number"),
        ("a name", k) if k.is_keyword() => Some("keywords can't be used as names"),
        ("a name", _) => Some("names start with a letter or '_'"),

        ("type", _) => Some("try a type like 'int', 'str', 'int[]', or a struct name"),
        ("pattern", _) => Some("try '_', a literal, a name, or a constructor like Shape::Circle(r)"),
        ("item", _) => Some("start with 'fn', 'struct', 'enum', 'const', 'mod', or 'use'"),
        ("'=>'", _) => Some("match arms are written: pattern => expression"),

        _ => None,
    }
}

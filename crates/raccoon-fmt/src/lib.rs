// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source formatter and tree dump for raccoon programs.

mod comment;
mod config;
mod printer;
mod tree;

use raccoon_ast::{Module, Span};

pub use config::FormatConfig;
pub use tree::dump_module;

/// Format raccoon source code with default configuration.
/// Returns formatted source, or the original if lexing or parsing fails.
pub fn format_source(source: &str) -> String {
    format_source_with_config(source, &FormatConfig::default())
}

/// Format raccoon source code with custom configuration.
pub fn format_source_with_config(source: &str, config: &FormatConfig) -> String {
    let mut lexer = raccoon_lexer::Lexer::new(source);
    let lex_result = lexer.tokenize();
    if !lex_result.errors.is_empty() {
        return source.to_string();
    }

    let mut parser = raccoon_parser::Parser::new(lex_result.tokens);
    let parse_result = parser.parse();
    if !parse_result.is_ok() {
        return source.to_string();
    }

    format_module(&parse_result.module, source, 0, config)
}

/// Print an already parsed module. `base` is the global offset the module's
/// spans were lexed at; comments are taken from `source`.
pub fn format_module(module: &Module, source: &str, base: usize, config: &FormatConfig) -> String {
    let comments = comment::extract_comments(source)
        .into_iter()
        .map(|mut c| {
            c.span = Span::new(c.span.start + base, c.span.end + base);
            c
        })
        .collect();
    let comment_list = comment::CommentList::new(comments);

    let mut p = printer::Printer::new(source, base, comment_list, config);
    p.format_module(module);
    p.finish()
}

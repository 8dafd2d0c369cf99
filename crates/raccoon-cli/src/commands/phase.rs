// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Phase inspection commands: lex and parse.

use std::path::Path;

use anyhow::Result;
use raccoon_ast::token::TokenKind;
use raccoon_compiler::{compile, CompileOptions, FsLoader, Stage};
use raccoon_fmt::{dump_module, format_module, FormatConfig};

use super::{show_diagnostics, Outcome};
use crate::output;

pub fn lex(path: &Path) -> Result<Outcome> {
    let options = CompileOptions::default().stop_after(Stage::Lex);
    let compilation = compile(&FsLoader, path, &options)?;

    for tok in &compilation.tokens {
        if tok.kind == TokenKind::Eof {
            continue;
        }
        println!("{}:{} {} {}", tok.pos.line, tok.pos.column, tok.kind.category(), tok.lexeme);
    }

    show_diagnostics(&compilation.sources, &compilation.diagnostics);
    if compilation.success() {
        Ok(Outcome::Ok)
    } else {
        eprintln!("{}", output::banner_fail("lex", compilation.error_count(), 0));
        Ok(Outcome::Failed)
    }
}

pub fn parse(path: &Path, tree: bool) -> Result<Outcome> {
    let options = CompileOptions::default().stop_after(Stage::Parse);
    let compilation = compile(&FsLoader, path, &options)?;

    if !compilation.success() {
        show_diagnostics(&compilation.sources, &compilation.diagnostics);
        eprintln!("{}", output::banner_fail("parse", compilation.error_count(), 0));
        return Ok(Outcome::Failed);
    }

    let (Some(module), Some(root)) = (&compilation.module, compilation.sources.files().first()) else {
        return Ok(Outcome::Ok);
    };
    if tree {
        print!("{}", dump_module(module));
    } else {
        print!("{}", format_module(module, &root.source, root.base, &FormatConfig::default()));
    }
    Ok(Outcome::Ok)
}

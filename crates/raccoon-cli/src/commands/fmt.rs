// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `raccoon fmt`: print a file in canonical layout.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use raccoon_ast::SourceMap;
use raccoon_diagnostics::{Diagnostic, ToDiagnostic};
use raccoon_fmt::{format_module, FormatConfig};

use super::{show_diagnostics, Outcome};
use crate::output;

pub fn fmt(path: &Path, check: bool, indent: usize) -> Result<Outcome> {
    let source = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path.display().to_string();

    // Only this file is formatted; `mod` items are left unloaded.
    let lexed = raccoon_lexer::Lexer::new(&source).tokenize();
    let lex_errors: Vec<Diagnostic> = lexed.errors.iter().map(ToDiagnostic::to_diagnostic).collect();
    let parsed = raccoon_parser::Parser::new(lexed.tokens).parse();

    if !lex_errors.is_empty() || !parsed.is_ok() {
        let mut diagnostics = lex_errors;
        diagnostics.extend(parsed.errors.iter().map(ToDiagnostic::to_diagnostic));
        raccoon_diagnostics::sort_diagnostics(&mut diagnostics);

        let mut sources = SourceMap::new();
        sources.add_file(name, Some(path.to_path_buf()), source);
        show_diagnostics(&sources, &diagnostics);
        eprintln!("{}", output::banner_fail("fmt", diagnostics.len(), 0));
        return Ok(Outcome::Failed);
    }

    let config = FormatConfig::default().with_indent(indent);
    let formatted = format_module(&parsed.module, &source, 0, &config);

    if check {
        if formatted == source {
            return Ok(Outcome::Ok);
        }
        eprintln!("{} is not formatted", output::file_path(&name));
        return Ok(Outcome::Failed);
    }

    print!("{}", formatted);
    Ok(Outcome::Ok)
}

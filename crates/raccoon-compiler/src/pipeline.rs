// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The front-end pipeline: load → resolve → check, collecting diagnostics.

use std::path::Path;

use raccoon_ast::token::Token;
use raccoon_ast::{Module, SourceMap};
use raccoon_diagnostics::{sort_diagnostics, Diagnostic, Severity, ToDiagnostic};
use raccoon_lexer::Lexer;
use raccoon_types::TypedProgram;

use crate::loader::{LoadError, MemoryLoader, ModuleLoader, SourceLoader};
use crate::options::{CompileOptions, Stage};

/// Everything a compilation produced.
#[derive(Debug)]
pub struct Compilation {
    pub sources: SourceMap,
    /// Tokens of the root file; only kept when stopping after lexing.
    pub tokens: Vec<Token>,
    /// The module tree; None when stopping after lexing.
    pub module: Option<Module>,
    /// Present when the checker ran.
    pub typed: Option<TypedProgram>,
    /// Sorted by position.
    pub diagnostics: Vec<Diagnostic>,
    /// Error diagnostics dropped by `max_errors`.
    pub truncated: usize,
    /// The last stage that ran.
    pub stage: Stage,
}

impl Compilation {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count() + self.truncated
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn success(&self) -> bool {
        self.error_count() == 0
    }
}

/// Compile the module tree rooted at `root`.
///
/// Only a root file that cannot be read is an `Err`; every other problem
/// ends up in [`Compilation::diagnostics`]. Resolution and checking are
/// skipped when any file failed to lex, parse or load.
pub fn compile<L: SourceLoader>(loader: &L, root: &Path, options: &CompileOptions) -> Result<Compilation, LoadError> {
    if options.stop_after == Stage::Lex {
        return lex_only(loader, root, options);
    }

    let tree = ModuleLoader::new(loader).load(root)?;
    let mut diagnostics: Vec<Diagnostic> = tree
        .lex_errors
        .iter()
        .map(ToDiagnostic::to_diagnostic)
        .chain(tree.parse_errors.iter().map(ToDiagnostic::to_diagnostic))
        .chain(tree.load_errors.iter().map(ToDiagnostic::to_diagnostic))
        .collect();

    let mut compilation = Compilation {
        sources: tree.sources,
        tokens: Vec::new(),
        module: None,
        typed: None,
        diagnostics: Vec::new(),
        truncated: 0,
        stage: Stage::Parse,
    };

    let front_end_ok = diagnostics.is_empty();
    if options.stop_after == Stage::Check && front_end_ok {
        let resolved = raccoon_resolve::resolve(&tree.module);
        tracing::debug!(errors = resolved.errors.len(), "resolved names");
        diagnostics.extend(resolved.errors.iter().map(ToDiagnostic::to_diagnostic));

        let checked = raccoon_types::typecheck(resolved.program, &tree.module);
        tracing::debug!(errors = checked.errors.len(), warnings = checked.warnings.len(), "type checked");
        diagnostics.extend(checked.errors.iter().map(ToDiagnostic::to_diagnostic));
        diagnostics.extend(checked.warnings.iter().map(ToDiagnostic::to_diagnostic));

        compilation.typed = Some(checked.program);
        compilation.stage = Stage::Check;
    } else if !front_end_ok {
        tracing::debug!(errors = diagnostics.len(), "skipping resolution after front-end errors");
    }

    compilation.module = Some(tree.module);
    finish(&mut compilation, diagnostics, options);
    Ok(compilation)
}

/// Compile a single in-memory source named `name`.
pub fn compile_source(name: &str, source: &str, options: &CompileOptions) -> Compilation {
    let loader = MemoryLoader::new().with_file(name, source);
    match compile(&loader, Path::new(name), options) {
        Ok(compilation) => compilation,
        // The root is always present in the loader.
        Err(err) => Compilation {
            sources: SourceMap::new(),
            tokens: Vec::new(),
            module: None,
            typed: None,
            diagnostics: vec![err.to_diagnostic()],
            truncated: 0,
            stage: Stage::Lex,
        },
    }
}

fn lex_only<L: SourceLoader>(loader: &L, root: &Path, options: &CompileOptions) -> Result<Compilation, LoadError> {
    let source = loader
        .load(root)
        .map_err(|source| LoadError::Io { path: root.to_path_buf(), source, span: None })?;

    let mut sources = SourceMap::new();
    let (_, base) = sources.add_file(root.display().to_string(), Some(root.to_path_buf()), source);
    let text = sources.files().last().map(|f| f.source.as_str()).unwrap_or("");
    let lexed = Lexer::with_base(text, base).tokenize();

    let diagnostics = lexed.errors.iter().map(ToDiagnostic::to_diagnostic).collect();
    let mut compilation = Compilation {
        sources,
        tokens: lexed.tokens,
        module: None,
        typed: None,
        diagnostics: Vec::new(),
        truncated: 0,
        stage: Stage::Lex,
    };
    finish(&mut compilation, diagnostics, options);
    Ok(compilation)
}

/// Apply `deny_warnings`, sort, then apply `max_errors`.
fn finish(compilation: &mut Compilation, mut diagnostics: Vec<Diagnostic>, options: &CompileOptions) {
    if options.deny_warnings {
        for diag in diagnostics.iter_mut().filter(|d| d.severity == Severity::Warning) {
            diag.severity = Severity::Error;
        }
    }

    sort_diagnostics(&mut diagnostics);

    if options.max_errors > 0 {
        let mut errors_seen = 0;
        let before = diagnostics.len();
        diagnostics.retain(|d| {
            if d.severity != Severity::Error {
                return true;
            }
            errors_seen += 1;
            errors_seen <= options.max_errors
        });
        compilation.truncated = before - diagnostics.len();
    }

    compilation.diagnostics = diagnostics;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_program_reaches_the_checker() {
        let compilation = compile_source(
            "main.rcn",
            "fn add(a: int, b: int) -> int { return a + b; }\nfn main() { let x: int = add(2, 3); }\n",
            &CompileOptions::default(),
        );
        assert!(compilation.success(), "{:?}", compilation.diagnostics);
        assert_eq!(compilation.stage, Stage::Check);
        assert!(compilation.typed.is_some());
    }

    #[test]
    fn syntax_errors_skip_the_checker() {
        let compilation = compile_source("main.rcn", "fn main() { let x: int = ; }\n", &CompileOptions::default());
        assert!(!compilation.success());
        assert_eq!(compilation.stage, Stage::Parse);
        assert!(compilation.typed.is_none());
    }

    #[test]
    fn lex_stage_keeps_tokens() {
        let options = CompileOptions::default().stop_after(Stage::Lex);
        let compilation = compile_source("main.rcn", "let x = 1;", &options);
        assert_eq!(compilation.stage, Stage::Lex);
        assert!(compilation.module.is_none());
        // let x = 1 ; <eof>
        assert_eq!(compilation.tokens.len(), 6);
    }

    #[test]
    fn max_errors_keeps_the_earliest() {
        let source = "fn main() {\n    let a: int = 1.0;\n    let b: int = 2.0;\n    let c: int = 3.0;\n}\n";
        let options = CompileOptions::default().with_max_errors(2);
        let compilation = compile_source("main.rcn", source, &options);
        assert_eq!(compilation.diagnostics.len(), 2);
        assert_eq!(compilation.truncated, 1);
        assert_eq!(compilation.error_count(), 3);
        let starts: Vec<usize> = compilation.diagnostics.iter().filter_map(|d| d.primary_span()).map(|s| s.start).collect();
        assert!(starts[0] < starts[1]);
    }
}

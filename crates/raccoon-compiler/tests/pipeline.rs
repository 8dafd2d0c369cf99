// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! End-to-end runs of the pipeline over the fixture programs.

use std::path::PathBuf;

use raccoon_compiler::{compile, Compilation, CompileOptions, FsLoader, MemoryLoader, Stage};
use raccoon_diagnostics::formatter::DiagnosticFormatter;
use raccoon_diagnostics::{DiagnosticKind, Severity};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn run(name: &str, options: &CompileOptions) -> Compilation {
    match compile(&FsLoader, &fixture(name), options) {
        Ok(compilation) => compilation,
        Err(err) => panic!("cannot load fixture {}: {}", name, err),
    }
}

fn codes(compilation: &Compilation) -> Vec<&str> {
    compilation
        .diagnostics
        .iter()
        .map(|d| d.code.as_ref().map(|c| c.0.as_str()).unwrap_or("-"))
        .collect()
}

#[test]
fn clean_program_has_no_diagnostics() {
    let compilation = run("hello.rcn", &CompileOptions::default());
    assert!(compilation.diagnostics.is_empty(), "{:?}", compilation.diagnostics);
    assert!(compilation.success());
    assert_eq!(compilation.stage, Stage::Check);
}

#[test]
fn type_errors_come_out_in_source_order() {
    let compilation = run("type_errors.rcn", &CompileOptions::default());
    assert_eq!(codes(&compilation), vec!["E0301", "E0302", "E0308"]);
    assert!(compilation.diagnostics.iter().all(|d| d.kind == DiagnosticKind::Type));
}

#[test]
fn terminal_output_points_at_the_line() {
    colored::control::set_override(false);
    let compilation = run("type_errors.rcn", &CompileOptions::default());
    let output = DiagnosticFormatter::new(&compilation.sources).format(&compilation.diagnostics[0]);
    assert!(output.starts_with("error[E0301]: mismatched types: expected int, found float"), "{}", output);
    assert!(output.contains("type_errors.rcn:8:18"), "{}", output);
    assert!(output.contains("8 |     let x: int = 2.0;"), "{}", output);
}

#[test]
fn lexical_errors_do_not_cascade() {
    let compilation = run("syntax_errors.rcn", &CompileOptions::default());
    // One unterminated string, one malformed `let`. The type error in
    // `never_checked` is not reported because checking is skipped.
    let kinds: Vec<_> = compilation.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::Lex, DiagnosticKind::Parse]);
    assert_eq!(codes(&compilation), vec!["E0002", "E0100"]);
    assert_eq!(compilation.stage, Stage::Parse);
    assert!(compilation.typed.is_none());
}

#[test]
fn modules_load_from_sibling_files_and_directories() {
    let compilation = run("multi/main.rcn", &CompileOptions::default());
    assert!(compilation.success(), "{:?}", compilation.diagnostics);
    assert_eq!(compilation.sources.files().len(), 3);
}

#[test]
fn missing_module_file_is_a_load_error() {
    let compilation = run("missing_mod.rcn", &CompileOptions::default());
    assert_eq!(codes(&compilation), vec!["E0401"]);
    let diag = &compilation.diagnostics[0];
    assert_eq!(diag.kind, DiagnosticKind::Load);
    assert!(diag.message.contains("nowhere"));
    assert_eq!(compilation.stage, Stage::Parse);
}

#[test]
fn file_cycles_are_import_cycles() {
    let loader = MemoryLoader::new()
        .with_file("app/main.rcn", "mod a;\nfn main() {}\n")
        .with_file("app/a.rcn", "mod b;\n")
        .with_file("app/b.rcn", "mod a;\n");
    let compilation = match compile(&loader, &PathBuf::from("app/main.rcn"), &CompileOptions::default()) {
        Ok(compilation) => compilation,
        Err(err) => panic!("{}", err),
    };
    assert_eq!(codes(&compilation), vec!["E0208"]);
    assert_eq!(compilation.diagnostics[0].kind, DiagnosticKind::Resolve);
}

#[test]
fn warnings_do_not_fail_unless_denied() {
    let compilation = run("warnings.rcn", &CompileOptions::default());
    assert_eq!(codes(&compilation), vec!["W0302"]);
    assert_eq!(compilation.warning_count(), 1);
    assert!(compilation.success());

    let denied = run("warnings.rcn", &CompileOptions::default().with_deny_warnings(true));
    assert_eq!(denied.diagnostics[0].severity, Severity::Error);
    assert!(!denied.success());
}

#[test]
fn parse_stage_skips_checking() {
    let compilation = run("type_errors.rcn", &CompileOptions::default().stop_after(Stage::Parse));
    assert!(compilation.diagnostics.is_empty());
    assert!(compilation.module.is_some());
    assert!(compilation.typed.is_none());
}

#[test]
fn unreadable_root_is_an_error() {
    let result = compile(&FsLoader, &fixture("does_not_exist.rcn"), &CompileOptions::default());
    assert!(result.is_err());
}

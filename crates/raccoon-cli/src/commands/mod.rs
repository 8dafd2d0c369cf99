// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Subcommand implementations.

mod check;
mod fmt;
mod phase;

use std::process::ExitCode;

use raccoon_ast::SourceMap;
use raccoon_diagnostics::formatter::DiagnosticFormatter;
use raccoon_diagnostics::Diagnostic;

pub use check::check;
pub use fmt::fmt;
pub use phase::{lex, parse};

/// How a command finished when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    /// Diagnostics with error severity were reported.
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Ok => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::from(1),
        }
    }
}

/// Render diagnostics to stderr.
fn show_diagnostics(sources: &SourceMap, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    eprint!("{}", DiagnosticFormatter::new(sources).format_all(diagnostics));
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Raccoon compiler diagnostics.
//!
//! Every stage's error type is converted to a [`Diagnostic`] through the
//! [`ToDiagnostic`] trait, so the stages stay free of presentation concerns.
//! The terminal formatter and the JSON report both consume diagnostics and a
//! [`SourceMap`](raccoon_ast::SourceMap) to place spans in files.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;
pub mod suggestions;

use raccoon_ast::Span;
use serde::Serialize;

// ============================================================================
// Core Types
// ============================================================================

/// A compiler diagnostic with rich context for display.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The stage that produced it.
    pub kind: DiagnosticKind,
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<Help>,
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub style: LabelStyle,
    pub message: Option<String>,
}

/// How a label should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Primary error location (red underline).
    Primary,
    /// Related location (blue underline).
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// Which stage a diagnostic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Lex,
    Parse,
    Resolve,
    Type,
    Load,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiagnosticKind::Lex => "lex",
            DiagnosticKind::Parse => "parse",
            DiagnosticKind::Resolve => "resolve",
            DiagnosticKind::Type => "type",
            DiagnosticKind::Load => "load",
        };
        f.write_str(name)
    }
}

/// An error code like E0301.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

/// Actionable help attached to a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Help {
    pub message: String,
    pub suggestion: Option<CodeSuggestion>,
}

/// A concrete code change suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct CodeSuggestion {
    pub span: Span,
    pub replacement: String,
}

// ============================================================================
// Builder API
// ============================================================================

impl Diagnostic {
    fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(ErrorCode(code.into()));
        self
    }

    pub fn with_label(mut self, span: Span, style: LabelStyle, msg: impl Into<String>) -> Self {
        self.labels.push(Label { span, style, message: Some(msg.into()) });
        self
    }

    pub fn with_primary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Primary, msg)
    }

    pub fn with_secondary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Secondary, msg)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(Help { message: help.into(), suggestion: None });
        self
    }

    /// Attach a replacement to the current help message. No-op without help.
    pub fn with_suggestion(mut self, span: Span, replacement: impl Into<String>) -> Self {
        if let Some(ref mut help) = self.help {
            help.suggestion = Some(CodeSuggestion { span, replacement: replacement.into() });
        }
        self
    }

    /// Returns the primary span (first primary label, or first label).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|l| l.style == LabelStyle::Primary)
            .or(self.labels.first())
            .map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// Conversion Trait
// ============================================================================

/// Convert a compiler error into a rich diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

// ============================================================================
// Ordering
// ============================================================================

/// Order diagnostics by source position.
///
/// Spans live in one global offset space with files laid out in load order,
/// so sorting by start offset also groups by file. Diagnostics without a
/// location come first. The sort is stable: diagnostics at the same offset
/// keep the order their stages produced them in.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| d.primary_span().map(|s| (s.start, s.end)));
}

/// Number of diagnostics with error severity.
pub fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_labels_and_help() {
        let diag = Diagnostic::error(DiagnosticKind::Type, "mismatched types")
            .with_code("E0301")
            .with_secondary(Span::new(0, 3), "declared here")
            .with_primary(Span::new(10, 13), "expected int")
            .with_help("use an integer literal")
            .with_suggestion(Span::new(10, 13), "2");

        assert_eq!(diag.code, Some(ErrorCode("E0301".to_string())));
        assert_eq!(diag.primary_span(), Some(Span::new(10, 13)));
        let help = diag.help.as_ref().map(|h| h.suggestion.is_some());
        assert_eq!(help, Some(true));
        assert!(diag.is_error());
    }

    #[test]
    fn suggestion_without_help_is_ignored() {
        let diag = Diagnostic::warning(DiagnosticKind::Type, "w").with_suggestion(Span::new(0, 1), "x");
        assert!(diag.help.is_none());
        assert!(!diag.is_error());
    }

    #[test]
    fn sorting_is_by_position_and_stable() {
        let at = |start: usize, msg: &str| {
            Diagnostic::error(DiagnosticKind::Parse, msg).with_primary(Span::new(start, start + 1), "")
        };
        let mut diags = vec![at(30, "c"), at(5, "a"), at(30, "d"), at(12, "b")];
        sort_diagnostics(&mut diags);
        let order: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(order, ["a", "b", "c", "d"]);
        assert_eq!(error_count(&diags), 4);
    }
}

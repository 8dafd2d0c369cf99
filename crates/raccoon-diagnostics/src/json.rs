// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption (`raccoon check --json`).
//!
//! Each diagnostic carries its file, 1-based line/column positions and the
//! source line, so tools need not re-read the sources.

use serde::Serialize;

use raccoon_ast::{SourceMap, Span};

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle, Severity};

/// A complete JSON diagnostic report for a compilation run.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// The root file that was compiled.
    pub file: String,
    /// Whether compilation succeeded (no errors).
    pub success: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
}

/// A single diagnostic in JSON form, enriched with source context.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// "error", "warning" or "note".
    pub severity: String,
    /// "lex", "parse", "resolve", "type" or "load".
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Category from the code registry, e.g. "Type".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    /// Primary source location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<JsonSuggestion>,
}

/// A source location with line/column (1-based).
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
    /// The source line text for context.
    pub source_line: String,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    /// "primary" or "secondary".
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub file: String,
    pub start: LineCol,
    pub end: LineCol,
}

/// Line/column pair (1-based) plus the offset within the file.
#[derive(Debug, Serialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonSuggestion {
    pub start: LineCol,
    pub end: LineCol,
    pub replacement: String,
}

/// Build the report for one compilation of `file`.
pub fn to_json_report(diagnostics: &[Diagnostic], sources: &SourceMap, file: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();

    DiagnosticReport {
        file: file.to_string(),
        success: error_count == 0,
        error_count,
        warning_count,
        diagnostics: diagnostics.iter().map(|d| to_json_diagnostic(d, sources, &registry)).collect(),
    }
}

fn to_json_diagnostic(diag: &Diagnostic, sources: &SourceMap, registry: &ErrorCodeRegistry) -> JsonDiagnostic {
    let severity = match diag.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Note => "note",
    };

    let code = diag.code.as_ref().map(|c| c.0.clone());
    let category = code.as_deref().and_then(|c| registry.get(c)).map(|info| info.category.to_string());

    let location = diag.primary_span().and_then(|span| {
        let file = sources.lookup(span.start)?;
        let pos = file.position(span.start);
        Some(SourceLocation {
            file: file.name.clone(),
            line: pos.line,
            column: pos.column,
            source_line: file.line_text(pos.line).unwrap_or("").to_string(),
        })
    });

    let labels = diag
        .labels
        .iter()
        .filter_map(|l| {
            let (file, start, end) = locate(sources, l.span)?;
            Some(JsonLabel {
                role: match l.style {
                    LabelStyle::Primary => "primary".to_string(),
                    LabelStyle::Secondary => "secondary".to_string(),
                },
                message: l.message.clone(),
                file,
                start,
                end,
            })
        })
        .collect();

    let suggestion = diag.help.as_ref().and_then(|h| h.suggestion.as_ref()).and_then(|s| {
        let (_, start, end) = locate(sources, s.span)?;
        Some(JsonSuggestion { start, end, replacement: s.replacement.clone() })
    });

    JsonDiagnostic {
        severity: severity.to_string(),
        kind: diag.kind.to_string(),
        code,
        category,
        message: diag.message.clone(),
        location,
        labels,
        notes: diag.notes.clone(),
        help: diag.help.as_ref().map(|h| h.message.clone()),
        suggestion,
    }
}

/// File name and file-relative positions of a span.
fn locate(sources: &SourceMap, span: Span) -> Option<(String, LineCol, LineCol)> {
    let file = sources.lookup(span.start)?;
    let line_col = |offset: usize| {
        let pos = file.position(offset);
        LineCol { line: pos.line, column: pos.column, byte_offset: offset - file.base }
    };
    let end = span.end.clamp(span.start, file.end());
    Some((file.name.clone(), line_col(span.start), line_col(end)))
}

/// Serialize a diagnostic report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiagnosticKind;

    #[test]
    fn report_counts_and_positions() {
        let mut sources = SourceMap::new();
        sources.add_file("lib.rcn", None, "fn f() {}\n".to_string());
        let (_, base) = sources.add_file("main.rcn", None, "fn main() {\n  x;\n}\n".to_string());

        let diagnostics = vec![
            Diagnostic::error(DiagnosticKind::Resolve, "cannot find value `x` in this scope")
                .with_code("E0200")
                .with_primary(Span::new(base + 14, base + 15), "not found in this scope"),
            Diagnostic::warning(DiagnosticKind::Type, "unreachable pattern").with_code("W0301"),
        ];

        let report = to_json_report(&diagnostics, &sources, "main.rcn");
        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);

        let first = &report.diagnostics[0];
        assert_eq!(first.kind, "resolve");
        assert_eq!(first.category.as_deref(), Some("Resolution"));
        let location = first.location.as_ref().map(|l| (l.file.as_str(), l.line, l.column));
        assert_eq!(location, Some(("main.rcn", 2, 3)));
        assert_eq!(first.labels[0].start.byte_offset, 14);

        let json = to_json_string(&report).unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(value["error_count"], 1);
        assert_eq!(value["diagnostics"][0]["code"], "E0200");
        assert!(value["diagnostics"][1].get("location").is_none());
    }
}

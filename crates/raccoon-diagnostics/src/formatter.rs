// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rich terminal formatter for diagnostics.
//!
//! ```text
//! error[E0301]: mismatched types: expected int, found float
//!  --> main.rcn:3:18
//!   |
//! 3 |     let x: int = 2.0;
//!   |                  ^^^ expected int
//!   |
//!   = help: ...
//! ```
//!
//! Colors come from `colored`, which honours `NO_COLOR`/`FORCE_COLOR`; the
//! CLI overrides it for `--color`.

use std::collections::BTreeMap;

use colored::Colorize;

use raccoon_ast::{FileId, SourceFile, SourceMap, Span};

use crate::{Diagnostic, Help, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

/// A source line with its labels.
struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    /// 1-based character columns, end exclusive.
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    /// Render every diagnostic followed by a blank line.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics.iter().map(|d| self.format(d) + "\n").collect()
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let Some(primary) = diagnostic.primary_span() else {
            self.format_footer(&mut out, diagnostic, 1);
            return out;
        };
        let Some(file) = self.sources.lookup(primary.start) else {
            self.format_footer(&mut out, diagnostic, 1);
            return out;
        };

        // Labels in other files are listed as notes below the snippet.
        let (local, remote): (Vec<_>, Vec<_>) =
            diagnostic.labels.iter().partition(|l| self.file_of(l.span) == Some(file.id));

        let annotated = collect_annotated_lines(file, local.iter().map(|l| (l.span, l.style, l.message.clone())));
        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter_width = max_line.to_string().len();
        let pad = " ".repeat(gutter_width);

        let position = file.position(primary.start);
        out.push_str(&format!("{}{} {}:{}:{}\n", pad, "-->".blue(), file.name, position.line, position.column));
        out.push_str(&format!("{} {}\n", pad, "|".blue()));

        let mut prev_line_num: Option<usize> = None;
        for line in &annotated {
            if let Some(prev) = prev_line_num {
                if line.line_num > prev + 1 {
                    out.push_str(&format!("{}\n", "...".blue()));
                }
            }
            out.push_str(&format!(
                "{} {} {}\n",
                format!("{:>width$}", line.line_num, width = gutter_width).blue().bold(),
                "|".blue(),
                line.text
            ));
            format_annotations(&mut out, line, gutter_width);
            prev_line_num = Some(line.line_num);
        }

        for label in remote {
            if let (Some(message), Some(other)) = (&label.message, self.sources.lookup(label.span.start)) {
                let pos = other.position(label.span.start);
                out.push_str(&format!(
                    "{} {} {}: {} ({}:{}:{})\n",
                    pad,
                    "=".cyan(),
                    "note".cyan().bold(),
                    message,
                    other.name,
                    pos.line,
                    pos.column
                ));
            }
        }

        self.format_footer(&mut out, diagnostic, gutter_width);
        out
    }

    fn file_of(&self, span: Span) -> Option<FileId> {
        self.sources.lookup(span.start).map(|f| f.id)
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };

        match &diagnostic.code {
            Some(code) => out.push_str(&format!("{}{}: {}\n", severity, format!("[{}]", code.0).bold(), diagnostic.message.bold())),
            None => out.push_str(&format!("{}: {}\n", severity, diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic, gutter_width: usize) {
        if diagnostic.notes.is_empty() && diagnostic.help.is_none() {
            return;
        }
        let pad = " ".repeat(gutter_width);
        if !diagnostic.labels.is_empty() {
            out.push_str(&format!("{} {}\n", pad, "|".blue()));
        }
        for note in &diagnostic.notes {
            out.push_str(&format!("{} {} {}: {}\n", pad, "=".cyan(), "note".cyan().bold(), note));
        }
        if let Some(help) = &diagnostic.help {
            self.format_help(out, help, gutter_width);
        }
    }

    fn format_help(&self, out: &mut String, help: &Help, gutter_width: usize) {
        let pad = " ".repeat(gutter_width);
        out.push_str(&format!("{} {} {}: {}\n", pad, "=".cyan(), "help".cyan().bold(), help.message));

        let Some(suggestion) = &help.suggestion else {
            return;
        };
        let Some(file) = self.sources.lookup(suggestion.span.start) else {
            return;
        };
        let start = file.position(suggestion.span.start);
        let Some(line) = file.line_text(start.line) else {
            return;
        };

        let prefix: String = line.chars().take(start.column as usize - 1).collect();
        let replaced = file.position(suggestion.span.end.max(suggestion.span.start)).column as usize
            - start.column as usize;
        let suffix: String = line.chars().skip(start.column as usize - 1 + replaced).collect();

        out.push_str(&format!(
            "{} {} {}{}{}\n",
            format!("{:>width$}", start.line, width = gutter_width).blue().bold(),
            "|".blue(),
            prefix,
            suggestion.replacement.green(),
            suffix,
        ));
        out.push_str(&format!(
            "{} {} {}{}\n",
            pad,
            "|".blue(),
            " ".repeat(prefix.chars().count()),
            "~".repeat(suggestion.replacement.chars().count().max(1)).green(),
        ));
    }
}

fn collect_annotated_lines(
    file: &SourceFile,
    labels: impl Iterator<Item = (Span, LabelStyle, Option<String>)>,
) -> Vec<AnnotatedLine> {
    let mut lines: BTreeMap<usize, AnnotatedLine> = BTreeMap::new();

    for (span, style, message) in labels {
        let start = file.position(span.start);
        let end = file.position(span.end.max(span.start));
        let line_num = start.line as usize;
        let text = file.line_text(start.line).unwrap_or("").to_string();

        // Multi-line spans are underlined to the end of their first line.
        let col_end = if end.line == start.line {
            end.column as usize
        } else {
            text.chars().count() + 1
        };

        lines
            .entry(line_num)
            .or_insert_with(|| AnnotatedLine { line_num, text, annotations: Vec::new() })
            .annotations
            .push(Annotation {
                col_start: start.column as usize,
                col_end: col_end.max(start.column as usize + 1),
                style,
                message,
            });
    }

    lines.into_values().collect()
}

fn format_annotations(out: &mut String, line: &AnnotatedLine, gutter_width: usize) {
    let pad = " ".repeat(gutter_width);

    let mut sorted: Vec<&Annotation> = line.annotations.iter().collect();
    sorted.sort_by_key(|a| (a.style.priority(), a.col_start));

    let width = sorted.iter().map(|a| a.col_end).max().unwrap_or(1);
    let mut underline = vec![' '; width];
    let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();

    for ann in &sorted {
        let ch = match ann.style {
            LabelStyle::Primary => '^',
            LabelStyle::Secondary => '-',
        };
        for slot in &mut underline[ann.col_start - 1..ann.col_end - 1] {
            // Primary underlines win where labels overlap.
            if *slot == ' ' {
                *slot = ch;
            }
        }
        if let Some(msg) = ann.message.as_deref().filter(|m| !m.is_empty()) {
            messages.push((ann.col_start, ann.style, msg));
        }
    }

    let underline: String = underline.iter().collect::<String>().trim_end().to_string();
    let colored_underline = color_underline(&underline);

    if messages.len() <= 1 {
        match messages.first() {
            Some((_, style, msg)) => {
                out.push_str(&format!("{} {} {} {}\n", pad, "|".blue(), colored_underline, style_message(*style, msg)))
            }
            None => out.push_str(&format!("{} {} {}\n", pad, "|".blue(), colored_underline)),
        }
        return;
    }

    // Several labels: underline first, then one message per line, rightmost first.
    out.push_str(&format!("{} {} {}\n", pad, "|".blue(), colored_underline));
    messages.sort_by_key(|(col, _, _)| std::cmp::Reverse(*col));
    for (col, style, msg) in messages {
        out.push_str(&format!(
            "{} {} {}{} {}\n",
            pad,
            "|".blue(),
            " ".repeat(col - 1),
            style_message(style, "|"),
            style_message(style, msg),
        ));
    }
}

impl LabelStyle {
    fn priority(&self) -> u8 {
        match self {
            LabelStyle::Primary => 0,
            LabelStyle::Secondary => 1,
        }
    }
}

fn style_message(style: LabelStyle, msg: &str) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

/// Color the underline characters (^ in red, - in blue).
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut current = None;
    let mut run = String::new();

    for ch in s.chars() {
        let kind = matches!(ch, '^' | '-').then_some(ch);
        if kind != current && !run.is_empty() {
            result.push_str(&flush_run(&run, current));
            run.clear();
        }
        run.push(ch);
        current = kind;
    }
    if !run.is_empty() {
        result.push_str(&flush_run(&run, current));
    }
    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.red().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}

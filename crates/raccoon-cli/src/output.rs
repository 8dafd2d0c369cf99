// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI output formatting with colors and styling.
//!
//! Respects NO_COLOR and FORCE_COLOR unless `--color` says otherwise.

use clap::ValueEnum;
use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Color when the environment allows it.
    #[default]
    Auto,
    Always,
    Never,
}

/// Initialize color support. Call once at startup.
pub fn init(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {
            if std::env::var_os("NO_COLOR").is_some() {
                colored::control::set_override(false);
            } else if std::env::var_os("FORCE_COLOR").is_some() {
                colored::control::set_override(true);
            }
        }
    }
}

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn file_path(path: &str) -> ColoredString {
    path.underline()
}

pub fn banner_ok(phase: &str) -> String {
    format!("{} {} {}", "===".dimmed(), format!("{} OK", phase).green().bold(), "===".dimmed())
}

pub fn banner_fail(phase: &str, errors: usize, warnings: usize) -> String {
    let mut msg = format!("{} FAILED: {}", phase, plural(errors, "error"));
    if warnings > 0 {
        msg.push_str(&format!(", {}", plural(warnings, "warning")));
    }
    format!("{} {} {}", "===".dimmed(), msg.red().bold(), "===".dimmed())
}

pub fn warning_summary(warnings: usize) -> ColoredString {
    plural(warnings, "warning").yellow()
}

pub fn truncated(count: usize) -> ColoredString {
    format!("{} more {} not shown", count, if count == 1 { "error" } else { "errors" }).dimmed()
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

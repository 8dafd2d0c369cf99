// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `raccoon check`: run every stage and report diagnostics.

use std::path::Path;

use anyhow::{Context, Result};
use raccoon_compiler::{compile, CompileOptions, FsLoader};
use raccoon_diagnostics::json::{to_json_report, to_json_string};

use super::{show_diagnostics, Outcome};
use crate::output;

pub fn check(path: &Path, json: bool, deny_warnings: bool, max_errors: usize) -> Result<Outcome> {
    let options = CompileOptions::default().with_deny_warnings(deny_warnings).with_max_errors(max_errors);
    let compilation = compile(&FsLoader, path, &options)?;
    let outcome = if compilation.success() { Outcome::Ok } else { Outcome::Failed };

    if json {
        let report = to_json_report(&compilation.diagnostics, &compilation.sources, &path.display().to_string());
        let text = to_json_string(&report).context("serializing diagnostics")?;
        println!("{}", text);
        return Ok(outcome);
    }

    show_diagnostics(&compilation.sources, &compilation.diagnostics);
    if compilation.truncated > 0 {
        eprintln!("{}", output::truncated(compilation.truncated));
    }

    let path = path.display().to_string();
    match outcome {
        Outcome::Ok if compilation.warning_count() > 0 => println!(
            "{} {} ({})",
            output::banner_ok("check"),
            output::file_path(&path),
            output::warning_summary(compilation.warning_count())
        ),
        Outcome::Ok => println!("{} {}", output::banner_ok("check"), output::file_path(&path)),
        Outcome::Failed => eprintln!(
            "{}",
            output::banner_fail("check", compilation.error_count(), compilation.warning_count())
        ),
    }
    Ok(outcome)
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The `raccoon` command: lex, parse, check and format raccoon sources.

mod commands;
mod logger;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use output::ColorChoice;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Front-end tools for the raccoon language
#[derive(Parser, Debug)]
#[command(name = "raccoon")]
#[command(version = VERSION)]
#[command(about = "Front-end tools for the raccoon language", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the tokens of a source file
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse a program and print it back
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the syntax tree instead of source
        #[arg(long)]
        tree: bool,
    },

    /// Check a program for errors
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print diagnostics as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Treat warnings as errors
        #[arg(long)]
        deny_warnings: bool,

        /// Stop after this many errors (0 for no limit)
        #[arg(long, value_name = "N", default_value_t = 0)]
        max_errors: usize,
    },

    /// Format a source file
    Fmt {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Exit with status 1 if the file is not formatted, printing nothing
        #[arg(long)]
        check: bool,

        /// Spaces per indentation level
        #[arg(long, value_name = "N", default_value_t = 4)]
        indent: usize,
    },

    /// Print version information
    Version,
}

fn main() -> ExitCode {
    let args = Args::parse();
    output::init(args.color);
    logger::init(args.verbose);
    tracing::debug!(command = ?args.command, "starting");

    let result = match args.command {
        Commands::Lex { file } => commands::lex(&file),
        Commands::Parse { file, tree } => commands::parse(&file, tree),
        Commands::Check { file, json, deny_warnings, max_errors } => {
            commands::check(&file, json, deny_warnings, max_errors)
        }
        Commands::Fmt { file, check, indent } => commands::fmt(&file, check, indent),
        Commands::Version => {
            println!("raccoon {}", VERSION);
            Ok(commands::Outcome::Ok)
        }
    };

    match result {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("{}: {:#}", output::error_label(), err);
            ExitCode::from(2)
        }
    }
}

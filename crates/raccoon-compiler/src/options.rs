// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compilation options.

use std::fmt;

/// The last stage a compilation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Stage {
    /// Tokenize the root file only.
    Lex,
    /// Load and parse the whole module tree.
    Parse,
    /// Resolve names and type check.
    #[default]
    Check,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lex => write!(f, "lex"),
            Stage::Parse => write!(f, "parse"),
            Stage::Check => write!(f, "check"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Stop reporting errors after this many; 0 means no limit.
    pub max_errors: usize,
    /// Report warnings as errors.
    pub deny_warnings: bool,
    pub stop_after: Stage,
}

impl CompileOptions {
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub fn with_deny_warnings(mut self, deny: bool) -> Self {
        self.deny_warnings = deny;
        self
    }

    pub fn stop_after(mut self, stage: Stage) -> Self {
        self.stop_after = stage;
        self
    }
}

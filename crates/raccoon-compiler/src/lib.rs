// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compiler driver for raccoon.
//!
//! Loads a module tree from disk (or memory), runs it through the lexer,
//! parser, resolver and type checker, and returns the sorted diagnostics.

pub mod loader;
pub mod options;
pub mod pipeline;

pub use loader::{FsLoader, LoadError, LoadedTree, MemoryLoader, ModuleLoader, SourceLoader, EXTENSION};
pub use options::{CompileOptions, Stage};
pub use pipeline::{compile, compile_source, Compilation};

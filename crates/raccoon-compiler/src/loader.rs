// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source loading: reading files and expanding `mod name;` declarations.
//!
//! `mod name;` in `dir/file.rcn` loads `dir/name.rcn`, falling back to
//! `dir/name/mod.rcn`. Inline modules add their name to the directory, so
//! `mod a { mod b; }` looks for `dir/a/b.rcn`. Every file goes into one
//! [`SourceMap`] and is lexed with its base offset, so spans from different
//! files never overlap. Node ids continue from file to file.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use raccoon_ast::decl::{Item, ItemKind, ModBody};
use raccoon_ast::{Module, SourceMap, Span};
use raccoon_diagnostics::{Diagnostic, DiagnosticKind, ToDiagnostic};
use raccoon_lexer::{LexError, Lexer};
use raccoon_parser::{ParseError, Parser};
use thiserror::Error;

/// Source file extension.
pub const EXTENSION: &str = "rcn";

/// Where source text comes from.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> io::Result<String>;

    fn exists(&self, path: &Path) -> bool;
}

/// Reads sources from the file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Sources held in memory, keyed by path. Used by tests and tools.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        self.add(path, source);
        self
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path.display())))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// A failure to bring a source file into the compilation.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
        /// The `mod` item that asked for the file; None for the root file.
        span: Option<Span>,
    },

    #[error("file not found for module `{name}`")]
    ModuleNotFound { name: String, tried: Vec<PathBuf>, span: Span },

    #[error("module file `{}` is already part of the module tree", path.display())]
    ModuleCycle { path: PathBuf, span: Span },
}

impl LoadError {
    pub fn span(&self) -> Option<Span> {
        match self {
            LoadError::Io { span, .. } => *span,
            LoadError::ModuleNotFound { span, .. } | LoadError::ModuleCycle { span, .. } => Some(*span),
        }
    }
}

impl ToDiagnostic for LoadError {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            LoadError::Io { span, .. } => {
                let diag = Diagnostic::error(DiagnosticKind::Load, self.to_string()).with_code("E0402");
                match span {
                    Some(span) => diag.with_primary(*span, "declared here"),
                    None => diag,
                }
            }
            LoadError::ModuleNotFound { name, tried, span } => {
                let tried: Vec<String> = tried.iter().map(|p| p.display().to_string()).collect();
                Diagnostic::error(DiagnosticKind::Load, self.to_string())
                    .with_code("E0401")
                    .with_primary(*span, "module declared here")
                    .with_note(format!("looked for {}", tried.join(" and ")))
                    .with_help(format!("create `{}.{}` or declare the module inline", name, EXTENSION))
            }
            // Loading a file twice is reported as an import cycle.
            LoadError::ModuleCycle { span, .. } => Diagnostic::error(DiagnosticKind::Resolve, self.to_string())
                .with_code("E0208")
                .with_primary(*span, "this declaration loads the file again"),
        }
    }
}

/// Everything produced by loading a module tree.
#[derive(Debug, Default)]
pub struct LoadedTree {
    pub sources: SourceMap,
    pub module: Module,
    pub lex_errors: Vec<LexError>,
    pub parse_errors: Vec<ParseError>,
    pub load_errors: Vec<LoadError>,
}

impl LoadedTree {
    pub fn has_syntax_errors(&self) -> bool {
        !self.lex_errors.is_empty() || !self.parse_errors.is_empty()
    }
}

/// Loads a root file and, recursively, every file its `mod` items name.
pub struct ModuleLoader<'l, L: SourceLoader> {
    loader: &'l L,
    tree: LoadedTree,
    next_node_id: u32,
}

impl<'l, L: SourceLoader> ModuleLoader<'l, L> {
    pub fn new(loader: &'l L) -> Self {
        Self { loader, tree: LoadedTree::default(), next_node_id: 0 }
    }

    /// Load the tree rooted at `root`. Only a failure to read the root file
    /// itself is returned as an error; everything else is collected.
    pub fn load(mut self, root: &Path) -> Result<LoadedTree, LoadError> {
        let source = self
            .loader
            .load(root)
            .map_err(|source| LoadError::Io { path: root.to_path_buf(), source, span: None })?;
        self.tree.module = self.parse_file(root, source);
        let dir = parent_dir(root);
        let mut items = std::mem::take(&mut self.tree.module.items);
        self.expand(&mut items, &dir);
        self.tree.module.items = items;

        tracing::debug!(
            files = self.tree.sources.files().len(),
            lex_errors = self.tree.lex_errors.len(),
            parse_errors = self.tree.parse_errors.len(),
            load_errors = self.tree.load_errors.len(),
            "loaded module tree"
        );
        Ok(self.tree)
    }

    fn parse_file(&mut self, path: &Path, source: String) -> Module {
        tracing::trace!(path = %path.display(), "loading source file");
        let (_, base) = self.tree.sources.add_file(path.display().to_string(), Some(path.to_path_buf()), source);
        let source = self.tree.sources.files().last().map(|f| f.source.as_str()).unwrap_or("");

        let lexed = Lexer::with_base(source, base).tokenize();
        let mut parser = Parser::new(lexed.tokens).with_first_node_id(self.next_node_id);
        let parsed = parser.parse();

        self.next_node_id = parsed.next_node_id;
        self.tree.lex_errors.extend(lexed.errors);
        self.tree.parse_errors.extend(parsed.errors);
        parsed.module
    }

    /// Replace every `mod name;` under `items` with the items of its file.
    fn expand(&mut self, items: &mut [Item], dir: &Path) {
        for item in items.iter_mut() {
            let ItemKind::Mod(decl) = &mut item.kind else {
                continue;
            };
            let name = decl.name.name.clone();
            match &mut decl.body {
                ModBody::Inline(children) => self.expand(children, &dir.join(&name)),
                ModBody::Loaded { .. } => {}
                ModBody::External => {
                    if let Some(body) = self.load_module_file(&name, dir, decl.name.span) {
                        decl.body = body;
                    }
                }
            }
        }
    }

    fn load_module_file(&mut self, name: &str, dir: &Path, span: Span) -> Option<ModBody> {
        let candidates = [
            dir.join(format!("{}.{}", name, EXTENSION)),
            dir.join(name).join(format!("mod.{}", EXTENSION)),
        ];
        let Some(path) = candidates.iter().find(|p| self.loader.exists(p)).cloned() else {
            self.tree.load_errors.push(LoadError::ModuleNotFound { name: name.to_string(), tried: candidates.to_vec(), span });
            return None;
        };

        if self.tree.sources.contains_path(&path) {
            self.tree.load_errors.push(LoadError::ModuleCycle { path, span });
            return None;
        }

        let source = match self.loader.load(&path) {
            Ok(source) => source,
            Err(source) => {
                self.tree.load_errors.push(LoadError::Io { path, source, span: Some(span) });
                return None;
            }
        };

        let mut module = self.parse_file(&path, source);
        let file = self.tree.sources.files().last().map(|f| f.id)?;
        self.expand(&mut module.items, &parent_dir(&path));
        Some(ModBody::Loaded { items: module.items, file })
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

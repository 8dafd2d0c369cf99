// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Path walking and the import linking pass.
//!
//! Imports are linked lazily: looking a name up may resolve the import that
//! binds it, which may walk further paths. An import met again while it is
//! still being resolved closes a cycle.

use std::collections::HashSet;

use raccoon_ast::{Ident, Span};

use crate::error::ResolveError;
use crate::module::{DefId, DefKind, GlobState, ImportId, ImportState, ModuleId, NameBinding, Namespace};
use crate::resolver::Resolver;
use crate::{Builtin, Primitive};

/// Where the first segment of a path is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Start {
    /// `use` paths: the crate root.
    Root,
    /// Expression and type paths: the module chain outwards.
    Lexical,
}

/// What a path resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Module(ModuleId),
    Def(DefId),
}

/// How a failed path was being used; decides the error reported.
#[derive(Debug, Clone)]
pub(crate) enum PathUse {
    Import { path: String, span: Span },
    Value,
    Type,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum LookupScope {
    Lexical,
    Module(ModuleId),
    Enum(DefId),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum WalkErrorKind {
    Undefined(LookupScope),
    NotVisible(Span),
    NotAModule,
    TooManySupers,
    /// Already reported, e.g. by a failed or cyclic import.
    Reported,
}

/// A failed walk: `index` is the offending segment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WalkError {
    pub index: usize,
    pub kind: WalkErrorKind,
}

impl Resolver {
    /// Link every import and glob, reporting each failure once.
    pub(crate) fn link_imports(&mut self) {
        for index in 0..self.tree.imports.len() {
            self.resolve_import(ImportId(index as u32));
        }
        for index in 0..self.tree.globs.len() {
            self.link_glob(index);
        }
        tracing::trace!(
            imports = self.tree.imports.len(),
            globs = self.tree.globs.len(),
            "linked imports"
        );
    }

    pub(crate) fn resolve_import(&mut self, id: ImportId) -> Option<DefId> {
        let idx = id.0 as usize;
        match self.tree.imports[idx].state {
            ImportState::Resolved(def) => return Some(def),
            ImportState::Failed => return None,
            ImportState::InProgress => {
                self.report_cycle(id);
                return None;
            }
            ImportState::Unresolved => {}
        }

        self.tree.imports[idx].state = ImportState::InProgress;
        self.import_stack.push(id);
        let (module, path, span) = {
            let import = &self.tree.imports[idx];
            (import.module, import.path.clone(), import.span)
        };
        tracing::trace!(path = %self.tree.imports[idx].path_string(), "resolving import");

        let result = self.walk(module, &path, Start::Root);
        self.import_stack.pop();

        // A cycle through this import already marked it failed.
        if self.tree.imports[idx].state == ImportState::Failed {
            return None;
        }

        let path_string = self.tree.imports[idx].path_string();
        let resolved = match result {
            Ok(Target::Def(def)) => Some(def),
            Ok(Target::Module(m)) => {
                let def = self.tree.module(m).def;
                if def.is_none() {
                    self.errors.push(ResolveError::unresolved_import(path_string, span));
                }
                def
            }
            Err(err) => {
                self.report_walk_error(err, &path, PathUse::Import { path: path_string, span });
                None
            }
        };

        self.tree.imports[idx].state = match resolved {
            Some(def) => ImportState::Resolved(def),
            None => ImportState::Failed,
        };
        resolved
    }

    fn report_cycle(&mut self, id: ImportId) {
        let start = self.import_stack.iter().position(|i| *i == id).unwrap_or(0);
        let members: Vec<ImportId> = self.import_stack[start..].to_vec();
        let mut chain: Vec<String> = members.iter().map(|i| self.tree.import(*i).path_string()).collect();
        chain.push(self.tree.import(id).path_string());
        for member in members {
            self.tree.imports[member.0 as usize].state = ImportState::Failed;
        }
        let span = self.tree.import(id).span;
        self.errors.push(ResolveError::import_cycle(chain, span));
    }

    pub(crate) fn link_glob(&mut self, index: usize) -> Option<Namespace> {
        match self.tree.globs[index].state {
            GlobState::Linked(ns) => return Some(ns),
            GlobState::Linking | GlobState::Failed => return None,
            GlobState::Unlinked => {}
        }

        self.tree.globs[index].state = GlobState::Linking;
        let (module, path, span) = {
            let glob = &self.tree.globs[index];
            (glob.module, glob.path.clone(), glob.span)
        };

        let state = match self.walk(module, &path, Start::Root) {
            Ok(target) => match self.namespace(target) {
                Some(ns) => GlobState::Linked(ns),
                None => {
                    if let Some(last) = path.last() {
                        self.errors.push(ResolveError::not_a_module(last.name.clone(), last.span));
                    }
                    GlobState::Failed
                }
            },
            Err(err) => {
                let path_string = join(&path);
                self.report_walk_error(err, &path, PathUse::Import { path: path_string, span });
                GlobState::Failed
            }
        };
        self.tree.globs[index].state = state;
        match state {
            GlobState::Linked(ns) => Some(ns),
            _ => None,
        }
    }

    fn namespace(&self, target: Target) -> Option<Namespace> {
        match target {
            Target::Module(m) => Some(Namespace::Module(m)),
            Target::Def(def) => self.tree.namespace_of(def),
        }
    }

    /// Walk `segments` as seen from module `from`.
    pub(crate) fn walk(&mut self, from: ModuleId, segments: &[Ident], start: Start) -> Result<Target, WalkError> {
        let mut target: Option<Target> = None;

        for (index, seg) in segments.iter().enumerate() {
            let err = |kind| WalkError { index, kind };
            let next = match (target, seg.name.as_str()) {
                (None, "crate") => Target::Module(ModuleId::ROOT),
                (None, "self") => Target::Module(self.tree.named_module(from)),
                (None, "super") => match self.tree.module(self.tree.named_module(from)).parent {
                    Some(parent) => Target::Module(parent),
                    None => return Err(err(WalkErrorKind::TooManySupers)),
                },
                (Some(Target::Module(m)), "super") => match self.tree.module(m).parent {
                    Some(parent) => Target::Module(parent),
                    None => return Err(err(WalkErrorKind::TooManySupers)),
                },
                (Some(current), "self") => current,
                (None, name) => {
                    let found = match start {
                        Start::Root => self.lookup_in_module(ModuleId::ROOT, name, from, &mut HashSet::new()),
                        Start::Lexical => self.lookup_lexical(from, name),
                    };
                    match found {
                        Ok(Some(def)) => Target::Def(def),
                        Ok(None) => {
                            let scope = match start {
                                Start::Root => LookupScope::Module(ModuleId::ROOT),
                                Start::Lexical => LookupScope::Lexical,
                            };
                            return Err(err(WalkErrorKind::Undefined(scope)));
                        }
                        Err(kind) => return Err(err(kind)),
                    }
                }
                (Some(current), name) => match self.namespace(current) {
                    Some(Namespace::Module(m)) => match self.lookup_in_module(m, name, from, &mut HashSet::new()) {
                        Ok(Some(def)) => Target::Def(def),
                        Ok(None) => return Err(err(WalkErrorKind::Undefined(LookupScope::Module(m)))),
                        Err(kind) => return Err(err(kind)),
                    },
                    Some(Namespace::Enum(e)) => match self.tree.variant_named(e, name) {
                        Some(variant) => Target::Def(variant),
                        None => return Err(err(WalkErrorKind::Undefined(LookupScope::Enum(e)))),
                    },
                    None => {
                        return Err(WalkError { index: index - 1, kind: WalkErrorKind::NotAModule });
                    }
                },
            };
            target = Some(next);
        }

        target.ok_or(WalkError { index: 0, kind: WalkErrorKind::Undefined(LookupScope::Lexical) })
    }

    /// Look `name` up in the module chain starting at `from`.
    pub(crate) fn lookup_lexical(&mut self, from: ModuleId, name: &str) -> Result<Option<DefId>, WalkErrorKind> {
        let mut current = Some(from);
        while let Some(m) = current {
            if let Some(def) = self.lookup_in_module(m, name, from, &mut HashSet::new())? {
                return Ok(Some(def));
            }
            current = self.tree.module(m).parent;
        }
        Ok(None)
    }

    /// Look `name` up in the namespace of `module`, then in its globs.
    fn lookup_in_module(
        &mut self,
        module: ModuleId,
        name: &str,
        from: ModuleId,
        visited: &mut HashSet<ModuleId>,
    ) -> Result<Option<DefId>, WalkErrorKind> {
        if !visited.insert(module) {
            return Ok(None);
        }

        if let Some(binding) = self.tree.module(module).names.get(name).copied() {
            return match binding {
                NameBinding::Def(def) => {
                    if self.tree.is_visible(def, from) {
                        Ok(Some(def))
                    } else {
                        Err(WalkErrorKind::NotVisible(self.tree.def(def).span))
                    }
                }
                NameBinding::Import(id) => {
                    let import = self.tree.import(id);
                    if !import.is_pub && !self.tree.is_descendant(from, import.module) {
                        return Err(WalkErrorKind::NotVisible(import.span));
                    }
                    self.resolve_import(id).map(Some).ok_or(WalkErrorKind::Reported)
                }
            };
        }

        let globs = self.tree.module(module).globs.clone();
        for index in globs {
            let (importer, is_pub) = {
                let glob = &self.tree.globs[index];
                (glob.module, glob.is_pub)
            };
            if !is_pub && !self.tree.is_descendant(from, importer) {
                continue;
            }
            match self.link_glob(index) {
                Some(Namespace::Enum(e)) => {
                    if let Some(variant) = self.tree.variant_named(e, name) {
                        return Ok(Some(variant));
                    }
                }
                Some(Namespace::Module(target)) => match self.lookup_in_module(target, name, importer, visited) {
                    Ok(Some(def)) => return Ok(Some(def)),
                    // Globs skip what the importer cannot see.
                    Ok(None) | Err(WalkErrorKind::NotVisible(_)) => {}
                    Err(kind) => return Err(kind),
                },
                None => {}
            }
        }
        Ok(None)
    }

    pub(crate) fn report_walk_error(&mut self, err: WalkError, path: &[Ident], usage: PathUse) {
        let Some(seg) = path.get(err.index).or_else(|| path.last()) else {
            return;
        };
        let name = seg.name.clone();
        let span = seg.span;
        let error = match err.kind {
            WalkErrorKind::Reported => return,
            WalkErrorKind::TooManySupers => ResolveError::too_many_supers(span),
            WalkErrorKind::NotVisible(defined_at) => ResolveError::not_visible(name, span, defined_at),
            WalkErrorKind::NotAModule => ResolveError::not_a_module(name, span),
            WalkErrorKind::Undefined(LookupScope::Enum(e)) => {
                let candidates = self.tree.variants(e).iter().map(|v| self.tree.def(*v).name.clone()).collect();
                ResolveError::undefined_variant(self.tree.def(e).name.clone(), name, candidates, span)
            }
            WalkErrorKind::Undefined(scope) => match usage {
                PathUse::Import { path, span } => ResolveError::unresolved_import(path, span),
                PathUse::Type => {
                    let candidates = self.candidates(scope, false);
                    ResolveError::undefined_type(name, candidates, span)
                }
                PathUse::Value => {
                    let candidates = self.candidates(scope, true);
                    ResolveError::undefined(name, candidates, span)
                }
            },
        };
        self.errors.push(error);
    }

    /// Names a misspelled path segment might have meant.
    fn candidates(&self, scope: LookupScope, values: bool) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let type_like = |tree: &crate::module::ModuleTree, binding: NameBinding| match binding {
            NameBinding::Def(def) => matches!(tree.def(def).kind, DefKind::Struct | DefKind::Enum { .. } | DefKind::Mod(_)),
            NameBinding::Import(_) => true,
        };
        let add_module = |names: &mut Vec<String>, m: ModuleId| {
            for (name, binding) in &self.tree.module(m).names {
                if values || type_like(&self.tree, *binding) {
                    names.push(name.clone());
                }
            }
        };

        match scope {
            LookupScope::Module(m) => add_module(&mut names, m),
            LookupScope::Enum(e) => {
                names.extend(self.tree.variants(e).iter().map(|v| self.tree.def(*v).name.clone()));
            }
            LookupScope::Lexical => {
                let mut current = self.scopes.module();
                while let Some(m) = current {
                    add_module(&mut names, m);
                    current = self.tree.module(m).parent;
                }
                if values {
                    names.extend(self.scopes.visible_names());
                    names.extend(Builtin::ALL.iter().map(|b| b.name().to_string()));
                } else {
                    names.extend(Primitive::ALL.iter().map(|p| p.name().to_string()));
                }
            }
        }

        names.sort();
        names.dedup();
        names
    }
}

pub(crate) fn join(path: &[Ident]) -> String {
    path.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join("::")
}

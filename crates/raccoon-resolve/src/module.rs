// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The module tree: one namespace of items per module, plus the imports
//! waiting to be linked.

use std::collections::HashMap;

use raccoon_ast::{Ident, NodeId, Span};

/// Unique identifier for a module. The crate root is `ModuleId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub const ROOT: ModuleId = ModuleId(0);
}

/// Unique identifier for a module-level definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefKind {
    Mod(ModuleId),
    Fn,
    Struct,
    Enum { variants: Vec<DefId> },
    Const,
    /// Variant `index` of enum `parent`.
    Variant { parent: DefId, index: usize },
}

impl DefKind {
    pub fn describe(&self) -> &'static str {
        match self {
            DefKind::Mod(_) => "module",
            DefKind::Fn => "function",
            DefKind::Struct => "struct",
            DefKind::Enum { .. } => "enum",
            DefKind::Const => "constant",
            DefKind::Variant { .. } => "variant",
        }
    }
}

/// A module-level definition.
#[derive(Debug, Clone)]
pub struct Def {
    pub id: DefId,
    pub name: String,
    pub kind: DefKind,
    /// The module that declares it. Variants belong to their enum's module.
    pub module: ModuleId,
    pub is_pub: bool,
    /// Span of the declared name.
    pub span: Span,
    /// The declaring item.
    pub node: NodeId,
    /// Path from the crate root, e.g. `geo::Point` or `Shape::Circle`.
    pub qualified: String,
}

/// What a name in a module namespace refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameBinding {
    Def(DefId),
    Import(ImportId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImportId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Unresolved,
    /// On the resolution stack; reaching it again means a cycle.
    InProgress,
    Resolved(DefId),
    /// Resolution failed and was already reported.
    Failed,
}

/// A single `use` binding, after nested groups are flattened.
#[derive(Debug, Clone)]
pub struct Import {
    pub id: ImportId,
    /// The module containing the `use`.
    pub module: ModuleId,
    pub path: Vec<Ident>,
    /// The name it binds.
    pub name: String,
    pub is_pub: bool,
    /// Span of the bound name: the alias, or the last path segment.
    pub span: Span,
    pub state: ImportState,
}

impl Import {
    pub fn path_string(&self) -> String {
        self.path.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join("::")
    }
}

/// A `use path::*`.
#[derive(Debug, Clone)]
pub struct GlobImport {
    pub module: ModuleId,
    pub path: Vec<Ident>,
    pub is_pub: bool,
    pub span: Span,
    pub state: GlobState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobState {
    Unlinked,
    Linking,
    Linked(Namespace),
    Failed,
}

/// Something a path can step into: a module, or an enum's variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Module(ModuleId),
    Enum(DefId),
}

#[derive(Debug, Clone)]
pub struct ModuleData {
    pub id: ModuleId,
    pub name: String,
    pub parent: Option<ModuleId>,
    /// The `mod` definition; None for the crate root.
    pub def: Option<DefId>,
    pub names: HashMap<String, NameBinding>,
    /// Indices into the tree's glob imports.
    pub globs: Vec<usize>,
    /// Path from the crate root; empty for the root.
    pub path: String,
    /// Holds the items of a block. It has no name and shares its parent's path.
    pub anonymous: bool,
}

/// All modules and definitions of a crate.
#[derive(Debug, Default)]
pub struct ModuleTree {
    pub(crate) modules: Vec<ModuleData>,
    pub(crate) defs: Vec<Def>,
    pub(crate) imports: Vec<Import>,
    pub(crate) globs: Vec<GlobImport>,
}

impl ModuleTree {
    pub fn new() -> Self {
        let root = ModuleData {
            id: ModuleId::ROOT,
            name: "crate".to_string(),
            parent: None,
            def: None,
            names: HashMap::new(),
            globs: Vec::new(),
            path: String::new(),
            anonymous: false,
        };
        Self { modules: vec![root], ..Self::default() }
    }

    pub fn module(&self, id: ModuleId) -> &ModuleData {
        &self.modules[id.0 as usize]
    }

    pub(crate) fn module_mut(&mut self, id: ModuleId) -> &mut ModuleData {
        &mut self.modules[id.0 as usize]
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleData> {
        self.modules.iter()
    }

    pub fn def(&self, id: DefId) -> &Def {
        &self.defs[id.0 as usize]
    }

    pub fn defs(&self) -> impl Iterator<Item = &Def> {
        self.defs.iter()
    }

    pub fn import(&self, id: ImportId) -> &Import {
        &self.imports[id.0 as usize]
    }

    pub(crate) fn add_module(&mut self, name: String, parent: ModuleId) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        let parent_path = &self.module(parent).path;
        let path = if parent_path.is_empty() { name.clone() } else { format!("{}::{}", parent_path, name) };
        self.modules.push(ModuleData {
            id,
            name,
            parent: Some(parent),
            def: None,
            names: HashMap::new(),
            globs: Vec::new(),
            path,
            anonymous: false,
        });
        id
    }

    /// A module for the items declared in a block inside `parent`.
    pub(crate) fn add_block_module(&mut self, parent: ModuleId) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        let path = self.module(parent).path.clone();
        self.modules.push(ModuleData {
            id,
            name: String::new(),
            parent: Some(parent),
            def: None,
            names: HashMap::new(),
            globs: Vec::new(),
            path,
            anonymous: true,
        });
        id
    }

    /// The nearest named module at or above `id`; what `self` means there.
    pub fn named_module(&self, mut id: ModuleId) -> ModuleId {
        while self.module(id).anonymous {
            match self.module(id).parent {
                Some(parent) => id = parent,
                None => break,
            }
        }
        id
    }

    pub(crate) fn add_def(
        &mut self,
        name: String,
        kind: DefKind,
        module: ModuleId,
        is_pub: bool,
        span: Span,
        node: NodeId,
        qualified: String,
    ) -> DefId {
        let id = DefId(self.defs.len() as u32);
        self.defs.push(Def { id, name, kind, module, is_pub, span, node, qualified });
        id
    }

    /// Qualified name for an item named `name` declared in `module`.
    pub(crate) fn qualify(&self, module: ModuleId, name: &str) -> String {
        let path = &self.module(module).path;
        if path.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", path, name)
        }
    }

    /// Whether `inner` is `outer` or nested somewhere inside it.
    pub fn is_descendant(&self, inner: ModuleId, outer: ModuleId) -> bool {
        let mut current = Some(inner);
        while let Some(m) = current {
            if m == outer {
                return true;
            }
            current = self.module(m).parent;
        }
        false
    }

    /// Private items are visible in their own module and its descendants.
    pub fn is_visible(&self, def: DefId, from: ModuleId) -> bool {
        let def = self.def(def);
        match def.kind {
            DefKind::Variant { parent, .. } => self.is_visible(parent, from),
            _ => def.is_pub || self.is_descendant(from, def.module),
        }
    }

    /// The module a `mod` definition introduces.
    pub fn module_of_def(&self, def: DefId) -> Option<ModuleId> {
        match self.def(def).kind {
            DefKind::Mod(m) => Some(m),
            _ => None,
        }
    }

    /// The namespace a definition opens for further path segments.
    pub fn namespace_of(&self, def: DefId) -> Option<Namespace> {
        match self.def(def).kind {
            DefKind::Mod(m) => Some(Namespace::Module(m)),
            DefKind::Enum { .. } => Some(Namespace::Enum(def)),
            _ => None,
        }
    }

    /// Span of whatever `binding` names, for duplicate and privacy labels.
    pub fn binding_span(&self, binding: NameBinding) -> Span {
        match binding {
            NameBinding::Def(def) => self.def(def).span,
            NameBinding::Import(import) => self.import(import).span,
        }
    }

    /// Variants of an enum definition.
    pub fn variants(&self, def: DefId) -> &[DefId] {
        match &self.def(def).kind {
            DefKind::Enum { variants } => variants,
            _ => &[],
        }
    }

    pub fn variant_named(&self, enum_def: DefId, name: &str) -> Option<DefId> {
        self.variants(enum_def).iter().copied().find(|v| self.def(*v).name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(tree: &mut ModuleTree, name: &str, module: ModuleId, is_pub: bool) -> DefId {
        let qualified = tree.qualify(module, name);
        tree.add_def(name.to_string(), DefKind::Fn, module, is_pub, Span::default(), NodeId(0), qualified)
    }

    #[test]
    fn private_items_are_visible_to_descendants_only() {
        let mut tree = ModuleTree::new();
        let a = tree.add_module("a".to_string(), ModuleId::ROOT);
        let b = tree.add_module("b".to_string(), a);
        let c = tree.add_module("c".to_string(), ModuleId::ROOT);

        let private = def(&mut tree, "f", a, false);
        assert!(tree.is_visible(private, a));
        assert!(tree.is_visible(private, b));
        assert!(!tree.is_visible(private, c));
        assert!(!tree.is_visible(private, ModuleId::ROOT));

        let public = def(&mut tree, "g", a, true);
        assert!(tree.is_visible(public, c));
    }

    #[test]
    fn qualified_names_follow_the_tree() {
        let mut tree = ModuleTree::new();
        let geo = tree.add_module("geo".to_string(), ModuleId::ROOT);
        let shapes = tree.add_module("shapes".to_string(), geo);
        assert_eq!(tree.module(shapes).path, "geo::shapes");
        assert_eq!(tree.qualify(shapes, "Circle"), "geo::shapes::Circle");
        assert_eq!(tree.qualify(ModuleId::ROOT, "main"), "main");
    }

    #[test]
    fn block_modules_are_transparent() {
        let mut tree = ModuleTree::new();
        let geo = tree.add_module("geo".to_string(), ModuleId::ROOT);
        let block = tree.add_block_module(geo);
        let inner = tree.add_block_module(block);
        assert_eq!(tree.qualify(inner, "Local"), "geo::Local");
        assert_eq!(tree.named_module(inner), geo);
        assert_eq!(tree.named_module(geo), geo);

        let private = def(&mut tree, "helper", geo, false);
        assert!(tree.is_visible(private, inner));
    }
}

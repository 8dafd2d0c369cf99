// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The name resolver implementation.

use std::collections::HashMap;

use raccoon_ast::decl::{Item, ItemKind, StructKind, UseTree, UseTreeKind};
use raccoon_ast::expr::{Block, Expr, ExprKind, Pattern, PatternKind};
use raccoon_ast::stmt::{Stmt, StmtKind};
use raccoon_ast::ty::{TypeRef, TypeRefKind};
use raccoon_ast::{Ident, Module, NodeId, Path, Span};

use crate::error::ResolveError;
use crate::link::{PathUse, Start, Target};
use crate::module::{
    DefId, DefKind, GlobImport, GlobState, Import, ImportId, ImportState, ModuleId, ModuleTree, NameBinding,
};
use crate::scope::{ScopeKind, ScopeTree};
use crate::symbol::{SymbolId, SymbolKind, SymbolTable};
use crate::{Builtin, Primitive, Resolution, ResolveResult, ResolvedProgram};

pub struct Resolver {
    pub(crate) tree: ModuleTree,
    pub(crate) symbols: SymbolTable,
    pub(crate) scopes: ScopeTree,
    pub(crate) resolutions: HashMap<NodeId, Resolution>,
    pub(crate) bindings: HashMap<NodeId, SymbolId>,
    pub(crate) item_defs: HashMap<NodeId, DefId>,
    pub(crate) errors: Vec<ResolveError>,
    /// Imports currently being resolved, innermost last.
    pub(crate) import_stack: Vec<ImportId>,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            tree: ModuleTree::new(),
            symbols: SymbolTable::new(),
            scopes: ScopeTree::new(),
            resolutions: HashMap::new(),
            bindings: HashMap::new(),
            item_defs: HashMap::new(),
            errors: Vec::new(),
            import_stack: Vec::new(),
        }
    }

    /// Resolve a whole crate: collect items, link imports, then walk bodies.
    pub fn resolve(module: &Module) -> ResolveResult {
        let mut resolver = Resolver::new();

        resolver.collect_items(&module.items, ModuleId::ROOT);
        resolver.link_imports();
        resolver.resolve_module(&module.items, ModuleId::ROOT);

        tracing::debug!(
            modules = resolver.tree.modules.len(),
            defs = resolver.tree.defs.len(),
            locals = resolver.symbols.len(),
            errors = resolver.errors.len(),
            "name resolution finished"
        );

        ResolveResult {
            program: ResolvedProgram {
                modules: resolver.tree,
                symbols: resolver.symbols,
                scopes: resolver.scopes,
                resolutions: resolver.resolutions,
                bindings: resolver.bindings,
                item_defs: resolver.item_defs,
            },
            errors: resolver.errors,
        }
    }

    // =========================================================================
    // Pass 1: Item Collection
    // =========================================================================

    fn collect_items(&mut self, items: &[Item], module: ModuleId) {
        for item in items {
            self.collect_item(item, module);
        }
    }

    fn collect_item(&mut self, item: &Item, module: ModuleId) {
        match &item.kind {
            ItemKind::Fn(f) => {
                self.declare_def(item, &f.name, DefKind::Fn, module);
            }
            ItemKind::Struct(s) => {
                self.declare_def(item, &s.name, DefKind::Struct, module);
            }
            ItemKind::Const(c) => {
                self.declare_def(item, &c.name, DefKind::Const, module);
            }
            ItemKind::Enum(e) => {
                let enum_def = self.declare_def(item, &e.name, DefKind::Enum { variants: Vec::new() }, module);
                let enum_path = self.tree.def(enum_def).qualified.clone();
                let mut variants: Vec<DefId> = Vec::new();
                for (index, variant) in e.variants.iter().enumerate() {
                    if let Some(prev) = variants.iter().find(|v| self.tree.def(**v).name == variant.name.name) {
                        let previous = self.tree.def(*prev).span;
                        self.errors.push(ResolveError::duplicate(
                            variant.name.name.clone(),
                            variant.name.span,
                            previous,
                        ));
                        continue;
                    }
                    let def = self.tree.add_def(
                        variant.name.name.clone(),
                        DefKind::Variant { parent: enum_def, index },
                        module,
                        item.is_pub,
                        variant.name.span,
                        item.id,
                        format!("{}::{}", enum_path, variant.name.name),
                    );
                    variants.push(def);
                }
                self.tree.defs[enum_def.0 as usize].kind = DefKind::Enum { variants };
            }
            ItemKind::Mod(m) => {
                let child = self.tree.add_module(m.name.name.clone(), module);
                let def = self.declare_def(item, &m.name, DefKind::Mod(child), module);
                self.tree.module_mut(child).def = Some(def);
                tracing::trace!(module = %self.tree.module(child).path, "collecting module");
                self.collect_items(m.body.items(), child);
            }
            ItemKind::Use(u) => {
                self.collect_use(&u.tree, &[], module, item.is_pub);
            }
        }
    }

    fn declare_def(&mut self, item: &Item, name: &Ident, kind: DefKind, module: ModuleId) -> DefId {
        let qualified = self.tree.qualify(module, &name.name);
        let def = self.tree.add_def(name.name.clone(), kind, module, item.is_pub, name.span, item.id, qualified);
        self.item_defs.insert(item.id, def);
        self.declare_name(module, name, NameBinding::Def(def));
        def
    }

    fn declare_name(&mut self, module: ModuleId, name: &Ident, binding: NameBinding) {
        if let Some(prev) = self.tree.module(module).names.get(&name.name).copied() {
            let previous = self.tree.binding_span(prev);
            self.errors.push(ResolveError::duplicate(name.name.clone(), name.span, previous));
            return;
        }
        self.tree.module_mut(module).names.insert(name.name.clone(), binding);
    }

    /// Flatten a use tree into single imports and globs.
    fn collect_use(&mut self, tree: &UseTree, prefix: &[Ident], module: ModuleId, is_pub: bool) {
        let mut path = prefix.to_vec();
        path.extend(tree.prefix.segments.iter().cloned());

        match &tree.kind {
            UseTreeKind::Simple(alias) => {
                // `use a::{self}` binds `a`.
                let bound = match (alias, path.as_slice()) {
                    (Some(alias), _) => alias.clone(),
                    (None, [.., parent, last]) if last.name == "self" => Ident::new(parent.name.clone(), last.span),
                    (None, [.., last]) => last.clone(),
                    (None, []) => return,
                };
                let id = ImportId(self.tree.imports.len() as u32);
                self.tree.imports.push(Import {
                    id,
                    module,
                    path,
                    name: bound.name.clone(),
                    is_pub,
                    span: bound.span,
                    state: ImportState::Unresolved,
                });
                self.declare_name(module, &bound, NameBinding::Import(id));
            }
            UseTreeKind::Nested(trees) => {
                for t in trees {
                    self.collect_use(t, &path, module, is_pub);
                }
            }
            UseTreeKind::Glob => {
                let index = self.tree.globs.len();
                self.tree.globs.push(GlobImport {
                    module,
                    path,
                    is_pub,
                    span: tree.span,
                    state: GlobState::Unlinked,
                });
                self.tree.module_mut(module).globs.push(index);
            }
        }
    }

    // =========================================================================
    // Pass 3: Body Resolution
    // =========================================================================

    fn resolve_module(&mut self, items: &[Item], module: ModuleId) {
        self.scopes.push(ScopeKind::Module(module));
        for item in items {
            self.resolve_item(item);
        }
        self.scopes.pop();
    }

    fn resolve_item(&mut self, item: &Item) {
        match &item.kind {
            ItemKind::Fn(f) => {
                self.scopes.push(ScopeKind::Function);
                for param in &f.params {
                    self.resolve_type(&param.ty);
                    if self.scopes.defined_here(&param.name.name) {
                        let previous = self
                            .scopes
                            .lookup(&param.name.name)
                            .and_then(|sym| self.symbols.get(sym))
                            .map(|sym| sym.span)
                            .unwrap_or_default();
                        self.errors.push(ResolveError::duplicate(
                            param.name.name.clone(),
                            param.name.span,
                            previous,
                        ));
                        continue;
                    }
                    self.bind(&param.name, SymbolKind::Param, param.id);
                }
                if let Some(ret) = &f.ret_ty {
                    self.resolve_type(ret);
                }
                self.resolve_block(&f.body);
                self.scopes.pop();
            }
            ItemKind::Struct(s) => match &s.kind {
                StructKind::Named(fields) => {
                    for field in fields {
                        self.resolve_type(&field.ty);
                    }
                }
                StructKind::Tuple(fields) => {
                    for field in fields {
                        self.resolve_type(&field.ty);
                    }
                }
                StructKind::Unit => {}
            },
            ItemKind::Enum(e) => {
                for ty in e.variants.iter().filter_map(|v| v.fields.as_ref()).flatten() {
                    self.resolve_type(ty);
                }
            }
            ItemKind::Const(c) => {
                self.resolve_type(&c.ty);
                self.resolve_expr(&c.init);
            }
            ItemKind::Mod(m) => {
                if let Some(child) = self.item_defs.get(&item.id).and_then(|def| self.tree.module_of_def(*def)) {
                    self.resolve_module(m.body.items(), child);
                }
            }
            ItemKind::Use(_) => {}
        }
    }

    /// Declare a local in the current scope and record the declaring node.
    fn bind(&mut self, name: &Ident, kind: SymbolKind, node: NodeId) -> SymbolId {
        let sym = self.symbols.insert(name.name.clone(), kind, name.span, node);
        self.scopes.define(name.name.clone(), sym);
        self.bindings.insert(node, sym);
        sym
    }

    fn resolve_block(&mut self, block: &Block) {
        self.scopes.push(ScopeKind::Block);

        // Items are visible to the whole block, before and after their declaration.
        let items: Vec<&Item> = block
            .stmts
            .iter()
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::Item(item) => Some(item.as_ref()),
                _ => None,
            })
            .collect();
        let has_items = !items.is_empty();
        if has_items {
            let module = self.tree.add_block_module(self.current_module());
            for item in items {
                self.collect_item(item, module);
            }
            tracing::trace!(module = module.0, "collected block items");
            self.scopes.push(ScopeKind::Items(module));
        }

        for stmt in &block.stmts {
            self.resolve_stmt(stmt);
        }
        if let Some(tail) = &block.tail {
            self.resolve_expr(tail);
        }

        if has_items {
            self.scopes.pop();
        }
        self.scopes.pop();
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let { name, ty, init } => {
                // The initializer is resolved before the name is in scope.
                self.resolve_expr(init);
                if let Some(ty) = ty {
                    self.resolve_type(ty);
                }
                self.bind(name, SymbolKind::Let, stmt.id);
            }
            StmtKind::Const { name, ty, init } => {
                self.resolve_expr(init);
                if let Some(ty) = ty {
                    self.resolve_type(ty);
                }
                self.bind(name, SymbolKind::Const, stmt.id);
            }
            StmtKind::Item(item) => self.resolve_item(item),
            StmtKind::Expr(expr) | StmtKind::Semi(expr) => self.resolve_expr(expr),
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::String(_) | ExprKind::Bool(_) => {}
            ExprKind::Path(path) => self.resolve_value_path(expr.id, path),
            ExprKind::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(operand),
            ExprKind::Assign { target, value } | ExprKind::AssignOp { target, value, .. } => {
                self.resolve_expr(target);
                self.resolve_expr(value);
            }
            ExprKind::Call { func, args } => {
                self.resolve_expr(func);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            ExprKind::Field { object, .. } => self.resolve_expr(object),
            ExprKind::Index { object, index } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
            }
            ExprKind::StructLit { path, fields } => {
                self.resolve_item_path(expr.id, path, PathUse::Type);
                for field in fields {
                    self.resolve_expr(&field.value);
                }
            }
            ExprKind::Array(elems) => {
                for elem in elems {
                    self.resolve_expr(elem);
                }
            }
            ExprKind::Paren(inner) => self.resolve_expr(inner),
            ExprKind::Block(block) => self.resolve_block(block),
            ExprKind::If { cond, then_branch, else_branch } => {
                self.resolve_expr(cond);
                self.resolve_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_expr(else_branch);
                }
            }
            ExprKind::Match { scrutinee, arms } => {
                self.resolve_expr(scrutinee);
                for arm in arms {
                    self.scopes.push(ScopeKind::Arm);
                    let mut bound = HashMap::new();
                    self.resolve_pattern(&arm.pattern, false, &mut bound);
                    self.resolve_expr(&arm.body);
                    self.scopes.pop();
                }
            }
            ExprKind::Loop(body) => {
                self.scopes.push(ScopeKind::Loop);
                self.resolve_block(body);
                self.scopes.pop();
            }
            ExprKind::While { cond, body } => {
                self.resolve_expr(cond);
                self.scopes.push(ScopeKind::Loop);
                self.resolve_block(body);
                self.scopes.pop();
            }
            ExprKind::For { binding, iter, body } => {
                self.resolve_expr(iter);
                self.scopes.push(ScopeKind::Loop);
                self.bind(binding, SymbolKind::ForBinding, expr.id);
                self.resolve_block(body);
                self.scopes.pop();
            }
            ExprKind::Range { start, end } => {
                if let Some(start) = start {
                    self.resolve_expr(start);
                }
                if let Some(end) = end {
                    self.resolve_expr(end);
                }
            }
            ExprKind::Return(value) => {
                if !self.scopes.in_function() {
                    self.errors.push(ResolveError::return_outside_fn(expr.span));
                }
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            ExprKind::Break => {
                if !self.scopes.in_loop() {
                    self.errors.push(ResolveError::invalid_break(expr.span));
                }
            }
            ExprKind::Continue => {
                if !self.scopes.in_loop() {
                    self.errors.push(ResolveError::invalid_continue(expr.span));
                }
            }
        }
    }

    /// `bound` maps names bound so far in this arm to their spans.
    fn resolve_pattern(&mut self, pattern: &Pattern, in_or: bool, bound: &mut HashMap<String, Span>) {
        match &pattern.kind {
            PatternKind::Wildcard | PatternKind::Literal(_) => {}
            PatternKind::Binding(name) => {
                if in_or {
                    self.errors.push(ResolveError::binding_in_or_pattern(name.clone(), pattern.span));
                    return;
                }
                if let Some(previous) = bound.get(name) {
                    self.errors.push(ResolveError::duplicate(name.clone(), pattern.span, *previous));
                    return;
                }
                bound.insert(name.clone(), pattern.span);
                let ident = Ident::new(name.clone(), pattern.span);
                self.bind(&ident, SymbolKind::PatternBinding, pattern.id);
            }
            PatternKind::Path(path) => {
                self.resolve_item_path(pattern.id, path, PathUse::Value);
            }
            PatternKind::TupleStruct { path, fields } => {
                self.resolve_item_path(pattern.id, path, PathUse::Value);
                for field in fields {
                    self.resolve_pattern(field, in_or, bound);
                }
            }
            PatternKind::Struct { path, fields, .. } => {
                self.resolve_item_path(pattern.id, path, PathUse::Type);
                for field in fields {
                    self.resolve_pattern(&field.pattern, in_or, bound);
                }
            }
            PatternKind::Or(alternatives) => {
                for alt in alternatives {
                    self.resolve_pattern(alt, true, bound);
                }
            }
        }
    }

    fn resolve_type(&mut self, ty: &TypeRef) {
        match &ty.kind {
            TypeRefKind::Path(path) => {
                if let Some(prim) = path.as_single().and_then(Primitive::from_name) {
                    self.resolutions.insert(ty.id, Resolution::Primitive(prim));
                    return;
                }
                if let Some(def) = self.resolve_item_path(ty.id, path, PathUse::Type) {
                    if !matches!(self.tree.def(def).kind, DefKind::Struct | DefKind::Enum { .. }) {
                        self.resolutions.remove(&ty.id);
                        self.errors.push(ResolveError::not_a_type(path.to_string(), path.span));
                    }
                }
            }
            TypeRefKind::Array(elem) => self.resolve_type(elem),
            TypeRefKind::Unit => {}
        }
    }

    /// Resolve a value path: a local, an item, or a builtin.
    fn resolve_value_path(&mut self, node: NodeId, path: &Path) {
        if let Some(name) = path.as_single() {
            if let Some(sym) = self.scopes.lookup(name) {
                self.resolutions.insert(node, Resolution::Local(sym));
                return;
            }
            let module = self.current_module();
            if let Ok(Some(def)) = self.lookup_lexical(module, name) {
                self.resolutions.insert(node, Resolution::Def(def));
                return;
            }
            if let Some(builtin) = Builtin::from_name(name) {
                self.resolutions.insert(node, Resolution::Builtin(builtin));
                return;
            }
        } else if let Some(first) = path.segments.first() {
            if self.scopes.lookup(&first.name).is_some() {
                self.errors.push(ResolveError::not_a_module(first.name.clone(), first.span));
                return;
            }
        }
        self.resolve_item_path(node, path, PathUse::Value);
    }

    /// Resolve a path naming a module-level item and record it on `node`.
    fn resolve_item_path(&mut self, node: NodeId, path: &Path, usage: PathUse) -> Option<DefId> {
        let module = self.current_module();
        match self.walk(module, &path.segments, Start::Lexical) {
            Ok(Target::Def(def)) => {
                self.resolutions.insert(node, Resolution::Def(def));
                Some(def)
            }
            Ok(Target::Module(m)) => match self.tree.module(m).def {
                Some(def) => {
                    self.resolutions.insert(node, Resolution::Def(def));
                    Some(def)
                }
                None => {
                    self.errors.push(ResolveError::not_a_type(path.to_string(), path.span));
                    None
                }
            },
            Err(err) => {
                self.report_walk_error(err, &path.segments, usage);
                None
            }
        }
    }

    fn current_module(&self) -> ModuleId {
        self.scopes.module().unwrap_or(ModuleId::ROOT)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

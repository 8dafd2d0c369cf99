// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Indented, span-free dump of a syntax tree.
//!
//! Two programs that differ only in layout and comments dump to the same text,
//! which makes the dump a convenient structural equality check.

use raccoon_ast::decl::*;
use raccoon_ast::expr::*;
use raccoon_ast::stmt::*;
use raccoon_ast::ty::{TypeRef, TypeRefKind};
use raccoon_ast::Module;

use crate::printer::format_float;

pub fn dump_module(module: &Module) -> String {
    let mut w = TreeWriter::default();
    w.line("Module");
    w.nested(|w| {
        for item in &module.items {
            w.item(item);
        }
    });
    w.out
}

#[derive(Default)]
struct TreeWriter {
    out: String,
    depth: usize,
}

impl TreeWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn item(&mut self, item: &Item) {
        let vis = if item.is_pub { "pub " } else { "" };
        match &item.kind {
            ItemKind::Fn(f) => {
                let ret = f.ret_ty.as_ref().map(|t| format!(" -> {}", ty(t))).unwrap_or_default();
                self.line(format!("{}Fn {}{}", vis, f.name.name, ret));
                self.nested(|w| {
                    for p in &f.params {
                        w.line(format!("Param {}: {}", p.name.name, ty(&p.ty)));
                    }
                    w.block(&f.body);
                });
            }
            ItemKind::Struct(s) => {
                self.line(format!("{}Struct {}", vis, s.name.name));
                self.nested(|w| match &s.kind {
                    StructKind::Named(fields) => {
                        for f in fields {
                            let fvis = if f.is_pub { "pub " } else { "" };
                            w.line(format!("{}Field {}: {}", fvis, f.name.name, ty(&f.ty)));
                        }
                    }
                    StructKind::Tuple(fields) => {
                        for (i, f) in fields.iter().enumerate() {
                            let fvis = if f.is_pub { "pub " } else { "" };
                            w.line(format!("{}Field {}: {}", fvis, i, ty(&f.ty)));
                        }
                    }
                    StructKind::Unit => w.line("Unit"),
                });
            }
            ItemKind::Enum(e) => {
                self.line(format!("{}Enum {}", vis, e.name.name));
                self.nested(|w| {
                    for v in &e.variants {
                        match &v.fields {
                            Some(fields) => {
                                let tys: Vec<String> = fields.iter().map(ty).collect();
                                w.line(format!("Variant {}({})", v.name.name, tys.join(", ")));
                            }
                            None => w.line(format!("Variant {}", v.name.name)),
                        }
                    }
                });
            }
            ItemKind::Const(c) => {
                self.line(format!("{}Const {}: {}", vis, c.name.name, ty(&c.ty)));
                self.nested(|w| w.expr(&c.init));
            }
            ItemKind::Mod(m) => {
                let kind = match &m.body {
                    ModBody::Inline(_) => "inline",
                    ModBody::External => "external",
                    ModBody::Loaded { .. } => "file",
                };
                self.line(format!("{}Mod {} ({})", vis, m.name.name, kind));
                self.nested(|w| {
                    for item in m.body.items() {
                        w.item(item);
                    }
                });
            }
            ItemKind::Use(u) => {
                self.line(format!("{}Use", vis));
                self.nested(|w| w.use_tree(&u.tree));
            }
        }
    }

    fn use_tree(&mut self, tree: &UseTree) {
        match &tree.kind {
            UseTreeKind::Simple(None) => self.line(format!("Path {}", tree.prefix)),
            UseTreeKind::Simple(Some(alias)) => self.line(format!("Path {} as {}", tree.prefix, alias.name)),
            UseTreeKind::Glob => self.line(format!("Glob {}", tree.prefix)),
            UseTreeKind::Nested(trees) => {
                self.line(format!("Group {}", tree.prefix));
                self.nested(|w| {
                    for t in trees {
                        w.use_tree(t);
                    }
                });
            }
        }
    }

    fn block(&mut self, block: &Block) {
        self.line("Block");
        self.nested(|w| {
            for stmt in &block.stmts {
                w.stmt(stmt);
            }
            if let Some(tail) = &block.tail {
                w.line("Tail");
                w.nested(|w| w.expr(tail));
            }
        });
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let { name, ty: t, init } | StmtKind::Const { name, ty: t, init } => {
                let kw = if matches!(stmt.kind, StmtKind::Let { .. }) { "Let" } else { "Const" };
                let annot = t.as_ref().map(|t| format!(": {}", ty(t))).unwrap_or_default();
                self.line(format!("{} {}{}", kw, name.name, annot));
                self.nested(|w| w.expr(init));
            }
            StmtKind::Expr(e) => {
                self.line("ExprStmt");
                self.nested(|w| w.expr(e));
            }
            StmtKind::Semi(e) => {
                self.line("Semi");
                self.nested(|w| w.expr(e));
            }
            StmtKind::Item(item) => self.item(item),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Int(n) => self.line(format!("Int {}", n)),
            ExprKind::Float(x) => self.line(format!("Float {}", format_float(*x))),
            ExprKind::String(s) => self.line(format!("String {:?}", s)),
            ExprKind::Bool(b) => self.line(format!("Bool {}", b)),
            ExprKind::Path(p) => self.line(format!("Path {}", p)),
            ExprKind::Binary { op, left, right } => {
                self.line(format!("Binary {}", op.symbol()));
                self.nested(|w| {
                    w.expr(left);
                    w.expr(right);
                });
            }
            ExprKind::Unary { op, operand } => {
                self.line(format!("Unary {}", op.symbol()));
                self.nested(|w| w.expr(operand));
            }
            ExprKind::Assign { target, value } => {
                self.line("Assign");
                self.nested(|w| {
                    w.expr(target);
                    w.expr(value);
                });
            }
            ExprKind::AssignOp { op, target, value } => {
                self.line(format!("AssignOp {}=", op.symbol()));
                self.nested(|w| {
                    w.expr(target);
                    w.expr(value);
                });
            }
            ExprKind::Call { func, args } => {
                self.line("Call");
                self.nested(|w| {
                    w.expr(func);
                    for a in args {
                        w.expr(a);
                    }
                });
            }
            ExprKind::Field { object, field, .. } => {
                self.line(format!("Field {}", field));
                self.nested(|w| w.expr(object));
            }
            ExprKind::Index { object, index } => {
                self.line("Index");
                self.nested(|w| {
                    w.expr(object);
                    w.expr(index);
                });
            }
            ExprKind::StructLit { path, fields } => {
                self.line(format!("StructLit {}", path));
                self.nested(|w| {
                    for f in fields {
                        w.line(format!("Init {}", f.name.name));
                        w.nested(|w| w.expr(&f.value));
                    }
                });
            }
            ExprKind::Array(elems) => {
                self.line("Array");
                self.nested(|w| {
                    for e in elems {
                        w.expr(e);
                    }
                });
            }
            ExprKind::Paren(inner) => {
                self.line("Paren");
                self.nested(|w| w.expr(inner));
            }
            ExprKind::Block(block) => self.block(block),
            ExprKind::If { cond, then_branch, else_branch } => {
                self.line("If");
                self.nested(|w| {
                    w.expr(cond);
                    w.block(then_branch);
                    if let Some(els) = else_branch {
                        w.line("Else");
                        w.nested(|w| w.expr(els));
                    }
                });
            }
            ExprKind::Match { scrutinee, arms } => {
                self.line("Match");
                self.nested(|w| {
                    w.expr(scrutinee);
                    for arm in arms {
                        w.line("Arm");
                        w.nested(|w| {
                            w.pattern(&arm.pattern);
                            w.expr(&arm.body);
                        });
                    }
                });
            }
            ExprKind::Loop(body) => {
                self.line("Loop");
                self.nested(|w| w.block(body));
            }
            ExprKind::While { cond, body } => {
                self.line("While");
                self.nested(|w| {
                    w.expr(cond);
                    w.block(body);
                });
            }
            ExprKind::For { binding, iter, body } => {
                self.line(format!("For {}", binding.name));
                self.nested(|w| {
                    w.expr(iter);
                    w.block(body);
                });
            }
            ExprKind::Range { start, end } => {
                self.line("Range");
                self.nested(|w| {
                    match start {
                        Some(s) => w.expr(s),
                        None => w.line("Open"),
                    }
                    match end {
                        Some(e) => w.expr(e),
                        None => w.line("Open"),
                    }
                });
            }
            ExprKind::Return(value) => {
                self.line("Return");
                if let Some(v) = value {
                    self.nested(|w| w.expr(v));
                }
            }
            ExprKind::Break => self.line("Break"),
            ExprKind::Continue => self.line("Continue"),
        }
    }

    fn pattern(&mut self, pat: &Pattern) {
        match &pat.kind {
            PatternKind::Wildcard => self.line("Wildcard"),
            PatternKind::Binding(name) => self.line(format!("Binding {}", name)),
            PatternKind::Literal(Literal::Float(x)) => self.line(format!("Literal {}", format_float(*x))),
            PatternKind::Literal(lit) => self.line(format!("Literal {}", lit)),
            PatternKind::Path(path) => self.line(format!("PathPat {}", path)),
            PatternKind::TupleStruct { path, fields } => {
                self.line(format!("TupleStruct {}", path));
                self.nested(|w| {
                    for f in fields {
                        w.pattern(f);
                    }
                });
            }
            PatternKind::Struct { path, fields, rest } => {
                self.line(format!("StructPat {}{}", path, if *rest { " .." } else { "" }));
                self.nested(|w| {
                    for f in fields {
                        w.line(format!("Field {}", f.name.name));
                        w.nested(|w| w.pattern(&f.pattern));
                    }
                });
            }
            PatternKind::Or(alts) => {
                self.line("Or");
                self.nested(|w| {
                    for a in alts {
                        w.pattern(a);
                    }
                });
            }
        }
    }
}

fn ty(t: &TypeRef) -> String {
    match &t.kind {
        TypeRefKind::Path(path) => path.to_string(),
        TypeRefKind::Array(elem) => format!("{}[]", ty(elem)),
        TypeRefKind::Unit => "()".to_string(),
    }
}

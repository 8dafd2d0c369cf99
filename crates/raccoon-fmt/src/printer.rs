// SPDX-License-Identifier: (MIT OR Apache-2.0)

use raccoon_ast::decl::*;
use raccoon_ast::expr::*;
use raccoon_ast::stmt::*;
use raccoon_ast::ty::{TypeRef, TypeRefKind};
use raccoon_ast::Module;

use crate::comment::CommentList;
use crate::config::FormatConfig;

pub struct Printer<'a> {
    output: String,
    indent: usize,
    source: &'a str,
    /// Global offset of `source[0]`; spans are shifted by this before slicing.
    base: usize,
    comments: CommentList,
    config: &'a FormatConfig,
}

impl<'a> Printer<'a> {
    pub fn new(source: &'a str, base: usize, comments: CommentList, config: &'a FormatConfig) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            source,
            base,
            comments,
            config,
        }
    }

    pub fn finish(mut self) -> String {
        let rest = self.comments.take_rest();
        if !rest.is_empty() && !self.output.is_empty() {
            self.output.push('\n');
        }
        for c in rest {
            self.output.push_str(&c.text);
            self.output.push('\n');
        }
        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output
    }

    // --- Helpers ---

    fn emit(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn emit_newline(&mut self) {
        self.output.push('\n');
    }

    fn emit_indent(&mut self) {
        let pad = self.pad(self.indent);
        self.output.push_str(&pad);
    }

    fn pad(&self, level: usize) -> String {
        " ".repeat(level * self.config.indent_width)
    }

    /// Whether the source has a blank line right before `pos`, looking back
    /// through whitespace only.
    fn has_blank_line_before(&self, pos: usize) -> bool {
        let bytes = self.source.as_bytes();
        let mut newlines = 0;
        let mut p = pos.saturating_sub(self.base).min(bytes.len());
        while p > 0 {
            p -= 1;
            match bytes[p] {
                b'\n' => newlines += 1,
                b' ' | b'\t' | b'\r' => {}
                _ => break,
            }
        }
        newlines >= 2
    }

    /// Write the comments that precede `pos` on their own lines, keeping a
    /// single blank line wherever the source had one. `first` suppresses the
    /// blank line at the top of a block.
    fn leading(&mut self, pos: usize, level: usize, out: &mut String, first: &mut bool) {
        for c in self.comments.take_before(pos) {
            if !*first && self.has_blank_line_before(c.span.start) {
                out.push('\n');
            }
            out.push_str(&self.pad(level));
            out.push_str(&c.text);
            out.push('\n');
            *first = false;
        }
        if !*first && self.has_blank_line_before(pos) {
            out.push('\n');
        }
        *first = false;
    }

    // --- Module ---

    pub fn format_module(&mut self, module: &Module) {
        self.format_items(&module.items);
    }

    fn format_items(&mut self, items: &[Item]) {
        let mut prev_was_use = false;

        for (i, item) in items.iter().enumerate() {
            let is_use = matches!(item.kind, ItemKind::Use(_));
            let comments = self.comments.take_before(item.span.start);

            // One blank line between items; consecutive imports stay together.
            if i > 0 && (!(prev_was_use && is_use) || self.has_blank_line_before(item.span.start)) {
                self.emit_blank_line();
            }
            for (j, c) in comments.iter().enumerate() {
                if j > 0 && self.has_blank_line_before(c.span.start) {
                    self.emit_blank_line();
                }
                self.emit_indent();
                self.emit(&c.text);
                self.emit_newline();
            }
            if !comments.is_empty() && self.has_blank_line_before(item.span.start) {
                self.emit_blank_line();
            }

            self.format_item(item);
            prev_was_use = is_use;
        }
    }

    fn emit_blank_line(&mut self) {
        if self.output.is_empty() || self.output.ends_with("\n\n") {
            return;
        }
        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output.push('\n');
    }

    // --- Items ---

    fn format_item(&mut self, item: &Item) {
        self.emit_indent();
        if item.is_pub {
            self.emit("pub ");
        }

        match &item.kind {
            ItemKind::Fn(f) => self.format_fn_decl(f),
            ItemKind::Struct(s) => self.format_struct_decl(s),
            ItemKind::Enum(e) => self.format_enum_decl(e),
            ItemKind::Const(c) => {
                let init = self.expr(&c.init, self.indent);
                let line = format!("const {}: {} = {};", c.name.name, self.ty(&c.ty), init);
                self.emit(&line);
            }
            ItemKind::Mod(m) => self.format_mod_decl(m),
            ItemKind::Use(u) => {
                let tree = self.use_tree(&u.tree);
                self.emit(&format!("use {};", tree));
            }
        }
        self.emit_newline();
    }

    fn format_fn_decl(&mut self, f: &FnDecl) {
        let params: Vec<String> = f
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name.name, self.ty(&p.ty)))
            .collect();
        self.emit(&format!("fn {}({})", f.name.name, params.join(", ")));
        if let Some(ret) = &f.ret_ty {
            let ret = self.ty(ret);
            self.emit(&format!(" -> {}", ret));
        }
        self.emit(" ");
        let body = self.block(&f.body, self.indent);
        self.emit(&body);
    }

    fn format_struct_decl(&mut self, s: &StructDecl) {
        self.emit(&format!("struct {}", s.name.name));
        match &s.kind {
            StructKind::Unit => self.emit(";"),
            StructKind::Tuple(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{}{}", if f.is_pub { "pub " } else { "" }, self.ty(&f.ty)))
                    .collect();
                self.emit(&format!("({});", fields.join(", ")));
            }
            StructKind::Named(fields) if fields.is_empty() => self.emit(" {}"),
            StructKind::Named(fields) => {
                let mut out = String::from(" {\n");
                let mut first = true;
                for field in fields {
                    self.leading(field.name.span.start, self.indent + 1, &mut out, &mut first);
                    out.push_str(&self.pad(self.indent + 1));
                    if field.is_pub {
                        out.push_str("pub ");
                    }
                    out.push_str(&format!("{}: {},\n", field.name.name, self.ty(&field.ty)));
                }
                out.push_str(&self.pad(self.indent));
                out.push('}');
                self.emit(&out);
            }
        }
    }

    fn format_enum_decl(&mut self, e: &EnumDecl) {
        self.emit(&format!("enum {}", e.name.name));
        if e.variants.is_empty() {
            self.emit(" {}");
            return;
        }

        let mut out = String::from(" {\n");
        let mut first = true;
        for variant in &e.variants {
            self.leading(variant.span.start, self.indent + 1, &mut out, &mut first);
            out.push_str(&self.pad(self.indent + 1));
            out.push_str(&variant.name.name);
            if let Some(fields) = &variant.fields {
                let tys: Vec<String> = fields.iter().map(|t| self.ty(t)).collect();
                out.push_str(&format!("({})", tys.join(", ")));
            }
            out.push_str(",\n");
        }
        out.push_str(&self.pad(self.indent));
        out.push('}');
        self.emit(&out);
    }

    fn format_mod_decl(&mut self, m: &ModDecl) {
        match &m.body {
            // Loaded modules live in their own file.
            ModBody::External | ModBody::Loaded { .. } => self.emit(&format!("mod {};", m.name.name)),
            ModBody::Inline(items) if items.is_empty() => self.emit(&format!("mod {} {{}}", m.name.name)),
            ModBody::Inline(items) => {
                self.emit(&format!("mod {} {{", m.name.name));
                self.emit_newline();
                self.indent += 1;
                self.format_items(items);
                self.indent -= 1;
                self.emit_indent();
                self.emit("}");
            }
        }
    }

    fn use_tree(&self, tree: &UseTree) -> String {
        let prefix = tree.prefix.to_string();
        match &tree.kind {
            UseTreeKind::Simple(None) => prefix,
            UseTreeKind::Simple(Some(alias)) => format!("{} as {}", prefix, alias.name),
            UseTreeKind::Glob => format!("{}::*", prefix),
            UseTreeKind::Nested(trees) => {
                let inner: Vec<String> = trees.iter().map(|t| self.use_tree(t)).collect();
                format!("{}::{{{}}}", prefix, inner.join(", "))
            }
        }
    }

    fn ty(&self, ty: &TypeRef) -> String {
        match &ty.kind {
            TypeRefKind::Path(path) => path.to_string(),
            TypeRefKind::Array(elem) => format!("{}[]", self.ty(elem)),
            TypeRefKind::Unit => "()".to_string(),
        }
    }

    // --- Blocks and statements ---

    fn block(&mut self, block: &Block, level: usize) -> String {
        if block.stmts.is_empty() && block.tail.is_none() && !self.comments.has_before(block.span.end) {
            return "{}".to_string();
        }

        let mut out = String::from("{\n");
        let mut first = true;

        for stmt in &block.stmts {
            self.leading(stmt.span.start, level + 1, &mut out, &mut first);
            let text = self.stmt(stmt, level + 1);
            out.push_str(&self.pad(level + 1));
            out.push_str(&text);
            out.push('\n');
        }

        if let Some(tail) = &block.tail {
            self.leading(tail.span.start, level + 1, &mut out, &mut first);
            let text = self.expr(tail, level + 1);
            out.push_str(&self.pad(level + 1));
            out.push_str(&text);
            out.push('\n');
        }

        // Comments after the last statement stay inside the block.
        for c in self.comments.take_before(block.span.end) {
            if !first && self.has_blank_line_before(c.span.start) {
                out.push('\n');
            }
            out.push_str(&self.pad(level + 1));
            out.push_str(&c.text);
            out.push('\n');
            first = false;
        }

        out.push_str(&self.pad(level));
        out.push('}');
        out
    }

    fn stmt(&mut self, stmt: &Stmt, level: usize) -> String {
        match &stmt.kind {
            StmtKind::Let { name, ty, init } => self.binding("let", name, ty.as_ref(), init, level),
            StmtKind::Const { name, ty, init } => self.binding("const", name, ty.as_ref(), init, level),
            StmtKind::Expr(e) => self.expr(e, level),
            StmtKind::Semi(e) => format!("{};", self.expr(e, level)),
            StmtKind::Item(item) => self.nested_item(item, level),
        }
    }

    /// Print an item declared inside a block. Items write straight to the
    /// output, so this prints into a fresh buffer at `level`.
    fn nested_item(&mut self, item: &Item, level: usize) -> String {
        let outer = std::mem::take(&mut self.output);
        let indent = std::mem::replace(&mut self.indent, level);
        self.format_item(item);
        let text = std::mem::replace(&mut self.output, outer);
        self.indent = indent;
        text.trim().to_string()
    }

    fn binding(
        &mut self,
        keyword: &str,
        name: &raccoon_ast::Ident,
        ty: Option<&TypeRef>,
        init: &Expr,
        level: usize,
    ) -> String {
        let ty = ty.map(|t| format!(": {}", self.ty(t))).unwrap_or_default();
        format!("{} {}{} = {};", keyword, name.name, ty, self.expr(init, level))
    }

    // --- Expressions ---

    fn expr(&mut self, expr: &Expr, level: usize) -> String {
        match &expr.kind {
            ExprKind::Int(n) => n.to_string(),
            ExprKind::Float(x) => format_float(*x),
            ExprKind::String(s) => format!("{:?}", s),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Path(path) => path.to_string(),
            ExprKind::Binary { op, left, right } => {
                format!("{} {} {}", self.expr(left, level), op.symbol(), self.expr(right, level))
            }
            ExprKind::Unary { op, operand } => format!("{}{}", op.symbol(), self.expr(operand, level)),
            ExprKind::Assign { target, value } => {
                format!("{} = {}", self.expr(target, level), self.expr(value, level))
            }
            ExprKind::AssignOp { op, target, value } => {
                format!("{} {}= {}", self.expr(target, level), op.symbol(), self.expr(value, level))
            }
            ExprKind::Call { func, args } => {
                let func = self.expr(func, level);
                let args = self.list(args, level);
                self.wrap(&func, "(", ")", &args, level)
            }
            ExprKind::Field { object, field, .. } => format!("{}.{}", self.expr(object, level), field),
            ExprKind::Index { object, index } => {
                format!("{}[{}]", self.expr(object, level), self.expr(index, level))
            }
            ExprKind::StructLit { path, fields } => {
                if fields.is_empty() {
                    return format!("{} {{}}", path);
                }
                let parts: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        if f.shorthand {
                            f.name.name.clone()
                        } else {
                            format!("{}: {}", f.name.name, self.expr(&f.value, level + 1))
                        }
                    })
                    .collect();
                let flat = format!("{} {{ {} }}", path, parts.join(", "));
                if self.fits(&flat, level) {
                    flat
                } else {
                    self.wrap(&format!("{} ", path), "{", "}", &parts, level)
                }
            }
            ExprKind::Array(elems) => {
                let parts = self.list(elems, level);
                self.wrap("", "[", "]", &parts, level)
            }
            ExprKind::Paren(inner) => format!("({})", self.expr(inner, level)),
            ExprKind::Block(block) => self.block(block, level),
            ExprKind::If { cond, then_branch, else_branch } => {
                let mut out = format!("if {} {}", self.expr(cond, level), self.block(then_branch, level));
                if let Some(els) = else_branch {
                    out.push_str(" else ");
                    out.push_str(&self.expr(els, level));
                }
                out
            }
            ExprKind::Match { scrutinee, arms } => {
                let scrutinee = self.expr(scrutinee, level);
                if arms.is_empty() {
                    return format!("match {} {{}}", scrutinee);
                }
                let mut out = format!("match {} {{\n", scrutinee);
                let mut first = true;
                for arm in arms {
                    self.leading(arm.span.start, level + 1, &mut out, &mut first);
                    let body = self.expr(&arm.body, level + 1);
                    out.push_str(&self.pad(level + 1));
                    out.push_str(&format!("{} => {}", pattern(&arm.pattern), body));
                    if !arm.body.kind.is_block_like() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&self.pad(level));
                out.push('}');
                out
            }
            ExprKind::Loop(body) => format!("loop {}", self.block(body, level)),
            ExprKind::While { cond, body } => {
                format!("while {} {}", self.expr(cond, level), self.block(body, level))
            }
            ExprKind::For { binding, iter, body } => {
                format!("for {} in {} {}", binding.name, self.expr(iter, level), self.block(body, level))
            }
            ExprKind::Range { start, end } => {
                let start = start.as_ref().map(|e| self.expr(e, level)).unwrap_or_default();
                let end = end.as_ref().map(|e| self.expr(e, level)).unwrap_or_default();
                format!("{}..{}", start, end)
            }
            ExprKind::Return(None) => "return".to_string(),
            ExprKind::Return(Some(value)) => format!("return {}", self.expr(value, level)),
            ExprKind::Break => "break".to_string(),
            ExprKind::Continue => "continue".to_string(),
        }
    }

    fn list(&mut self, exprs: &[Expr], level: usize) -> Vec<String> {
        exprs.iter().map(|e| self.expr(e, level + 1)).collect()
    }

    fn fits(&self, flat: &str, level: usize) -> bool {
        !flat.contains('\n') && level * self.config.indent_width + flat.len() <= self.config.max_line_width
    }

    /// `prefix(a, b)` on one line, or one element per line when too long.
    fn wrap(&self, prefix: &str, open: &str, close: &str, parts: &[String], level: usize) -> String {
        let flat = format!("{}{}{}{}", prefix, open, parts.join(", "), close);
        if parts.is_empty() || self.fits(&flat, level) {
            return flat;
        }
        let mut out = format!("{}{}\n", prefix, open);
        for part in parts {
            out.push_str(&self.pad(level + 1));
            out.push_str(part);
            out.push_str(",\n");
        }
        out.push_str(&self.pad(level));
        out.push_str(close);
        out
    }
}

fn pattern(pat: &Pattern) -> String {
    match &pat.kind {
        PatternKind::Wildcard => "_".to_string(),
        PatternKind::Binding(name) => name.clone(),
        PatternKind::Literal(Literal::Float(x)) => format_float(*x),
        PatternKind::Literal(lit) => lit.to_string(),
        PatternKind::Path(path) => path.to_string(),
        PatternKind::TupleStruct { path, fields } => {
            let fields: Vec<String> = fields.iter().map(pattern).collect();
            format!("{}({})", path, fields.join(", "))
        }
        PatternKind::Struct { path, fields, rest } => {
            let mut parts: Vec<String> = fields
                .iter()
                .map(|f| if f.shorthand { f.name.name.clone() } else { format!("{}: {}", f.name.name, pattern(&f.pattern)) })
                .collect();
            if *rest {
                parts.push("..".to_string());
            }
            if parts.is_empty() {
                format!("{} {{}}", path)
            } else {
                format!("{} {{ {} }}", path, parts.join(", "))
            }
        }
        PatternKind::Or(alts) => {
            let alts: Vec<String> = alts.iter().map(pattern).collect();
            alts.join(" | ")
        }
    }
}

/// Float text that lexes back as a float: always has a `.` before any exponent.
pub(crate) fn format_float(x: f64) -> String {
    let text = format!("{:?}", x);
    match text.find('e') {
        Some(e) if !text[..e].contains('.') => format!("{}.0{}", &text[..e], &text[e..]),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::format_float;

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(1e300), "1.0e300");
        assert_eq!(format_float(1.5e-7), "1.5e-7");
    }
}

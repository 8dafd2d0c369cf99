// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.

use raccoon_ast::decl::{
    ConstDecl, EnumDecl, Field, FnDecl, Item, ItemKind, ModBody, ModDecl, Param, StructDecl,
    StructKind, TupleField, UseDecl, UseTree, UseTreeKind, Variant,
};
use raccoon_ast::expr::{
    BinOp, Block, Expr, ExprKind, FieldInit, FieldName, FieldPattern, Literal, MatchArm, Pattern, PatternKind,
    UnaryOp,
};
use raccoon_ast::stmt::{Stmt, StmtKind};
use raccoon_ast::token::{Token, TokenKind};
use raccoon_ast::ty::{TypeRef, TypeRefKind};
use raccoon_ast::{Ident, Module, NodeId, Path, Span};

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// Binding power of prefix operators.
const PREFIX_BP: u8 = 25;
/// Binding power of calls, indexing and field access.
const POSTFIX_BP: u8 = 27;

/// The parser for raccoon source code.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Controls whether `{` after a path can start a struct literal
    /// (false in conditions, scrutinees and loop iterables)
    allow_brace_expr: bool,
    /// Collected errors during parsing
    errors: Vec<ParseError>,
    /// Counter for generating unique NodeIds
    next_node_id: u32,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            let pos = tokens.last().map(|t| t.pos).unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                span: Span::new(end, end),
                pos,
            });
        }
        Self { tokens, pos: 0, allow_brace_expr: true, errors: Vec::new(), next_node_id: 0 }
    }

    /// Start numbering nodes at `first`. Used when several files share one id space.
    pub fn with_first_node_id(mut self, first: u32) -> Self {
        self.next_node_id = first;
        self
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Record error, return if should continue.
    fn record_error(&mut self, error: ParseError) -> bool {
        // Lexical errors are already reported; the parser stays quiet about them.
        if error.kind != ParseErrorKind::AfterLexError {
            self.errors.push(error);
        }
        self.errors.len() < MAX_ERRORS
    }

    /// Skip to the next item after an error.
    ///
    /// With `in_mod` set, an unmatched `}` closes the enclosing inline
    /// module and is left for the caller.
    fn synchronize(&mut self, in_mod: bool) {
        let mut brace_depth = 0;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if brace_depth > 0 {
                        brace_depth -= 1;
                        self.advance();
                        if brace_depth == 0 {
                            return;
                        }
                    } else if in_mod {
                        return;
                    } else {
                        self.advance();
                    }
                }
                TokenKind::Semi if brace_depth == 0 => {
                    self.advance();
                    if self.current_kind().starts_item() || self.check(&TokenKind::RBrace) {
                        return;
                    }
                }
                k if k.starts_item() && brace_depth == 0 => {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the next statement inside a block.
    fn synchronize_in_block(&mut self) {
        let mut brace_depth = 0;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if brace_depth == 0 {
                        return;
                    }
                    brace_depth -= 1;
                    self.advance();
                }
                TokenKind::Semi if brace_depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::Let | TokenKind::Const | TokenKind::Return | TokenKind::While
                | TokenKind::For | TokenKind::Loop | TokenKind::Fn | TokenKind::Struct
                | TokenKind::Enum
                    if brace_depth == 0 =>
                {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if !self.at_end() {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(tok) => tok.span.end,
            None => self.current().span.start,
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.display_name()))
        }
    }

    /// `2^63` only fits once negated.
    fn int_too_large(&self) -> ParseError {
        ParseError::new("integer literal is too large", self.current().span)
            .with_hint("the largest int is 9223372036854775807")
    }

    /// Build an "expected X, found Y" error at the current token.
    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.current();
        if tok.kind == TokenKind::Error {
            return ParseError::after_lex_error(tok.span);
        }
        ParseError::expected(expected, &tok.kind, tok.span)
    }

    fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let ident = Ident::new(name.clone(), self.current().span);
                self.advance();
                Ok(ident)
            }
            _ => Err(self.unexpected("a name")),
        }
    }

    /// A path segment: an identifier or one of `self`, `super`, `crate`.
    fn expect_path_segment(&mut self) -> Result<Ident, ParseError> {
        let name = match self.current_kind() {
            TokenKind::Ident(name) => name.clone(),
            TokenKind::SelfLower => "self".to_string(),
            TokenKind::Super => "super".to_string(),
            TokenKind::Crate => "crate".to_string(),
            _ => return Err(self.unexpected("a name")),
        };
        let ident = Ident::new(name, self.current().span);
        self.advance();
        Ok(ident)
    }

    fn at_path_start(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Ident(_) | TokenKind::SelfLower | TokenKind::Super | TokenKind::Crate
        )
    }

    /// Run `f` with struct literals allowed or disallowed, restoring the old setting.
    fn with_brace_expr<T>(&mut self, allow: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let old = self.allow_brace_expr;
        self.allow_brace_expr = allow;
        let result = f(self);
        self.allow_brace_expr = old;
        result
    }

    // =========================================================================
    // Module Parsing
    // =========================================================================

    /// Parse a whole file.
    pub fn parse(&mut self) -> ParseResult {
        let start = self.current().span.start;
        let mut items = Vec::new();

        while !self.at_end() {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize(false);
                }
            }
        }

        self.errors.truncate(MAX_ERRORS);
        let end = self.current().span.end.max(start);
        tracing::debug!(items = items.len(), errors = self.errors.len(), "parsed module");
        ParseResult {
            module: Module { items, span: Span::new(start, end) },
            errors: std::mem::take(&mut self.errors),
            next_node_id: self.next_node_id,
        }
    }

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        let start = self.current().span.start;
        let is_pub = self.match_token(&TokenKind::Pub);

        let kind = match self.current_kind() {
            TokenKind::Fn => ItemKind::Fn(self.parse_fn_decl()?),
            TokenKind::Struct => ItemKind::Struct(self.parse_struct_decl()?),
            TokenKind::Enum => ItemKind::Enum(self.parse_enum_decl()?),
            TokenKind::Const => ItemKind::Const(self.parse_const_decl()?),
            TokenKind::Mod => ItemKind::Mod(self.parse_mod_decl()?),
            TokenKind::Use => ItemKind::Use(self.parse_use_decl()?),
            TokenKind::Let => {
                return Err(ParseError::new(
                    "'let' is not allowed at module level",
                    self.current().span,
                )
                .with_hint("use 'const NAME: Type = value;' or move the binding into a function"));
            }
            _ => return Err(self.unexpected("item")),
        };

        Ok(Item { id: self.next_id(), kind, is_pub, span: self.span_from(start) })
    }

    fn parse_fn_decl(&mut self) -> Result<FnDecl, ParseError> {
        self.expect(&TokenKind::Fn)?;
        let name = self.expect_ident()?;

        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            let id = self.next_id();
            let param_name = self.expect_ident()?;
            if !self.check(&TokenKind::Colon) {
                return Err(self
                    .unexpected("':'")
                    .with_hint("parameters need a type, like: name: int"));
            }
            self.advance();
            let ty = self.parse_type()?;
            params.push(Param { id, name: param_name, ty });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;

        let ret_ty = if self.match_token(&TokenKind::Arrow) { Some(self.parse_type()?) } else { None };

        let body = self.parse_block()?;
        Ok(FnDecl { name, params, ret_ty, body })
    }

    fn parse_struct_decl(&mut self) -> Result<StructDecl, ParseError> {
        self.expect(&TokenKind::Struct)?;
        let name = self.expect_ident()?;

        let kind = match self.current_kind() {
            TokenKind::Semi => {
                self.advance();
                StructKind::Unit
            }
            TokenKind::LParen => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.at_end() {
                    let is_pub = self.match_token(&TokenKind::Pub);
                    let ty = self.parse_type()?;
                    fields.push(TupleField { ty, is_pub });
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen)?;
                self.expect(&TokenKind::Semi)?;
                StructKind::Tuple(fields)
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RBrace) && !self.at_end() {
                    let is_pub = self.match_token(&TokenKind::Pub);
                    let field_name = self.expect_ident()?;
                    self.expect(&TokenKind::Colon)?;
                    let ty = self.parse_type()?;
                    fields.push(Field { name: field_name, ty, is_pub });
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace)?;
                StructKind::Named(fields)
            }
            _ => return Err(self.unexpected("'{', '(' or ';'")),
        };

        Ok(StructDecl { name, kind })
    }

    fn parse_enum_decl(&mut self) -> Result<EnumDecl, ParseError> {
        self.expect(&TokenKind::Enum)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut variants = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let variant_name = self.expect_ident()?;
            let start = variant_name.span.start;

            let fields = if self.match_token(&TokenKind::LParen) {
                let mut tys = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.at_end() {
                    tys.push(self.parse_type()?);
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen)?;
                Some(tys)
            } else {
                None
            };

            variants.push(Variant { name: variant_name, fields, span: self.span_from(start) });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(EnumDecl { name, variants })
    }

    fn parse_const_decl(&mut self) -> Result<ConstDecl, ParseError> {
        self.expect(&TokenKind::Const)?;
        let name = self.expect_ident()?;

        if !self.check(&TokenKind::Colon) {
            let span = self.current().span;
            if self.current_kind() == &TokenKind::Error {
                return Err(ParseError::after_lex_error(span));
            }
            return Err(ParseError::new(
                format!("module-level constant '{}' needs a type annotation", name.name),
                span,
            )
            .with_expected("':'", self.current_kind())
            .with_hint(format!("write: const {}: Type = value;", name.name)));
        }
        self.advance();
        let ty = self.parse_type()?;

        self.expect(&TokenKind::Eq)?;
        let init = self.parse_expr()?;
        self.expect(&TokenKind::Semi)?;

        Ok(ConstDecl { name, ty, init })
    }

    fn parse_mod_decl(&mut self) -> Result<ModDecl, ParseError> {
        self.expect(&TokenKind::Mod)?;
        let name = self.expect_ident()?;

        if self.match_token(&TokenKind::Semi) {
            return Ok(ModDecl { name, body: ModBody::External });
        }

        self.expect(&TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize(true);
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(ModDecl { name, body: ModBody::Inline(items) })
    }

    fn parse_use_decl(&mut self) -> Result<UseDecl, ParseError> {
        self.expect(&TokenKind::Use)?;
        let tree = self.parse_use_tree()?;
        self.expect(&TokenKind::Semi)?;
        Ok(UseDecl { tree })
    }

    /// `a::b`, `a::b as c`, `a::{b, c}`, `a::*`
    fn parse_use_tree(&mut self) -> Result<UseTree, ParseError> {
        let start = self.current().span.start;
        let mut segments = vec![self.expect_path_segment()?];

        let kind = loop {
            if !self.match_token(&TokenKind::ColonColon) {
                let alias = if self.match_token(&TokenKind::As) { Some(self.expect_ident()?) } else { None };
                break UseTreeKind::Simple(alias);
            }

            match self.current_kind() {
                TokenKind::Star => {
                    self.advance();
                    break UseTreeKind::Glob;
                }
                TokenKind::LBrace => {
                    self.advance();
                    let mut trees = Vec::new();
                    while !self.check(&TokenKind::RBrace) && !self.at_end() {
                        trees.push(self.parse_use_tree()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RBrace)?;
                    break UseTreeKind::Nested(trees);
                }
                _ => segments.push(self.expect_path_segment()?),
            }
        };

        let prefix_span = segments[0].span.to(segments[segments.len() - 1].span);
        Ok(UseTree {
            prefix: Path { segments, span: prefix_span },
            kind,
            span: self.span_from(start),
        })
    }

    // =========================================================================
    // Type Parsing
    // =========================================================================

    /// `()`, `int`, `geo::Point`, `int[]`, `str[][]`
    fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.current().span.start;

        let mut ty = if self.check(&TokenKind::LParen) {
            self.advance();
            self.expect(&TokenKind::RParen)?;
            TypeRef { id: self.next_id(), kind: TypeRefKind::Unit, span: self.span_from(start) }
        } else if self.at_path_start() {
            let path = self.parse_path()?;
            TypeRef { id: self.next_id(), kind: TypeRefKind::Path(path), span: self.span_from(start) }
        } else {
            return Err(self.unexpected("type"));
        };

        while self.check(&TokenKind::LBracket) && matches!(self.peek(1), TokenKind::RBracket) {
            self.advance();
            self.advance();
            ty = TypeRef {
                id: self.next_id(),
                kind: TypeRefKind::Array(Box::new(ty)),
                span: self.span_from(start),
            };
        }

        Ok(ty)
    }

    fn parse_path(&mut self) -> Result<Path, ParseError> {
        let first = self.expect_path_segment()?;
        let mut span = first.span;
        let mut segments = vec![first];

        while self.check(&TokenKind::ColonColon) && self.peek_is_path_segment(1) {
            self.advance();
            let seg = self.expect_path_segment()?;
            span = span.to(seg.span);
            segments.push(seg);
        }

        Ok(Path { segments, span })
    }

    fn peek_is_path_segment(&self, n: usize) -> bool {
        matches!(
            self.peek(n),
            TokenKind::Ident(_) | TokenKind::SelfLower | TokenKind::Super | TokenKind::Crate
        )
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    /// Parse `{ stmt* tail? }`, recovering from errors statement by statement.
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.expect(&TokenKind::LBrace)?.span.start;
        let (stmts, tail) = self.with_brace_expr(true, |p| p.parse_block_body());
        self.expect(&TokenKind::RBrace)?;
        Ok(Block { id: self.next_id(), stmts, tail, span: self.span_from(start) })
    }

    fn parse_block_body(&mut self) -> (Vec<Stmt>, Option<Box<Expr>>) {
        let mut stmts = Vec::new();
        let mut tail = None;

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            match self.parse_stmt() {
                Ok(StmtOrTail::Stmt(stmt)) => stmts.push(stmt),
                Ok(StmtOrTail::Tail(expr)) => tail = Some(Box::new(expr)),
                Ok(StmtOrTail::Empty) => {}
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize_in_block();
                }
            }
        }

        (stmts, tail)
    }

    fn parse_stmt(&mut self) -> Result<StmtOrTail, ParseError> {
        let start = self.current().span.start;

        match self.current_kind() {
            TokenKind::Semi => {
                self.advance();
                Ok(StmtOrTail::Empty)
            }
            TokenKind::Let | TokenKind::Const => {
                let is_const = self.check(&TokenKind::Const);
                self.advance();
                let name = self.expect_ident()?;
                let ty = if self.match_token(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
                self.expect(&TokenKind::Eq)?;
                let init = self.parse_expr()?;
                self.expect(&TokenKind::Semi)?;

                let kind = if is_const {
                    StmtKind::Const { name, ty, init }
                } else {
                    StmtKind::Let { name, ty, init }
                };
                Ok(StmtOrTail::Stmt(Stmt { id: self.next_id(), kind, span: self.span_from(start) }))
            }
            TokenKind::Fn | TokenKind::Struct | TokenKind::Enum => {
                let item = self.parse_item()?;
                let span = item.span;
                Ok(StmtOrTail::Stmt(Stmt { id: self.next_id(), kind: StmtKind::Item(Box::new(item)), span }))
            }
            TokenKind::Pub => Err(ParseError::new("items inside a block cannot be `pub`", self.current().span)
                .with_hint("a nested item is only visible inside its block; remove `pub`")),
            TokenKind::Mod | TokenKind::Use => Err(ParseError::new(
                format!("{} items are only allowed at module level", self.current_kind().display_name()),
                self.current().span,
            )
            .with_hint("move this item out of the function body")),
            _ => {
                let block_like = matches!(
                    self.current_kind(),
                    TokenKind::If | TokenKind::Match | TokenKind::Loop | TokenKind::While
                        | TokenKind::For | TokenKind::LBrace
                );

                // Binary operators do not continue a block-like statement.
                let expr = if block_like { self.parse_prefix()? } else { self.parse_expr()? };

                if self.match_token(&TokenKind::Semi) {
                    let span = self.span_from(start);
                    return Ok(StmtOrTail::Stmt(Stmt { id: self.next_id(), kind: StmtKind::Semi(expr), span }));
                }
                if self.check(&TokenKind::RBrace) {
                    return Ok(StmtOrTail::Tail(expr));
                }
                if block_like && expr.kind.is_block_like() {
                    let span = expr.span;
                    return Ok(StmtOrTail::Stmt(Stmt { id: self.next_id(), kind: StmtKind::Expr(expr), span }));
                }
                Err(self.unexpected("';'"))
            }
        }
    }

    // =========================================================================
    // Expression Parsing (Pratt)
    // =========================================================================

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let lhs = self.parse_prefix()?;
        self.continue_expr(lhs, min_bp)
    }

    fn continue_expr(&mut self, mut lhs: Expr, min_bp: u8) -> Result<Expr, ParseError> {
        loop {
            let start = lhs.span.start;

            if min_bp <= POSTFIX_BP {
                match self.current_kind() {
                    TokenKind::LParen => {
                        self.advance();
                        let args = self.with_brace_expr(true, |p| p.parse_comma_list(&TokenKind::RParen))?;
                        self.expect(&TokenKind::RParen)?;
                        lhs = Expr {
                            id: self.next_id(),
                            kind: ExprKind::Call { func: Box::new(lhs), args },
                            span: self.span_from(start),
                        };
                        continue;
                    }
                    TokenKind::LBracket => {
                        self.advance();
                        let index = self.with_brace_expr(true, |p| p.parse_expr())?;
                        self.expect(&TokenKind::RBracket)?;
                        lhs = Expr {
                            id: self.next_id(),
                            kind: ExprKind::Index { object: Box::new(lhs), index: Box::new(index) },
                            span: self.span_from(start),
                        };
                        continue;
                    }
                    TokenKind::Dot => {
                        self.advance();
                        lhs = self.parse_field_access(lhs)?;
                        continue;
                    }
                    _ => {}
                }
            }

            if let Some(assign_op) = assign_op(self.current_kind()) {
                let (l_bp, r_bp) = (2, 1);
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let value = self.parse_expr_bp(r_bp)?;
                let kind = match assign_op {
                    None => ExprKind::Assign { target: Box::new(lhs), value: Box::new(value) },
                    Some(op) => ExprKind::AssignOp { op, target: Box::new(lhs), value: Box::new(value) },
                };
                lhs = Expr { id: self.next_id(), kind, span: self.span_from(start) };
                continue;
            }

            if self.check(&TokenKind::DotDot) {
                let (l_bp, r_bp) = (3, 4);
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let end = if self.at_expr_start() { Some(Box::new(self.parse_expr_bp(r_bp)?)) } else { None };
                lhs = Expr {
                    id: self.next_id(),
                    kind: ExprKind::Range { start: Some(Box::new(lhs)), end },
                    span: self.span_from(start),
                };
                continue;
            }

            let Some((op, l_bp, r_bp)) = infix_binding_power(self.current_kind()) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr_bp(r_bp)?;
            lhs = Expr {
                id: self.next_id(),
                kind: ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) },
                span: self.span_from(start),
            };
        }

        Ok(lhs)
    }

    /// After `.`: a field name or a tuple index. `p.0.1` lexes the indices
    /// as one float, which is split back into two accesses here.
    fn parse_field_access(&mut self, object: Expr) -> Result<Expr, ParseError> {
        let start = object.span.start;
        let tok = self.current().clone();

        match &tok.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr {
                    id: self.next_id(),
                    kind: ExprKind::Field {
                        object: Box::new(object),
                        field: FieldName::Named(name.clone()),
                        field_span: tok.span,
                    },
                    span: self.span_from(start),
                })
            }
            TokenKind::Int(n) if *n >= 0 && tok.lexeme.bytes().all(|b| b.is_ascii_digit()) => {
                self.advance();
                Ok(Expr {
                    id: self.next_id(),
                    kind: ExprKind::Field {
                        object: Box::new(object),
                        field: FieldName::Index(*n as usize),
                        field_span: tok.span,
                    },
                    span: self.span_from(start),
                })
            }
            TokenKind::Float(_) => {
                let parts = tok.lexeme.split_once('.').and_then(|(a, b)| {
                    Some((a.parse::<usize>().ok()?, b.parse::<usize>().ok()?, a.len()))
                });
                let Some((first, second, first_len)) = parts else {
                    return Err(ParseError::new(
                        format!("invalid tuple index '{}'", tok.lexeme),
                        tok.span,
                    ));
                };
                self.advance();
                let first_span = Span::new(tok.span.start, tok.span.start + first_len);
                let second_span = Span::new(tok.span.start + first_len + 1, tok.span.end);
                let inner = Expr {
                    id: self.next_id(),
                    kind: ExprKind::Field {
                        object: Box::new(object),
                        field: FieldName::Index(first),
                        field_span: first_span,
                    },
                    span: Span::new(start, first_span.end),
                };
                Ok(Expr {
                    id: self.next_id(),
                    kind: ExprKind::Field {
                        object: Box::new(inner),
                        field: FieldName::Index(second),
                        field_span: second_span,
                    },
                    span: self.span_from(start),
                })
            }
            _ => Err(self.unexpected("field name")),
        }
    }

    fn parse_comma_list(&mut self, close: &TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        while !self.check(close) && !self.at_end() {
            items.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// Whether the current token can begin an expression. Used for the
    /// optional operands of `return` and `..`.
    fn at_expr_start(&self) -> bool {
        match self.current_kind() {
            TokenKind::LBrace => self.allow_brace_expr,
            TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::String(_) | TokenKind::Bool(_)
            | TokenKind::Ident(_) | TokenKind::SelfLower | TokenKind::Super | TokenKind::Crate
            | TokenKind::LParen | TokenKind::LBracket | TokenKind::Minus | TokenKind::Bang
            | TokenKind::Tilde | TokenKind::If | TokenKind::Match | TokenKind::Loop
            | TokenKind::While | TokenKind::For | TokenKind::Return | TokenKind::Break
            | TokenKind::Continue => true,
            _ => false,
        }
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind().clone() {
            TokenKind::Int(n) if n < 0 => return Err(self.int_too_large()),
            TokenKind::Int(n) => {
                self.advance();
                ExprKind::Int(n)
            }
            TokenKind::Float(x) => {
                self.advance();
                ExprKind::Float(x)
            }
            TokenKind::String(s) => {
                self.advance();
                ExprKind::String(s)
            }
            TokenKind::Bool(b) => {
                self.advance();
                ExprKind::Bool(b)
            }
            TokenKind::Ident(_) | TokenKind::SelfLower | TokenKind::Super | TokenKind::Crate => {
                let path = self.parse_path()?;
                if self.allow_brace_expr && self.check(&TokenKind::LBrace) && self.looks_like_struct_body() {
                    self.parse_struct_literal(path)?
                } else {
                    ExprKind::Path(path)
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.with_brace_expr(true, |p| p.parse_expr())?;
                self.expect(&TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::LBracket => {
                self.advance();
                let elems = self.with_brace_expr(true, |p| p.parse_comma_list(&TokenKind::RBracket))?;
                self.expect(&TokenKind::RBracket)?;
                ExprKind::Array(elems)
            }
            TokenKind::LBrace => ExprKind::Block(self.parse_block()?),
            TokenKind::Minus if self.peek(1) == &TokenKind::Int(i64::MIN) => {
                self.advance();
                self.advance();
                ExprKind::Int(i64::MIN)
            }
            TokenKind::Minus | TokenKind::Bang | TokenKind::Tilde => {
                let op = match self.advance().kind {
                    TokenKind::Minus => UnaryOp::Neg,
                    TokenKind::Bang => UnaryOp::Not,
                    _ => UnaryOp::BitNot,
                };
                let operand = self.parse_expr_bp(PREFIX_BP)?;
                ExprKind::Unary { op, operand: Box::new(operand) }
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::Match => {
                self.advance();
                let scrutinee = self.with_brace_expr(false, |p| p.parse_expr())?;
                self.expect(&TokenKind::LBrace)?;
                let arms = self.with_brace_expr(true, |p| p.parse_match_arms())?;
                self.expect(&TokenKind::RBrace)?;
                ExprKind::Match { scrutinee: Box::new(scrutinee), arms }
            }
            TokenKind::Loop => {
                self.advance();
                ExprKind::Loop(self.parse_block()?)
            }
            TokenKind::While => {
                self.advance();
                let cond = self.with_brace_expr(false, |p| p.parse_expr())?;
                let body = self.parse_block()?;
                ExprKind::While { cond: Box::new(cond), body }
            }
            TokenKind::For => {
                self.advance();
                let binding = self.expect_ident()?;
                self.expect(&TokenKind::In)?;
                let iter = self.with_brace_expr(false, |p| p.parse_expr())?;
                let body = self.parse_block()?;
                ExprKind::For { binding, iter: Box::new(iter), body }
            }
            TokenKind::DotDot => {
                self.advance();
                let end = if self.at_expr_start() { Some(Box::new(self.parse_expr_bp(4)?)) } else { None };
                ExprKind::Range { start: None, end }
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.at_expr_start() { Some(Box::new(self.parse_expr()?)) } else { None };
                ExprKind::Return(value)
            }
            TokenKind::Break => {
                self.advance();
                ExprKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                ExprKind::Continue
            }
            _ => return Err(self.unexpected("expression")),
        };

        Ok(Expr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// `Name { }`, `Name { x`, followed by `:`, `,` or `}`.
    fn looks_like_struct_body(&self) -> bool {
        match self.peek(1) {
            TokenKind::RBrace => true,
            TokenKind::Ident(_) => {
                matches!(self.peek(2), TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace)
            }
            _ => false,
        }
    }

    fn parse_struct_literal(&mut self, path: Path) -> Result<ExprKind, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();

        self.with_brace_expr(true, |p| -> Result<(), ParseError> {
            while !p.check(&TokenKind::RBrace) && !p.at_end() {
                let name = p.expect_ident()?;
                let (value, shorthand) = if p.match_token(&TokenKind::Colon) {
                    (p.parse_expr()?, false)
                } else {
                    let path = Path::single(name.clone());
                    (Expr { id: p.next_id(), kind: ExprKind::Path(path), span: name.span }, true)
                };
                fields.push(FieldInit { name, value, shorthand });
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            Ok(())
        })?;

        self.expect(&TokenKind::RBrace)?;
        Ok(ExprKind::StructLit { path, fields })
    }

    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::If)?.span.start;
        let cond = self.with_brace_expr(false, |p| p.parse_expr())?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                let block_start = self.current().span.start;
                let block = self.parse_block()?;
                Some(Box::new(Expr {
                    id: self.next_id(),
                    kind: ExprKind::Block(block),
                    span: self.span_from(block_start),
                }))
            }
        } else {
            None
        };

        Ok(Expr {
            id: self.next_id(),
            kind: ExprKind::If { cond: Box::new(cond), then_branch, else_branch },
            span: self.span_from(start),
        })
    }

    fn parse_match_arms(&mut self) -> Result<Vec<MatchArm>, ParseError> {
        let mut arms = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let start = self.current().span.start;
            let pattern = self.parse_pattern()?;
            self.expect(&TokenKind::FatArrow)?;
            let body = self.parse_expr()?;
            let needs_comma = !body.kind.is_block_like();

            arms.push(MatchArm {
                id: self.next_id(),
                pattern,
                body: Box::new(body),
                span: self.span_from(start),
            });

            if !self.match_token(&TokenKind::Comma) && needs_comma && !self.check(&TokenKind::RBrace) {
                return Err(self
                    .unexpected("',' or '}'")
                    .with_hint("separate match arms with ','"));
            }
        }

        Ok(arms)
    }

    // =========================================================================
    // Pattern Parsing
    // =========================================================================

    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.current().span.start;
        let first = self.parse_single_pattern()?;

        if !self.check(&TokenKind::Pipe) {
            return Ok(first);
        }

        let mut alts = vec![first];
        while self.match_token(&TokenKind::Pipe) {
            alts.push(self.parse_single_pattern()?);
        }
        Ok(Pattern { id: self.next_id(), kind: PatternKind::Or(alts), span: self.span_from(start) })
    }

    fn parse_single_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind().clone() {
            TokenKind::Underscore => {
                self.advance();
                PatternKind::Wildcard
            }
            TokenKind::Int(n) if n < 0 => return Err(self.int_too_large()),
            TokenKind::Int(n) => {
                self.advance();
                PatternKind::Literal(Literal::Int(n))
            }
            TokenKind::Float(x) => {
                self.advance();
                PatternKind::Literal(Literal::Float(x))
            }
            TokenKind::String(s) => {
                self.advance();
                PatternKind::Literal(Literal::Str(s))
            }
            TokenKind::Bool(b) => {
                self.advance();
                PatternKind::Literal(Literal::Bool(b))
            }
            TokenKind::Minus => {
                self.advance();
                match self.current_kind().clone() {
                    TokenKind::Int(n) => {
                        self.advance();
                        PatternKind::Literal(Literal::Int(n.wrapping_neg()))
                    }
                    TokenKind::Float(x) => {
                        self.advance();
                        PatternKind::Literal(Literal::Float(-x))
                    }
                    _ => return Err(self.unexpected("number")),
                }
            }
            TokenKind::Ident(_) | TokenKind::SelfLower | TokenKind::Super | TokenKind::Crate => {
                let path = self.parse_path()?;
                if self.match_token(&TokenKind::LParen) {
                    let mut fields = Vec::new();
                    while !self.check(&TokenKind::RParen) && !self.at_end() {
                        fields.push(self.parse_pattern()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RParen)?;
                    PatternKind::TupleStruct { path, fields }
                } else if self.check(&TokenKind::LBrace) {
                    self.parse_struct_pattern(path)?
                } else if let Some(name) = path.as_single() {
                    PatternKind::Binding(name.to_string())
                } else {
                    PatternKind::Path(path)
                }
            }
            _ => return Err(self.unexpected("pattern")),
        };

        Ok(Pattern { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// `Path { a, b: pat, .. }`. The `..` must come last.
    fn parse_struct_pattern(&mut self, path: Path) -> Result<PatternKind, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        let mut rest = false;

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.match_token(&TokenKind::DotDot) {
                rest = true;
                break;
            }
            let name = self.expect_ident()?;
            let field = if self.match_token(&TokenKind::Colon) {
                FieldPattern { name, pattern: self.parse_pattern()?, shorthand: false }
            } else {
                let pattern = Pattern {
                    id: self.next_id(),
                    kind: PatternKind::Binding(name.name.clone()),
                    span: name.span,
                };
                FieldPattern { name, pattern, shorthand: true }
            };
            fields.push(field);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        if let Err(err) = self.expect(&TokenKind::RBrace) {
            return Err(if rest { err.with_hint("`..` must be the last entry of a struct pattern") } else { err });
        }
        Ok(PatternKind::Struct { path, fields, rest })
    }
}

enum StmtOrTail {
    Stmt(Stmt),
    Tail(Expr),
    Empty,
}

/// `=` maps to `Some(None)`, compound assignment to `Some(Some(op))`.
fn assign_op(kind: &TokenKind) -> Option<Option<BinOp>> {
    let op = match kind {
        TokenKind::Eq => return Some(None),
        TokenKind::PlusEq => BinOp::Add,
        TokenKind::MinusEq => BinOp::Sub,
        TokenKind::StarEq => BinOp::Mul,
        TokenKind::SlashEq => BinOp::Div,
        TokenKind::PercentEq => BinOp::Mod,
        TokenKind::AmpEq => BinOp::BitAnd,
        TokenKind::PipeEq => BinOp::BitOr,
        TokenKind::CaretEq => BinOp::BitXor,
        TokenKind::LtLtEq => BinOp::Shl,
        TokenKind::GtGtEq => BinOp::Shr,
        _ => return None,
    };
    Some(Some(op))
}

/// Binary operator and its (left, right) binding power.
fn infix_binding_power(kind: &TokenKind) -> Option<(BinOp, u8, u8)> {
    let entry = match kind {
        TokenKind::PipePipe => (BinOp::Or, 5, 6),
        TokenKind::AmpAmp => (BinOp::And, 7, 8),
        TokenKind::EqEq => (BinOp::Eq, 9, 10),
        TokenKind::BangEq => (BinOp::Ne, 9, 10),
        TokenKind::Lt => (BinOp::Lt, 11, 12),
        TokenKind::Gt => (BinOp::Gt, 11, 12),
        TokenKind::LtEq => (BinOp::Le, 11, 12),
        TokenKind::GtEq => (BinOp::Ge, 11, 12),
        TokenKind::Pipe => (BinOp::BitOr, 13, 14),
        TokenKind::Caret => (BinOp::BitXor, 15, 16),
        TokenKind::Amp => (BinOp::BitAnd, 17, 18),
        TokenKind::LtLt => (BinOp::Shl, 19, 20),
        TokenKind::GtGt => (BinOp::Shr, 19, 20),
        TokenKind::Plus => (BinOp::Add, 21, 22),
        TokenKind::Minus => (BinOp::Sub, 21, 22),
        TokenKind::Star => (BinOp::Mul, 23, 24),
        TokenKind::Slash => (BinOp::Div, 23, 24),
        TokenKind::Percent => (BinOp::Mod, 23, 24),
        _ => return None,
    };
    Some(entry)
}

/// Result of parsing: the module plus any errors found.
#[derive(Debug)]
pub struct ParseResult {
    pub module: Module,
    pub errors: Vec<ParseError>,
    /// First NodeId not used by this file.
    pub next_node_id: u32,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A parse error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: Span,
    pub kind: ParseErrorKind,
    pub message: String,
    /// What the parser was looking for, e.g. `';'` or `expression`.
    pub expected: Option<String>,
    /// What it found instead, e.g. `'}'` or `end of file`.
    pub found: Option<String>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Expected one thing, found another.
    Expected,
    /// A construct that is well-formed tokens but not allowed here.
    Invalid,
    /// Ran into an `Error` token. Never surfaced; the lexer already reported it.
    AfterLexError,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            span,
            kind: ParseErrorKind::Invalid,
            message: message.into(),
            expected: None,
            found: None,
            hint: None,
        }
    }

    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format_expected_message(expected, found);
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self {
            span,
            kind: ParseErrorKind::Expected,
            message,
            expected: Some(expected.to_string()),
            found: Some(found.display_name().to_string()),
            hint,
        }
    }

    fn after_lex_error(span: Span) -> Self {
        Self {
            span,
            kind: ParseErrorKind::AfterLexError,
            message: "invalid token".to_string(),
            expected: None,
            found: None,
            hint: None,
        }
    }

    fn with_expected(mut self, expected: &str, found: &TokenKind) -> Self {
        self.expected = Some(expected.to_string());
        self.found = Some(found.display_name().to_string());
        self
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match expected {
        "';'" => format!("expected ';' after statement, found {}", found.display_name()),
        "'{'" => format!("expected '{{' to start block, found {}", found.display_name()),
        "'}'" => format!("expected '}}' to close block, found {}", found.display_name()),
        "')'" if matches!(found, TokenKind::Eof) => "unclosed '(', missing ')'".to_string(),
        "']'" if matches!(found, TokenKind::Eof) => "unclosed '[', missing ']'".to_string(),
        "a name" => format!("expected name, found {}", found.display_name()),
        _ => format!("expected {}, found {}", expected, found.display_name()),
    }
}

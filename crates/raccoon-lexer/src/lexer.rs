// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use logos::Logos;
use raccoon_ast::token::{Token, TokenKind};
use raccoon_ast::{LineMap, Span};

/// State shared with logos callbacks.
#[derive(Debug, Default)]
struct LexExtras {
    /// Start offset of a block comment that ran off the end of input.
    unterminated_comment: Option<usize>,
}

/// Raw token type for logos - we parse values in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(extras = LexExtras)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // === Keywords ===
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("fn")]
    Fn,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("match")]
    Match,
    #[token("loop")]
    Loop,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("mod")]
    Mod,
    #[token("use")]
    Use,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("pub")]
    Pub,
    #[token("as")]
    As,
    #[token("self")]
    SelfLower,
    #[token("super")]
    Super,
    #[token("crate")]
    Crate,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Operators (order matters - longer first) ===
    // Three-character operators
    #[token("<<=")]
    LtLtEq,
    #[token(">>=")]
    GtGtEq,

    // Two-character operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("..")]
    DotDot,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("::")]
    ColonColon,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,

    // Single-character operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token(".")]
    Dot,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("_", priority = 3)]
    Underscore,

    // === Comments (skip them) ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    // Block comments - handled specially for nesting
    #[token("/*", block_comment)]
    BlockComment,

    // === Literals ===
    #[regex(r"0x[0-9a-fA-F_]+")]
    HexInt,

    #[regex(r"0b[01_]+")]
    BinInt,

    #[regex(r"0o[0-7_]+")]
    OctInt,

    // A decimal point is what makes a number a float
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    Float,

    #[regex(r"[0-9][0-9_]*")]
    DecInt,

    // Strings are single-line; escapes are validated in the second pass
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    // Same as above but never closed before the end of the line
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedString,

    // === Identifier (must come after keywords) ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Skip block comments, handling nesting.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let mut depth = 1;
    let remainder = lexer.remainder();
    let mut chars = remainder.chars().peekable();
    let mut consumed = 0;

    while depth > 0 {
        match chars.next() {
            Some('/') if chars.peek() == Some(&'*') => {
                chars.next();
                consumed += 2;
                depth += 1;
            }
            Some('*') if chars.peek() == Some(&'/') => {
                chars.next();
                consumed += 2;
                depth -= 1;
            }
            Some(c) => {
                consumed += c.len_utf8();
            }
            None => {
                lexer.extras.unterminated_comment = Some(lexer.span().start);
                break;
            }
        }
    }

    lexer.bump(consumed);
    logos::Skip
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for Raccoon source code.
///
/// A `Lexer` is an iterator over [`Token`]s. It yields exactly one
/// [`TokenKind::Eof`] token and then stops; [`Lexer::restart`] rewinds it to
/// the beginning of the source.
pub struct Lexer<'a> {
    source: &'a str,
    /// Global offset of the source's first byte (see `SourceMap`).
    base: usize,
    raw: logos::Lexer<'a, RawToken>,
    lines: LineMap,
    errors: Vec<LexError>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_base(source, 0)
    }

    /// Create a lexer whose spans start at `base` instead of 0.
    pub fn with_base(source: &'a str, base: usize) -> Self {
        Self {
            source,
            base,
            raw: RawToken::lexer(source),
            lines: LineMap::new(source),
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Rewind to the start of the source, dropping any errors seen so far.
    pub fn restart(&mut self) {
        self.raw = RawToken::lexer(self.source);
        self.errors.clear();
        self.finished = false;
    }

    /// Errors found so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let tokens: Vec<Token> = self.by_ref().collect();
        let errors = std::mem::take(&mut self.errors);
        tracing::debug!(tokens = tokens.len(), errors = errors.len(), "lexed source");
        LexResult { tokens, errors }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.base + start, self.base + end)
    }

    fn make_token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token {
            kind,
            lexeme: self.source[start..end].to_string(),
            span: self.span(start, end),
            pos: self.lines.position(self.source, start),
        }
    }

    fn eof(&mut self) -> Token {
        self.finished = true;
        let end = self.source.len();
        self.make_token(TokenKind::Eof, end, end)
    }

    fn push_error(&mut self, error: LexError) {
        self.errors.push(error);
    }

    /// Convert a raw logos token to our TokenKind, parsing literals.
    ///
    /// Invalid escapes are reported but still produce a string token.
    fn convert_token(&mut self, raw: RawToken, slice: &str, start: usize, end: usize) -> Result<TokenKind, LexError> {
        Ok(match raw {
            // Keywords
            RawToken::Let => TokenKind::Let,
            RawToken::Const => TokenKind::Const,
            RawToken::Fn => TokenKind::Fn,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::Match => TokenKind::Match,
            RawToken::Loop => TokenKind::Loop,
            RawToken::While => TokenKind::While,
            RawToken::For => TokenKind::For,
            RawToken::In => TokenKind::In,
            RawToken::Struct => TokenKind::Struct,
            RawToken::Enum => TokenKind::Enum,
            RawToken::Mod => TokenKind::Mod,
            RawToken::Use => TokenKind::Use,
            RawToken::Return => TokenKind::Return,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Pub => TokenKind::Pub,
            RawToken::As => TokenKind::As,
            RawToken::SelfLower => TokenKind::SelfLower,
            RawToken::Super => TokenKind::Super,
            RawToken::Crate => TokenKind::Crate,
            RawToken::True => TokenKind::Bool(true),
            RawToken::False => TokenKind::Bool(false),

            // Operators
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Eq => TokenKind::Eq,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::LtLt => TokenKind::LtLt,
            RawToken::GtGt => TokenKind::GtGt,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::AmpEq => TokenKind::AmpEq,
            RawToken::PipeEq => TokenKind::PipeEq,
            RawToken::CaretEq => TokenKind::CaretEq,
            RawToken::LtLtEq => TokenKind::LtLtEq,
            RawToken::GtGtEq => TokenKind::GtGtEq,
            RawToken::DotDot => TokenKind::DotDot,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::FatArrow => TokenKind::FatArrow,
            RawToken::ColonColon => TokenKind::ColonColon,

            // Delimiters
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Underscore => TokenKind::Underscore,

            // Literals - parse the values
            RawToken::DecInt => {
                let cleaned: String = slice.chars().filter(|c| *c != '_').collect();
                let magnitude = cleaned.parse::<u64>().map_err(|_| LexError::invalid_number(self.span(start, end)))?;
                TokenKind::Int(self.int_value(magnitude, start, end)?)
            }
            RawToken::HexInt => TokenKind::Int(self.parse_radix(slice, 16, start, end)?),
            RawToken::BinInt => TokenKind::Int(self.parse_radix(slice, 2, start, end)?),
            RawToken::OctInt => TokenKind::Int(self.parse_radix(slice, 8, start, end)?),
            RawToken::Float => {
                let cleaned: String = slice.chars().filter(|c| *c != '_').collect();
                let value = cleaned.parse::<f64>().map_err(|_| LexError::invalid_number(self.span(start, end)))?;
                TokenKind::Float(value)
            }
            RawToken::String => {
                let inner = &slice[1..slice.len() - 1]; // Remove quotes
                let (value, errors) = parse_string(inner, self.base + start + 1);
                for e in errors {
                    self.push_error(e);
                }
                TokenKind::String(value)
            }
            RawToken::UnterminatedString => {
                return Err(LexError::unterminated_string(self.span(start, end)));
            }
            RawToken::Ident => TokenKind::Ident(slice.to_string()),

            // These are skipped by logos, but we list them for completeness
            RawToken::LineComment | RawToken::BlockComment => TokenKind::Error,
        })
    }

    fn parse_radix(&self, slice: &str, radix: u32, start: usize, end: usize) -> Result<i64, LexError> {
        let cleaned: String = slice[2..].chars().filter(|c| *c != '_').collect();
        let magnitude =
            u64::from_str_radix(&cleaned, radix).map_err(|_| LexError::invalid_number(self.span(start, end)))?;
        self.int_value(magnitude, start, end)
    }

    /// Literals are unsigned. `2^63` is kept as `i64::MIN` so that `-9223372036854775808`
    /// can be written; the parser rejects it anywhere but directly after `-`.
    fn int_value(&self, magnitude: u64, start: usize, end: usize) -> Result<i64, LexError> {
        match i64::try_from(magnitude) {
            Ok(value) => Ok(value),
            Err(_) if magnitude == i64::MIN.unsigned_abs() => Ok(i64::MIN),
            Err(_) => Err(LexError::invalid_number(self.span(start, end))),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        // Stop if we have too many errors
        if self.errors.len() >= MAX_ERRORS {
            return Some(self.eof());
        }

        let next = self.raw.next();
        if let Some(start) = self.raw.extras.unterminated_comment.take() {
            let end = self.source.len();
            self.push_error(LexError::unterminated_comment(self.span(start, end)));
        }

        let Some(result) = next else {
            return Some(self.eof());
        };

        let range = self.raw.span();
        let slice = self.raw.slice();

        let kind = match result {
            Ok(raw) => match self.convert_token(raw, slice, range.start, range.end) {
                Ok(kind) => kind,
                Err(e) => {
                    // The bad region becomes an Error token so the parser
                    // can abandon the statement without reporting again.
                    self.push_error(e);
                    TokenKind::Error
                }
            },
            Err(()) => {
                let ch = self.source[range.start..].chars().next().unwrap_or('?');
                let span = self.span(range.start, range.start + ch.len_utf8());
                self.push_error(LexError::unexpected_char(ch, span));
                TokenKind::Error
            }
        };

        Some(self.make_token(kind, range.start, range.end))
    }
}

/// Parse the body of a string literal, resolving escape sequences.
///
/// `base` is the global offset of the first character after the quote.
/// Invalid escapes are dropped from the value and reported.
fn parse_string(s: &str, base: usize) -> (String, Vec<LexError>) {
    let mut result = String::new();
    let mut errors = Vec::new();
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match parse_escape(&mut chars) {
            Ok(ch) => result.push(ch),
            Err(end) => {
                let end = end.unwrap_or(s.len());
                errors.push(LexError::invalid_escape(Span::new(base + i, base + end)));
            }
        }
    }

    (result, errors)
}

/// Parse an escape sequence after the backslash.
///
/// On failure returns the local offset where the bad escape ends, if known.
fn parse_escape(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> Result<char, Option<usize>> {
    let Some((i, c)) = chars.next() else {
        return Err(None);
    };
    let after = i + c.len_utf8();
    match c {
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        't' => Ok('\t'),
        '\\' => Ok('\\'),
        '0' => Ok('\0'),
        '\'' => Ok('\''),
        '"' => Ok('"'),
        'u' => parse_unicode_escape(chars, after),
        _ => Err(Some(after)),
    }
}

/// Parse a Unicode escape sequence: \u{XXXX} (1-6 hex digits).
fn parse_unicode_escape(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>, after_u: usize) -> Result<char, Option<usize>> {
    // Expect opening brace
    match chars.peek() {
        Some((_, '{')) => {
            chars.next();
        }
        _ => return Err(Some(after_u)),
    }

    let mut hex = String::new();
    let end = loop {
        match chars.next() {
            Some((i, '}')) => break i + 1,
            Some((_, c)) if c.is_ascii_hexdigit() && hex.len() < 6 => hex.push(c),
            Some((i, c)) => return Err(Some(i + c.len_utf8())),
            None => return Err(None),
        }
    };

    if hex.is_empty() {
        return Err(Some(end));
    }

    let code_point = u32::from_str_radix(&hex, 16).map_err(|_| Some(end))?;
    char::from_u32(code_point).ok_or(Some(end))
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
    pub message: String,
    pub hint: Option<String>,
}

/// What went wrong while lexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedChar,
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape,
    InvalidNumber,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

impl LexError {
    fn unexpected_char(ch: char, span: Span) -> Self {
        Self {
            span,
            kind: LexErrorKind::UnexpectedChar,
            message: format!("unexpected character '{}'", ch.escape_debug()),
            hint: None,
        }
    }

    fn unterminated_string(span: Span) -> Self {
        Self {
            span,
            kind: LexErrorKind::UnterminatedString,
            message: "unterminated string literal".to_string(),
            hint: Some("add a closing '\"' before the end of the line".to_string()),
        }
    }

    fn unterminated_comment(span: Span) -> Self {
        Self {
            span,
            kind: LexErrorKind::UnterminatedComment,
            message: "unterminated block comment".to_string(),
            hint: Some("block comments nest; every '/*' needs its own '*/'".to_string()),
        }
    }

    fn invalid_escape(span: Span) -> Self {
        Self {
            span,
            kind: LexErrorKind::InvalidEscape,
            message: "invalid escape sequence".to_string(),
            hint: Some("valid: \\n \\r \\t \\\\ \\0 \\' \\\" \\u{...}".to_string()),
        }
    }

    fn invalid_number(span: Span) -> Self {
        Self {
            span,
            kind: LexErrorKind::InvalidNumber,
            message: "invalid number literal".to_string(),
            hint: Some("integers must fit in 64 bits".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let result = Lexer::new(src).tokenize();
        assert!(result.is_ok(), "Lex errors: {:?}", result.errors);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("let const fn lettuce _ _x"),
            vec![
                TokenKind::Let,
                TokenKind::Const,
                TokenKind::Fn,
                TokenKind::Ident("lettuce".into()),
                TokenKind::Underscore,
                TokenKind::Ident("_x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_by_decimal_point() {
        assert_eq!(
            kinds("2 2.0 1_000 0xff 0b101 0o17 1.5e3"),
            vec![
                TokenKind::Int(2),
                TokenKind::Float(2.0),
                TokenKind::Int(1000),
                TokenKind::Int(255),
                TokenKind::Int(5),
                TokenKind::Int(15),
                TokenKind::Float(1500.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn range_is_not_a_float() {
        assert_eq!(
            kinds("0..10"),
            vec![TokenKind::Int(0), TokenKind::DotDot, TokenKind::Int(10), TokenKind::Eof]
        );
    }

    #[test]
    fn multi_char_operators() {
        assert_eq!(
            kinds("== != >= <= && || += <<= >> :: -> => .."),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::GtEq,
                TokenKind::LtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::PlusEq,
                TokenKind::LtLtEq,
                TokenKind::GtGt,
                TokenKind::ColonColon,
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::DotDot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\tb\n\"q\" \u{41}""#),
            vec![TokenKind::String("a\tb\n\"q\" A".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn invalid_escape_keeps_string() {
        let result = Lexer::new(r#""a\qb""#).tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::InvalidEscape);
        assert_eq!(result.errors[0].span, Span::new(2, 4));
        assert_eq!(result.tokens[0].kind, TokenKind::String("ab".into()));
    }

    #[test]
    fn comments_are_skipped_and_nest() {
        assert_eq!(
            kinds("a // line\n/* outer /* inner */ still */ b"),
            vec![TokenKind::Ident("a".into()), TokenKind::Ident("b".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn positions_survive_comments() {
        let result = Lexer::new("/* x\n y */ let\n  z").tokenize();
        assert!(result.is_ok());
        let let_tok = &result.tokens[0];
        assert_eq!(let_tok.kind, TokenKind::Let);
        assert_eq!((let_tok.pos.line, let_tok.pos.column), (2, 7));
        assert_eq!(let_tok.pos.offset, 11);
        let z = &result.tokens[1];
        assert_eq!((z.pos.line, z.pos.column), (3, 3));
        assert_eq!(z.lexeme, "z");
    }

    #[test]
    fn unterminated_string_is_one_error() {
        let src = "let s = \"abc;\nlet t = 1;";
        let result = Lexer::new(src).tokenize();
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.span.start, 8);
        assert_eq!(err.span.end, 13);
        // The rest of the file still lexes
        let idents: Vec<_> = result
            .tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Ident(n) => Some(n.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(idents, vec!["s", "t"]);
        assert!(result.tokens.iter().any(|t| t.kind == TokenKind::Error));
    }

    #[test]
    fn unterminated_block_comment() {
        let result = Lexer::new("a /* never closed").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::UnterminatedComment);
        assert_eq!(result.errors[0].span, Span::new(2, 17));
        assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
    }

    #[test]
    fn unexpected_character() {
        let result = Lexer::new("let $x = 1;").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::UnexpectedChar);
        assert_eq!(result.errors[0].span, Span::new(4, 5));
        assert_eq!(result.tokens[1].kind, TokenKind::Error);
    }

    #[test]
    fn integer_overflow() {
        let result = Lexer::new("99999999999999999999").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::InvalidNumber);
    }

    #[test]
    fn min_int_magnitude_lexes() {
        assert_eq!(kinds("9223372036854775808"), vec![TokenKind::Int(i64::MIN), TokenKind::Eof]);
        assert_eq!(kinds("0x8000000000000000"), vec![TokenKind::Int(i64::MIN), TokenKind::Eof]);
        let result = Lexer::new("9223372036854775809").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::InvalidNumber);
    }

    #[test]
    fn lazy_and_restartable() {
        let mut lexer = Lexer::new("a b");
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Ident("a".into())));
        lexer.restart();
        let all: Vec<_> = lexer.by_ref().map(|t| t.kind).collect();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2], TokenKind::Eof);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn base_offset_shifts_spans() {
        let result = Lexer::with_base("x", 100).tokenize();
        assert_eq!(result.tokens[0].span, Span::new(100, 101));
        assert_eq!(result.tokens[0].pos.offset, 0);
    }

    #[test]
    fn error_cap() {
        let src = "$".repeat(50);
        let result = Lexer::new(&src).tokenize();
        assert_eq!(result.errors.len(), MAX_ERRORS);
        assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::{Position, Span};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub lexeme: String,
    pub span: Span,
    /// Where the token starts (line, column, byte offset).
    pub pos: Position,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),

    // Identifier
    Ident(String),

    // Keywords
    Let,
    Const,
    Fn,
    If,
    Else,
    Match,
    Loop,
    While,
    For,
    In,
    Struct,
    Enum,
    Mod,
    Use,
    Return,
    Break,
    Continue,
    Pub,
    As,
    SelfLower,
    Super,
    Crate,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    LtLt,
    GtGt,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LtLtEq,
    GtGtEq,
    DotDot,
    Dot,
    Arrow,
    FatArrow,
    ColonColon,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semi,
    Comma,
    Underscore,

    // Special
    /// A region the lexer could not tokenize. Already reported as a LexError.
    Error,
    Eof,
}

impl TokenKind {
    /// Whether this token starts an item at module level.
    pub fn starts_item(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn | TokenKind::Struct | TokenKind::Enum | TokenKind::Const
                | TokenKind::Mod | TokenKind::Use | TokenKind::Pub
        )
    }

    /// Whether this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Let | TokenKind::Const | TokenKind::Fn | TokenKind::If
                | TokenKind::Else | TokenKind::Match | TokenKind::Loop | TokenKind::While
                | TokenKind::For | TokenKind::In | TokenKind::Struct | TokenKind::Enum
                | TokenKind::Mod | TokenKind::Use | TokenKind::Return | TokenKind::Break
                | TokenKind::Continue | TokenKind::Pub | TokenKind::As | TokenKind::SelfLower
                | TokenKind::Super | TokenKind::Crate | TokenKind::Bool(_)
        )
    }

    /// Short category name used by `raccoon lex`.
    pub fn category(&self) -> &'static str {
        match self {
            TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::String(_) | TokenKind::Bool(_) => "literal",
            TokenKind::Ident(_) => "ident",
            TokenKind::Eof => "eof",
            TokenKind::Error => "error",
            k if k.is_keyword() => "keyword",
            TokenKind::LBrace | TokenKind::RBrace | TokenKind::LParen | TokenKind::RParen
            | TokenKind::LBracket | TokenKind::RBracket | TokenKind::Colon | TokenKind::Semi
            | TokenKind::Comma | TokenKind::Underscore => "punct",
            _ => "operator",
        }
    }

    /// Get a human-readable name for this token kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            // Literals
            TokenKind::Int(_) => "integer",
            TokenKind::Float(_) => "float",
            TokenKind::String(_) => "string",
            TokenKind::Bool(_) => "boolean",
            TokenKind::Ident(_) => "identifier",

            // Keywords
            TokenKind::Let => "'let'",
            TokenKind::Const => "'const'",
            TokenKind::Fn => "'fn'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Match => "'match'",
            TokenKind::Loop => "'loop'",
            TokenKind::While => "'while'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::Struct => "'struct'",
            TokenKind::Enum => "'enum'",
            TokenKind::Mod => "'mod'",
            TokenKind::Use => "'use'",
            TokenKind::Return => "'return'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Pub => "'pub'",
            TokenKind::As => "'as'",
            TokenKind::SelfLower => "'self'",
            TokenKind::Super => "'super'",
            TokenKind::Crate => "'crate'",

            // Operators
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Tilde => "'~'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::LtLt => "'<<'",
            TokenKind::GtGt => "'>>'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::LtLtEq => "'<<='",
            TokenKind::GtGtEq => "'>>='",
            TokenKind::DotDot => "'..'",
            TokenKind::Dot => "'.'",
            TokenKind::Arrow => "'->'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::ColonColon => "'::'",

            // Delimiters
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",
            TokenKind::Underscore => "'_'",

            // Special
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }
}

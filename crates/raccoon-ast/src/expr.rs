// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use crate::stmt::Stmt;
use crate::{Ident, NodeId, Path, Span};

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    String(String),
    /// Boolean literal
    Bool(bool),
    /// Variable, item, or enum variant path
    Path(Path),
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `target = value`
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `target op= value`
    AssignOp {
        op: BinOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// Function call, tuple-struct or tuple-variant construction
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Field access (`p.x` or `p.0`)
    Field {
        object: Box<Expr>,
        field: FieldName,
        field_span: Span,
    },
    /// Index or slice access (`a[i]`, `a[i..j]`)
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// Struct literal (`Point { x: 1, y }`)
    StructLit {
        path: Path,
        fields: Vec<FieldInit>,
    },
    /// Array literal (`[1, 2, 3]`)
    Array(Vec<Expr>),
    /// Parenthesized expression
    Paren(Box<Expr>),
    /// Block expression
    Block(Block),
    /// If expression; `else_branch` is a block or another `if`
    If {
        cond: Box<Expr>,
        then_branch: Block,
        else_branch: Option<Box<Expr>>,
    },
    /// Match expression
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    /// Infinite loop
    Loop(Block),
    /// While loop
    While {
        cond: Box<Expr>,
        body: Block,
    },
    /// For-in loop
    For {
        binding: Ident,
        iter: Box<Expr>,
        body: Block,
    },
    /// Half-open range (`a..b`, `a..`, `..b`)
    Range {
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },
    /// `return` with an optional value
    Return(Option<Box<Expr>>),
    /// `break`
    Break,
    /// `continue`
    Continue,
}

impl ExprKind {
    /// Block-like expressions end a statement without a `;`.
    pub fn is_block_like(&self) -> bool {
        matches!(
            self,
            ExprKind::Block(_) | ExprKind::If { .. } | ExprKind::Match { .. }
                | ExprKind::Loop(_) | ExprKind::While { .. } | ExprKind::For { .. }
        )
    }
}

/// A braced sequence of statements with an optional tail expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
    /// Final expression without `;`; gives the block its value.
    pub tail: Option<Box<Expr>>,
    pub span: Span,
}

/// The field named in a field access.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldName {
    Named(String),
    /// Positional field of a tuple struct.
    Index(usize),
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldName::Named(name) => write!(f, "{}", name),
            FieldName::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A field initializer in a struct literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit {
    pub name: Ident,
    pub value: Expr,
    /// Written as `x` rather than `x: x`.
    pub shorthand: bool,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

/// Operator families used by the type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCategory {
    Arithmetic,
    Comparison,
    Logical,
    Bitwise,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }

    pub fn category(self) -> OpCategory {
        match self {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => OpCategory::Arithmetic,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => OpCategory::Comparison,
            BinOp::And | BinOp::Or => OpCategory::Logical,
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr => OpCategory::Bitwise,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
    /// Bitwise not (~)
    BitNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

/// A match arm.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub id: NodeId,
    pub pattern: Pattern,
    pub body: Box<Expr>,
    pub span: Span,
}

/// A pattern for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub id: NodeId,
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    /// Wildcard `_`
    Wildcard,
    /// Binding `name`
    Binding(String),
    /// Literal, possibly negative
    Literal(Literal),
    /// Unit variant or constant path `Color::Red`
    Path(Path),
    /// `Shape::Circle(r)` or `Point(x, y)`
    TupleStruct {
        path: Path,
        fields: Vec<Pattern>,
    },
    /// `Point { x, y: 0, .. }`; `rest` is set by a trailing `..`
    Struct {
        path: Path,
        fields: Vec<FieldPattern>,
        rest: bool,
    },
    /// Or pattern `a | b`
    Or(Vec<Pattern>),
}

/// One `name: pattern` entry of a struct pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPattern {
    pub name: Ident,
    pub pattern: Pattern,
    /// Written as `x`, binding the field to a local of the same name.
    pub shorthand: bool,
}

/// A literal value in a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

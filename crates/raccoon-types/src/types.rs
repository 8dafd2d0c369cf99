// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type definitions for the type system.

use std::fmt;

/// Unique identifier for user-defined types (structs and enums).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// A type in Raccoon.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Unit type `()`
    Unit,
    Int,
    Float,
    Bool,
    Str,
    /// `T[]`
    Array(Box<Type>),
    /// A struct or enum. Identity is the table entry; `name` is the
    /// qualified declared name, kept for messages.
    Named { id: TypeId, name: String },
    /// Functions and tuple constructors used as values.
    Fn { params: Vec<Type>, ret: Box<Type> },
    /// A half-open integer range; only valid as a `for` iterable or slice index.
    Range,
    /// The type of `return`, `break`, `continue` and endless loops.
    Never,
    /// Error placeholder for recovery. Compatible with everything.
    Error,
}

impl Type {
    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Type::Never)
    }

    /// Whether a value of type `found` may be used where `self` is expected.
    ///
    /// `Error` and `Never` fit anywhere. There are no implicit conversions;
    /// literal widening happens before this check.
    pub fn accepts(&self, found: &Type) -> bool {
        match (self, found) {
            (Type::Error, _) | (_, Type::Error) | (_, Type::Never) => true,
            (Type::Array(a), Type::Array(b)) => a.accepts(b),
            (Type::Fn { params: pa, ret: ra }, Type::Fn { params: pb, ret: rb }) => {
                pa.len() == pb.len() && pa.iter().zip(pb).all(|(a, b)| a == b) && ra.accepts(rb)
            }
            (Type::Named { id: a, .. }, Type::Named { id: b, .. }) => a == b,
            (a, b) => a == b,
        }
    }

    /// Whether this type still contains an error placeholder.
    pub fn contains_error(&self) -> bool {
        match self {
            Type::Error => true,
            Type::Array(elem) => elem.contains_error(),
            Type::Fn { params, ret } => params.iter().any(Type::contains_error) || ret.contains_error(),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unit => write!(f, "()"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::Str => write!(f, "str"),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Named { name, .. } => write!(f, "{}", name),
            Type::Fn { params, ret } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Range => write!(f, "range"),
            Type::Never => write!(f, "!"),
            Type::Error => write!(f, "<error>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_source_syntax() {
        assert_eq!(Type::array(Type::array(Type::Int)).to_string(), "int[][]");
        let f = Type::Fn { params: vec![Type::Int, Type::Str], ret: Box::new(Type::Unit) };
        assert_eq!(f.to_string(), "fn(int, str) -> ()");
        let named = Type::Named { id: TypeId(0), name: "geo::Point".to_string() };
        assert_eq!(named.to_string(), "geo::Point");
    }

    #[test]
    fn never_and_error_fit_anywhere() {
        assert!(Type::Int.accepts(&Type::Never));
        assert!(Type::Int.accepts(&Type::Error));
        assert!(Type::Error.accepts(&Type::Str));
        assert!(!Type::Float.accepts(&Type::Int));
        assert!(Type::array(Type::Int).accepts(&Type::array(Type::Error)));
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes to titles and categories. Lexer codes are E00xx, parser
//! E01xx, resolver E02xx, type checker E03xx (warnings W03xx) and loader E04xx.

use std::collections::BTreeMap;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: BTreeMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
#[derive(Debug)]
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

/// Error category for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Resolution,
    Type,
    Load,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Lexical => write!(f, "Lexical"),
            ErrorCategory::Syntax => write!(f, "Syntax"),
            ErrorCategory::Resolution => write!(f, "Resolution"),
            ErrorCategory::Type => write!(f, "Type"),
            ErrorCategory::Load => write!(f, "Load"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = BTreeMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lexer errors (E00xx)
                "E0001" => ("unexpected character", Lexical),
                "E0002" => ("unterminated string literal", Lexical),
                "E0003" => ("unterminated block comment", Lexical),
                "E0004" => ("invalid escape sequence", Lexical),
                "E0005" => ("invalid number literal", Lexical),

                // Parser errors (E01xx)
                "E0100" => ("unexpected token", Syntax),
                "E0101" => ("invalid syntax", Syntax),

                // Resolver errors (E02xx)
                "E0200" => ("undefined name", Resolution),
                "E0201" => ("undefined type", Resolution),
                "E0202" => ("undefined enum variant", Resolution),
                "E0203" => ("duplicate definition", Resolution),
                "E0204" => ("item is private", Resolution),
                "E0205" => ("not a module or enum", Resolution),
                "E0206" => ("not a type", Resolution),
                "E0207" => ("unresolved import", Resolution),
                "E0208" => ("import cycle", Resolution),
                "E0209" => ("too many `super` segments", Resolution),
                "E0210" => ("binding inside an or-pattern", Resolution),
                "E0211" => ("`break` outside of a loop", Resolution),
                "E0212" => ("`continue` outside of a loop", Resolution),
                "E0213" => ("`return` outside of a function", Resolution),

                // Type errors (E03xx)
                "E0301" => ("mismatched types", Type),
                "E0302" => ("wrong number of arguments", Type),
                "E0303" => ("type is not callable", Type),
                "E0304" => ("no such field", Type),
                "E0305" => ("duplicate field in struct literal", Type),
                "E0306" => ("missing fields in struct literal", Type),
                "E0307" => ("not a struct with named fields", Type),
                "E0308" => ("assignment to a constant", Type),
                "E0309" => ("invalid assignment target", Type),
                "E0310" => ("missing return value", Type),
                "E0311" => ("cannot infer type", Type),
                "E0312" => ("empty range", Type),
                "E0313" => ("range in value position", Type),
                "E0314" => ("invalid operand type", Type),
                "E0315" => ("type cannot be indexed", Type),
                "E0316" => ("type cannot be iterated", Type),
                "E0317" => ("expected a value", Type),
                "E0318" => ("printing a unit value", Type),
                "E0319" => ("missing fields in struct pattern", Type),

                // Type warnings (W03xx)
                "W0301" => ("unreachable match arm", Type),
                "W0302" => ("non-exhaustive match", Type),

                // Loader errors (E04xx)
                "E0401" => ("module file not found", Load),
                "E0402" => ("cannot read source file", Load),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    /// All codes in ascending order.
    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}

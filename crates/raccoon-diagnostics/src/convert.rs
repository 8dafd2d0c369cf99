// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from compiler error types to `Diagnostic`.
//!
//! The headline of each diagnostic is the error's own `Display` text; the
//! conversion adds the code, labels and help.

use crate::suggestions::did_you_mean;
use crate::{Diagnostic, DiagnosticKind, ToDiagnostic};

fn with_candidates(diag: Diagnostic, name: &str, candidates: &[String]) -> Diagnostic {
    match did_you_mean(name, candidates.iter().map(String::as_str)) {
        Some(help) => diag.with_help(help),
        None => diag,
    }
}

// ============================================================================
// Lex Errors
// ============================================================================

impl ToDiagnostic for raccoon_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        use raccoon_lexer::LexErrorKind::*;

        let (code, label) = match self.kind {
            UnexpectedChar => ("E0001", "unexpected character"),
            UnterminatedString => ("E0002", "string starts here"),
            UnterminatedComment => ("E0003", "comment starts here"),
            InvalidEscape => ("E0004", "invalid escape"),
            InvalidNumber => ("E0005", "invalid number"),
        };

        let diag = Diagnostic::error(DiagnosticKind::Lex, &self.message)
            .with_code(code)
            .with_primary(self.span, label);

        match &self.hint {
            Some(hint) => diag.with_help(hint.as_str()),
            None => diag,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

impl ToDiagnostic for raccoon_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        use raccoon_parser::ParseErrorKind;

        let code = match self.kind {
            ParseErrorKind::Expected | ParseErrorKind::AfterLexError => "E0100",
            ParseErrorKind::Invalid => "E0101",
        };
        let label = match &self.expected {
            Some(expected) => format!("expected {}", expected),
            None => "here".to_string(),
        };

        let diag = Diagnostic::error(DiagnosticKind::Parse, &self.message)
            .with_code(code)
            .with_primary(self.span, label);

        match &self.hint {
            Some(hint) => diag.with_help(hint.as_str()),
            None => diag,
        }
    }
}

// ============================================================================
// Resolve Errors
// ============================================================================

impl ToDiagnostic for raccoon_resolve::ResolveError {
    fn to_diagnostic(&self) -> Diagnostic {
        use raccoon_resolve::ResolveErrorKind::*;

        let diag = Diagnostic::error(DiagnosticKind::Resolve, self.kind.to_string());
        match &self.kind {
            UndefinedSymbol { name, candidates } => {
                let diag = diag.with_code("E0200").with_primary(self.span, "not found in this scope");
                with_candidates(diag, name, candidates)
            }

            UndefinedType { name, candidates } => {
                let diag = diag.with_code("E0201").with_primary(self.span, "not found in this scope");
                with_candidates(diag, name, candidates)
            }

            UndefinedVariant { name, candidates, .. } => {
                let diag = diag.with_code("E0202").with_primary(self.span, "variant not found");
                with_candidates(diag, name, candidates)
            }

            DuplicateDefinition { name, previous } => diag
                .with_code("E0203")
                .with_primary(self.span, format!("`{}` redefined here", name))
                .with_secondary(*previous, format!("previous definition of `{}` here", name)),

            NotVisible { defined_at, .. } => diag
                .with_code("E0204")
                .with_primary(self.span, "private item")
                .with_secondary(*defined_at, "defined here")
                .with_help("mark the item `pub` to use it outside its module"),

            NotAModule { .. } => diag.with_code("E0205").with_primary(self.span, "cannot look up names in this"),

            NotAType { .. } => diag
                .with_code("E0206")
                .with_primary(self.span, "not a type")
                .with_note("types are the primitives, structs and enums"),

            UnresolvedImport { .. } => diag.with_code("E0207").with_primary(self.span, "no such item"),

            ImportCycle { chain } => diag
                .with_code("E0208")
                .with_primary(self.span, "this import depends on itself")
                .with_note(format!("the cycle is {}", chain.join(" -> "))),

            TooManySupers => diag.with_code("E0209").with_primary(self.span, "there is no parent module here"),

            BindingInOrPattern { .. } => diag
                .with_code("E0210")
                .with_primary(self.span, "binding in or-pattern")
                .with_help("use `_` or split the alternatives into separate arms"),

            InvalidBreak => diag.with_code("E0211").with_primary(self.span, "cannot `break` outside of a loop"),

            InvalidContinue => {
                diag.with_code("E0212").with_primary(self.span, "cannot `continue` outside of a loop")
            }

            ReturnOutsideFn => diag
                .with_code("E0213")
                .with_primary(self.span, "cannot `return` outside of a function")
                .with_help("constant initializers must produce their value without `return`"),
        }
    }
}

// ============================================================================
// Type Errors
// ============================================================================

impl ToDiagnostic for raccoon_types::TypeError {
    fn to_diagnostic(&self) -> Diagnostic {
        use raccoon_types::TypeError::*;

        let diag = Diagnostic::error(DiagnosticKind::Type, self.to_string());
        match self {
            Mismatch { expected, span, .. } => {
                diag.with_code("E0301").with_primary(*span, format!("expected {}", expected))
            }

            ArityMismatch { expected, span, .. } => diag.with_code("E0302").with_primary(
                *span,
                format!("expected {} argument{}", expected, if *expected == 1 { "" } else { "s" }),
            ),

            NotCallable { span, .. } => diag.with_code("E0303").with_primary(*span, "not a function"),

            NoSuchField { field, candidates, span, .. } => {
                let diag = diag.with_code("E0304").with_primary(*span, "unknown field");
                let diag = with_candidates(diag, field, candidates);
                if diag.help.is_none() && !candidates.is_empty() {
                    diag.with_note(format!("available fields are: {}", candidates.join(", ")))
                } else {
                    diag
                }
            }

            DuplicateField { span, previous, .. } => diag
                .with_code("E0305")
                .with_primary(*span, "used again here")
                .with_secondary(*previous, "first used here"),

            MissingFields { span, .. } => diag.with_code("E0306").with_primary(*span, "missing fields"),

            NotANamedStruct { span, .. } => diag.with_code("E0307").with_primary(*span, "not a struct with named fields"),

            AssignToConst { name, span, decl_span } => diag
                .with_code("E0308")
                .with_primary(*span, "cannot assign to a constant")
                .with_secondary(*decl_span, format!("`{}` declared as a constant here", name))
                .with_help("declare it with `let` to allow assignment"),

            InvalidAssignTarget { span } => diag
                .with_code("E0309")
                .with_primary(*span, "cannot assign to this expression")
                .with_note("only variables, fields and array elements can be assigned"),

            MissingReturn { expected, span, .. } => diag
                .with_code("E0310")
                .with_primary(*span, "function ends without a value")
                .with_help(format!("end the body with an expression of type {} or `return` one", expected)),

            CannotInfer { span } => diag
                .with_code("E0311")
                .with_primary(*span, "type annotation needed")
                .with_help("add an annotation such as `let xs: int[] = [];`"),

            InvalidRange { span, .. } => diag.with_code("E0312").with_primary(*span, "this range is empty"),

            MisplacedRange { span } => diag.with_code("E0313").with_primary(*span, "range used as a value"),

            InvalidOperand { span, ty, .. } => {
                diag.with_code("E0314").with_primary(*span, format!("this has type {}", ty))
            }

            NotIndexable { span, .. } => diag
                .with_code("E0315")
                .with_primary(*span, "cannot be indexed")
                .with_note("arrays and strings can be indexed"),

            NotIterable { span, .. } => diag
                .with_code("E0316")
                .with_primary(*span, "cannot be iterated")
                .with_note("`for` loops iterate over ranges and arrays"),

            NotAValue { span, .. } => diag.with_code("E0317").with_primary(*span, "not a value"),

            UnitArgument { span, .. } => diag.with_code("E0318").with_primary(*span, "this expression has type ()"),

            MissingPatternFields { span, .. } => diag
                .with_code("E0319")
                .with_primary(*span, "missing fields")
                .with_help("list the fields or end the pattern with `..`"),
        }
    }
}

impl ToDiagnostic for raccoon_types::TypeWarning {
    fn to_diagnostic(&self) -> Diagnostic {
        use raccoon_types::TypeWarning::*;

        let diag = Diagnostic::warning(DiagnosticKind::Type, self.to_string());
        match self {
            UnreachableArm { span, covered_by } => diag
                .with_code("W0301")
                .with_primary(*span, "unreachable arm")
                .with_secondary(*covered_by, "this pattern matches every value"),

            NonExhaustiveMatch { span, .. } => diag
                .with_code("W0302")
                .with_primary(*span, "not every value is matched")
                .with_help("add the missing arms or a `_` arm"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raccoon_ast::Span;
    use raccoon_resolve::ResolveError;
    use raccoon_types::{Type, TypeError};

    #[test]
    fn undefined_name_suggests_closest_candidate() {
        let err = ResolveError::undefined(
            "coutn".to_string(),
            vec!["count".to_string(), "other".to_string()],
            Span::new(4, 9),
        );
        let diag = err.to_diagnostic();
        assert_eq!(diag.kind, DiagnosticKind::Resolve);
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0200"));
        assert_eq!(diag.help.map(|h| h.message), Some("did you mean `count`?".to_string()));
    }

    #[test]
    fn mismatch_uses_error_text_as_headline() {
        let err = TypeError::Mismatch { expected: Type::Int, found: Type::Float, span: Span::new(17, 20) };
        let diag = err.to_diagnostic();
        assert_eq!(diag.message, "mismatched types: expected int, found float");
        assert_eq!(diag.primary_span(), Some(Span::new(17, 20)));
        assert_eq!(diag.labels[0].message.as_deref(), Some("expected int"));
    }

    #[test]
    fn assign_to_const_points_at_declaration() {
        let err = TypeError::AssignToConst { name: "N".to_string(), span: Span::new(30, 31), decl_span: Span::new(6, 7) };
        let diag = err.to_diagnostic();
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.labels[1].span, Span::new(6, 7));
    }
}

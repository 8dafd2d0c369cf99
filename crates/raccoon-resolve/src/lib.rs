// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Name resolution for the Raccoon language.
//!
//! This crate builds the module tree, links `use` imports, and resolves every
//! path in the AST to a local, a module-level definition, a builtin function
//! or a primitive type.

mod error;
mod link;
mod module;
mod resolver;
mod scope;
mod symbol;

pub use error::{ResolveError, ResolveErrorKind};
pub use module::{Def, DefId, DefKind, ModuleData, ModuleId, ModuleTree, NameBinding};
pub use resolver::Resolver;
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
pub use symbol::{Symbol, SymbolId, SymbolKind, SymbolTable};

use std::collections::HashMap;

use raccoon_ast::{Module, NodeId};

/// Functions every program can call without declaring them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Println,
}

impl Builtin {
    pub const ALL: [Builtin; 2] = [Builtin::Print, Builtin::Println];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "print" => Some(Builtin::Print),
            "println" => Some(Builtin::Println),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Println => "println",
        }
    }
}

/// Primitive type names. They take precedence over user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Float,
    Bool,
    Str,
}

impl Primitive {
    pub const ALL: [Primitive; 4] = [Primitive::Int, Primitive::Float, Primitive::Bool, Primitive::Str];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Primitive::Int),
            "float" => Some(Primitive::Float),
            "bool" => Some(Primitive::Bool),
            "str" => Some(Primitive::Str),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Str => "str",
        }
    }
}

/// What a path in the AST refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Local(SymbolId),
    Def(DefId),
    Builtin(Builtin),
    Primitive(Primitive),
}

/// The result of name resolution.
#[derive(Debug, Default)]
pub struct ResolvedProgram {
    pub modules: ModuleTree,
    /// All locals declared in the program.
    pub symbols: SymbolTable,
    pub scopes: ScopeTree,
    /// Path expressions, patterns, struct literals and type refs, by node.
    pub resolutions: HashMap<NodeId, Resolution>,
    /// Declaring nodes (let/const statements, params, `for` loops, binding
    /// patterns) to the local they introduce.
    pub bindings: HashMap<NodeId, SymbolId>,
    /// Items to their definitions.
    pub item_defs: HashMap<NodeId, DefId>,
}

impl ResolvedProgram {
    pub fn resolution(&self, node: NodeId) -> Option<Resolution> {
        self.resolutions.get(&node).copied()
    }

    pub fn def(&self, id: DefId) -> &Def {
        self.modules.def(id)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }
}

#[derive(Debug)]
pub struct ResolveResult {
    pub program: ResolvedProgram,
    pub errors: Vec<ResolveError>,
}

impl ResolveResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolve all names in a crate whose external modules are already loaded.
pub fn resolve(module: &Module) -> ResolveResult {
    Resolver::resolve(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_src(source: &str) -> ResolveResult {
        let lexed = raccoon_lexer::Lexer::new(source).tokenize();
        assert!(lexed.errors.is_empty(), "lex errors: {:?}", lexed.errors);
        let parsed = raccoon_parser::Parser::new(lexed.tokens).parse();
        assert!(parsed.is_ok(), "parse errors: {:?}", parsed.errors);
        resolve(&parsed.module)
    }

    fn kinds(result: &ResolveResult) -> Vec<&ResolveErrorKind> {
        result.errors.iter().map(|e| &e.kind).collect()
    }

    fn def_named<'a>(result: &'a ResolveResult, qualified: &str) -> &'a Def {
        result
            .program
            .modules
            .defs()
            .find(|d| d.qualified == qualified)
            .unwrap_or_else(|| panic!("no def {}", qualified))
    }

    #[test]
    fn resolves_locals_params_and_items() {
        let result = resolve_src(
            "fn add(a: int, b: int) -> int { return a + b; }
             fn main() { let x = add(1, 2); println(x); }",
        );
        assert!(result.is_ok(), "{:?}", result.errors);
        let program = &result.program;
        let locals: Vec<_> = program.symbols.iter().map(|s| (s.name.as_str(), s.kind)).collect();
        assert_eq!(
            locals,
            vec![("a", SymbolKind::Param), ("b", SymbolKind::Param), ("x", SymbolKind::Let)]
        );
        let add = def_named(&result, "add").id;
        assert!(program.resolutions.values().any(|r| *r == Resolution::Def(add)));
        assert!(program.resolutions.values().any(|r| *r == Resolution::Builtin(Builtin::Println)));
        assert!(program.resolutions.values().any(|r| *r == Resolution::Primitive(Primitive::Int)));
    }

    #[test]
    fn undefined_name_lists_visible_candidates() {
        let result = resolve_src("fn main() { let count = 1; println(cuont); }");
        match kinds(&result).as_slice() {
            [ResolveErrorKind::UndefinedSymbol { name, candidates }] => {
                assert_eq!(name, "cuont");
                assert!(candidates.contains(&"count".to_string()));
                assert!(candidates.contains(&"main".to_string()));
            }
            other => panic!("unexpected errors: {:?}", other),
        }
    }

    #[test]
    fn forward_reference_in_block_is_undefined() {
        let result = resolve_src("fn main() { let y = x; let x = 1; }");
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::UndefinedSymbol { name, .. }] if name == "x"
        ));
    }

    #[test]
    fn let_initializer_sees_the_outer_binding() {
        let result = resolve_src("fn main() { let x = 1; let x = x + 1; println(x); }");
        assert!(result.is_ok(), "{:?}", result.errors);
        assert_eq!(result.program.symbols.len(), 2);
    }

    #[test]
    fn items_may_be_used_before_declaration() {
        let result = resolve_src("fn main() { helper(); } fn helper() {}");
        assert!(result.is_ok(), "{:?}", result.errors);
    }

    #[test]
    fn duplicate_items_point_at_the_first() {
        let result = resolve_src("fn f() {}\nstruct f;");
        assert_eq!(result.errors.len(), 1);
        match &result.errors[0].kind {
            ResolveErrorKind::DuplicateDefinition { name, previous } => {
                assert_eq!(name, "f");
                assert_eq!(*previous, raccoon_ast::Span::new(3, 4));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn duplicate_params_are_reported() {
        let result = resolve_src("fn f(a: int, a: int) {}");
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::DuplicateDefinition { name, .. }] if name == "a"
        ));
    }

    #[test]
    fn private_items_are_hidden_from_siblings() {
        let result = resolve_src(
            "mod a { fn secret() {} pub fn open() {} }
             mod b { fn f() { crate::a::open(); crate::a::secret(); } }",
        );
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::NotVisible { name, .. }] if name == "secret"
        ));
    }

    #[test]
    fn private_items_are_visible_to_children() {
        let result = resolve_src(
            "fn helper() {}
             mod inner { fn f() { helper(); super::helper(); crate::helper(); } }",
        );
        assert!(result.is_ok(), "{:?}", result.errors);
    }

    #[test]
    fn use_alias_group_and_glob() {
        let result = resolve_src(
            "mod geo {
                 pub struct Point { x: int }
                 pub fn origin() -> Point { Point { x: 0 } }
                 pub mod shapes { pub struct Circle; pub struct Square; }
             }
             use geo::Point as P;
             use geo::{origin, shapes::Circle};
             use geo::shapes::*;
             fn main() { let p: P = origin(); let c: Circle = Circle; let s: Square = Square; }",
        );
        assert!(result.is_ok(), "{:?}", result.errors);
        let point = def_named(&result, "geo::Point").id;
        let square = def_named(&result, "geo::shapes::Square").id;
        let resolved: Vec<_> = result.program.resolutions.values().copied().collect();
        assert!(resolved.contains(&Resolution::Def(point)));
        assert!(resolved.contains(&Resolution::Def(square)));
    }

    #[test]
    fn unresolved_import_names_the_path() {
        let result = resolve_src("use geo::Missing;\nmod geo {}");
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::UnresolvedImport { path }] if path == "geo::Missing"
        ));
    }

    #[test]
    fn import_cycle_is_reported_once() {
        let result = resolve_src("use crate::b as a;\nuse crate::a as b;");
        match kinds(&result).as_slice() {
            [ResolveErrorKind::ImportCycle { chain }] => {
                assert_eq!(chain, &["crate::b", "crate::a", "crate::b"]);
            }
            other => panic!("unexpected errors: {:?}", other),
        }
    }

    #[test]
    fn glob_cycles_terminate() {
        let result = resolve_src(
            "mod a { pub use crate::b::*; pub fn f() {} }
             mod b { pub use crate::a::*; }
             use b::f;
             use a::g;",
        );
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::UnresolvedImport { path }] if path == "a::g"
        ));
    }

    #[test]
    fn super_past_the_root_is_an_error() {
        let result = resolve_src("fn main() { super::main(); }");
        assert!(matches!(kinds(&result).as_slice(), [ResolveErrorKind::TooManySupers]));
    }

    #[test]
    fn enum_variants_resolve_through_the_enum() {
        let result = resolve_src(
            "enum Shape { Circle(float), Empty }
             use Shape::Empty;
             fn main() {
                 let s = Shape::Circle(1.0);
                 let e = Empty;
                 let bad = Shape::Triangle;
             }",
        );
        match kinds(&result).as_slice() {
            [ResolveErrorKind::UndefinedVariant { enum_name, name, candidates }] => {
                assert_eq!(enum_name, "Shape");
                assert_eq!(name, "Triangle");
                assert_eq!(candidates, &["Circle", "Empty"]);
            }
            other => panic!("unexpected errors: {:?}", other),
        }
        match &def_named(&result, "Shape::Empty").kind {
            DefKind::Variant { index, .. } => assert_eq!(*index, 1),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn break_outside_loop() {
        let result = resolve_src("fn main() { break; loop { break; } while true { continue; } continue; }");
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::InvalidBreak, ResolveErrorKind::InvalidContinue]
        ));
    }

    #[test]
    fn return_only_inside_functions() {
        let result = resolve_src(
            "const X: int = return \"s\";
             const Y: int = { return 5 };
             fn f() -> int { loop { return 1; } }",
        );
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::ReturnOutsideFn, ResolveErrorKind::ReturnOutsideFn]
        ));
    }

    #[test]
    fn block_items_are_visible_to_the_whole_block() {
        let result = resolve_src(
            "fn main() {
                 let p = make(1);
                 struct P { x: int }
                 fn make(x: int) -> P { P { x } }
                 enum Dir { Up, Down }
                 let d = Dir::Up;
             }
             fn other() { let q = make(2); }",
        );
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::UndefinedSymbol { name, .. }] if name == "make"
        ));
        assert_eq!(def_named(&result, "P").kind, DefKind::Struct);
        assert!(matches!(def_named(&result, "Dir::Down").kind, DefKind::Variant { index: 1, .. }));
    }

    #[test]
    fn nested_functions_do_not_capture_locals() {
        let result = resolve_src(
            "const LIMIT: int = 3;
             fn main() {
                 let outer = 1;
                 fn inner() -> int { outer + LIMIT }
             }",
        );
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::UndefinedSymbol { name, .. }] if name == "outer"
        ));
    }

    #[test]
    fn duplicate_block_items() {
        let result = resolve_src("fn main() { fn a() {} struct a; }");
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::DuplicateDefinition { name, .. }] if name == "a"
        ));
    }

    #[test]
    fn struct_patterns_bind_their_fields() {
        let result = resolve_src(
            "struct Point { x: int, y: int }
             fn main() {
                 let p = Point { x: 1, y: 2 };
                 match p { Point { x: 0, y } => println(y), Point { x, .. } => println(x), }
                 match p { Missing { a } => println(a), _ => {} }
             }",
        );
        match kinds(&result).as_slice() {
            [ResolveErrorKind::UndefinedType { name, .. }] => assert_eq!(name, "Missing"),
            other => panic!("unexpected errors: {:?}", other),
        }
        let bound: Vec<_> = result
            .program
            .symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::PatternBinding)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(bound, vec!["y", "x", "a"]);
    }

    #[test]
    fn or_patterns_may_not_bind() {
        let result = resolve_src(
            "fn main() { let n = 1; match n { 1 | x => {} y => println(y), } }",
        );
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::BindingInOrPattern { name }] if name == "x"
        ));
    }

    #[test]
    fn pattern_bindings_are_scoped_to_their_arm() {
        let result = resolve_src(
            "enum E { A(int), B }
             fn main() { let e = E::B; match e { E::A(v) => println(v), E::B => println(v), } }",
        );
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::UndefinedSymbol { name, .. }] if name == "v"
        ));
    }

    #[test]
    fn types_must_name_structs_or_enums() {
        let result = resolve_src("fn helper() {}\nfn f(x: helper, y: Missing) {}");
        match kinds(&result).as_slice() {
            [ResolveErrorKind::NotAType { name }, ResolveErrorKind::UndefinedType { name: missing, .. }] => {
                assert_eq!(name, "helper");
                assert_eq!(missing, "Missing");
            }
            other => panic!("unexpected errors: {:?}", other),
        }
    }

    #[test]
    fn user_items_shadow_builtins() {
        let result = resolve_src("fn println(x: int) {}\nfn main() { println(1); }");
        assert!(result.is_ok());
        let user = def_named(&result, "println").id;
        assert!(result.program.resolutions.values().any(|r| *r == Resolution::Def(user)));
        assert!(!result
            .program
            .resolutions
            .values()
            .any(|r| matches!(r, Resolution::Builtin(_))));
    }

    #[test]
    fn for_binding_is_local_to_the_loop() {
        let result = resolve_src("fn main() { for i in 0..3 { println(i); } println(i); }");
        assert!(matches!(
            kinds(&result).as_slice(),
            [ResolveErrorKind::UndefinedSymbol { name, .. }] if name == "i"
        ));
        let sym = result.program.symbols.iter().find(|s| s.name == "i").map(|s| s.kind);
        assert_eq!(sym, Some(SymbolKind::ForBinding));
    }
}

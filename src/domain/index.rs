// Symbol index for Callsight.
// Indexes every function-like declaration in the configured project so call
// targets can be resolved to the declaration the call is bound to. Resolution
// is conservative: a call resolves only when exactly one candidate survives
// name and arity matching.

use crate::domain::calls::CallTarget;
use crate::domain::describe::render_signature;
use dashmap::DashMap;
use log::warn;
use rayon::prelude::*;
use serde::Serialize;
use syn::{Item, Type};

/// A resolved function-like declaration.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDecl {
    /// `crate::module::name` for free functions, `crate::Type::name` for
    /// methods and associated functions.
    pub qualified_name: String,
    pub simple_name: String,
    /// Canonical prototype text.
    pub signature: String,
    /// Parameter count excluding any receiver.
    pub param_count: usize,
    pub has_receiver: bool,
    /// Synthesized by a `#[derive(...)]` attribute rather than written out.
    pub defaulted: bool,
    /// Declared inside an `std::ops` operator-trait impl.
    pub is_operator: bool,
    /// Declaration site `(file, line)`; absent for defaulted declarations.
    pub site: Option<(String, usize)>,
    /// Structural dump of the declaration, captured only on request.
    #[serde(skip)]
    pub dump: Option<String>,
}

/// Thread-safe symbol index over all project sources.
/// Built once per run, in parallel, then only read during traversal.
pub struct SymbolIndex {
    // Key: fully qualified function path
    global_functions: DashMap<String, FunctionDecl>,

    // Key: (TypeName, MethodName)
    type_methods: DashMap<(String, String), FunctionDecl>,

    // Acceleration maps: simple name -> candidate keys
    method_lookup: DashMap<String, Vec<(String, String)>>,
    function_lookup: DashMap<String, Vec<String>>,
}

impl Default for SymbolIndex {
    fn default() -> Self {
        Self {
            global_functions: DashMap::new(),
            type_methods: DashMap::new(),
            method_lookup: DashMap::new(),
            function_lookup: DashMap::new(),
        }
    }
}

/// Operator traits whose impls make an expression an Operator call.
/// `(trait name, desugared method name)`.
const OPERATOR_TRAITS: &[(&str, &str)] = &[
    ("Add", "add"),
    ("Sub", "sub"),
    ("Mul", "mul"),
    ("Div", "div"),
    ("Rem", "rem"),
    ("BitAnd", "bitand"),
    ("BitOr", "bitor"),
    ("BitXor", "bitxor"),
    ("Shl", "shl"),
    ("Shr", "shr"),
    ("AddAssign", "add_assign"),
    ("SubAssign", "sub_assign"),
    ("MulAssign", "mul_assign"),
    ("DivAssign", "div_assign"),
    ("RemAssign", "rem_assign"),
    ("BitAndAssign", "bitand_assign"),
    ("BitOrAssign", "bitor_assign"),
    ("BitXorAssign", "bitxor_assign"),
    ("ShlAssign", "shl_assign"),
    ("ShrAssign", "shr_assign"),
    ("Neg", "neg"),
    ("Not", "not"),
];

fn operator_method_for_trait(trait_name: &str) -> Option<&'static str> {
    OPERATOR_TRAITS
        .iter()
        .find(|(t, _)| *t == trait_name)
        .map(|(_, m)| *m)
}

/// Derives that synthesize callable methods, with the prototype each one
/// produces for a type `T`.
fn derived_methods(type_name: &str) -> Vec<(&'static str, String, usize, bool)> {
    vec![
        ("clone", format!("fn clone(&self) -> {}", type_name), 0, true),
        ("default", format!("fn default() -> {}", type_name), 0, false),
        ("eq", format!("fn eq(&self, other: &{}) -> bool", type_name), 1, true),
        (
            "hash",
            "fn hash<H: Hasher>(&self, state: &mut H)".to_string(),
            1,
            true,
        ),
        (
            "fmt",
            "fn fmt(&self, f: &mut Formatter<'_>) -> Result".to_string(),
            1,
            true,
        ),
    ]
}

fn derive_to_method(derive: &str) -> Option<&'static str> {
    match derive {
        "Clone" => Some("clone"),
        "Default" => Some("default"),
        "PartialEq" => Some("eq"),
        "Hash" => Some("hash"),
        "Debug" => Some("fmt"),
        _ => None,
    }
}

impl SymbolIndex {
    /// Build the index from `(crate_name, file_path, content)` sources in
    /// parallel. Files that fail to parse are logged and skipped; the run
    /// keeps going with whatever the rest of the project declares.
    pub fn build(sources: &[(String, String, String)], capture_dumps: bool) -> Self {
        let index = SymbolIndex::default();

        sources.par_iter().for_each(|(crate_name, file_path, code)| {
            match syn::parse_file(code) {
                Ok(ast) => {
                    index.index_items(crate_name, file_path, &ast.items, capture_dumps);
                }
                Err(e) => {
                    warn!("failed to parse {} while indexing: {}", file_path, e);
                }
            }
        });

        index
    }

    /// Resolve a syntactic call target against the index.
    ///
    /// Returns the bound declaration only when it is unambiguous; candidate
    /// lists are sorted by qualified name first so the answer never depends on
    /// the parallel build's insertion order.
    pub fn resolve(&self, target: &CallTarget, arg_count: usize) -> Option<FunctionDecl> {
        match target {
            CallTarget::Method(name) => self.resolve_by_method_name(name, arg_count, false),
            CallTarget::Operator(method) => self.resolve_by_method_name(method, arg_count, true),
            CallTarget::Path(segments) => self.resolve_path(segments, arg_count),
        }
    }

    fn resolve_by_method_name(
        &self,
        name: &str,
        arg_count: usize,
        operators_only: bool,
    ) -> Option<FunctionDecl> {
        let keys = self.method_lookup.get(name)?.clone();
        let mut candidates: Vec<FunctionDecl> = keys
            .iter()
            .filter_map(|key| self.type_methods.get(key).map(|r| r.clone()))
            .filter(|d| d.param_count == arg_count)
            .filter(|d| !operators_only || d.is_operator)
            .collect();
        candidates.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        candidates.dedup_by(|a, b| a.qualified_name == b.qualified_name);
        match candidates.len() {
            1 => candidates.pop(),
            _ => None,
        }
    }

    fn resolve_path(&self, segments: &[String], arg_count: usize) -> Option<FunctionDecl> {
        // `Type::method(...)` spelling: the receiver, if any, is passed as the
        // first explicit argument.
        if segments.len() >= 2 {
            let key = (
                segments[segments.len() - 2].clone(),
                segments[segments.len() - 1].clone(),
            );
            if let Some(decl) = self.type_methods.get(&key).map(|r| r.clone()) {
                let expected = decl.param_count + usize::from(decl.has_receiver);
                if expected == arg_count {
                    return Some(decl);
                }
            }
        }

        let simple = segments.last()?;
        let spelled = segments.join("::");
        let qualified_names = self.function_lookup.get(simple.as_str())?.clone();
        let mut candidates: Vec<FunctionDecl> = qualified_names
            .iter()
            .filter(|q| {
                q.as_str() == spelled || q.ends_with(&format!("::{}", spelled))
            })
            .filter_map(|q| self.global_functions.get(q).map(|r| r.clone()))
            .filter(|d| d.param_count == arg_count)
            .collect();
        candidates.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        candidates.dedup_by(|a, b| a.qualified_name == b.qualified_name);
        match candidates.len() {
            1 => candidates.pop(),
            _ => None,
        }
    }

    fn insert_function(&self, decl: FunctionDecl) {
        self.function_lookup
            .entry(decl.simple_name.clone())
            .or_default()
            .push(decl.qualified_name.clone());
        self.global_functions.insert(decl.qualified_name.clone(), decl);
    }

    fn insert_method(&self, type_name: &str, decl: FunctionDecl) {
        let key = (type_name.to_string(), decl.simple_name.clone());
        self.method_lookup
            .entry(decl.simple_name.clone())
            .or_default()
            .push(key.clone());
        self.type_methods.insert(key, decl);
    }

    /// Index all items in a list (recursive for nested modules).
    fn index_items(
        &self,
        module_path: &str,
        file_path: &str,
        items: &[Item],
        capture_dumps: bool,
    ) {
        for item in items {
            match item {
                Item::Fn(func) => {
                    let name = func.sig.ident.to_string();
                    let line = func.sig.ident.span().start().line;
                    self.insert_function(FunctionDecl {
                        qualified_name: format!("{}::{}", module_path, name),
                        simple_name: name,
                        signature: render_signature(&func.sig),
                        param_count: func.sig.inputs.len(),
                        has_receiver: false,
                        defaulted: false,
                        is_operator: false,
                        site: Some((file_path.to_string(), line)),
                        dump: capture_dumps.then(|| format!("{:#?}", func)),
                    });
                }
                Item::Impl(imp) => {
                    self.index_impl(module_path, file_path, imp, capture_dumps);
                }
                Item::Struct(st) => {
                    self.index_derives(module_path, &st.ident.to_string(), &st.attrs);
                }
                Item::Enum(en) => {
                    self.index_derives(module_path, &en.ident.to_string(), &en.attrs);
                }
                Item::Mod(module) => {
                    if let Some((_, content)) = &module.content {
                        let nested = format!("{}::{}", module_path, module.ident);
                        self.index_items(&nested, file_path, content, capture_dumps);
                    }
                }
                _ => {}
            }
        }
    }

    fn index_impl(
        &self,
        module_path: &str,
        file_path: &str,
        imp: &syn::ItemImpl,
        capture_dumps: bool,
    ) {
        let type_name = match &*imp.self_ty {
            Type::Path(tp) => match tp.path.segments.last() {
                Some(segment) => segment.ident.to_string(),
                None => return,
            },
            _ => return,
        };

        let operator_method = imp
            .trait_
            .as_ref()
            .and_then(|(_, path, _)| path.segments.last())
            .and_then(|seg| operator_method_for_trait(&seg.ident.to_string()));

        for impl_item in &imp.items {
            if let syn::ImplItem::Fn(method) = impl_item {
                let name = method.sig.ident.to_string();
                let line = method.sig.ident.span().start().line;

                let has_receiver = matches!(
                    method.sig.inputs.first(),
                    Some(syn::FnArg::Receiver(_))
                );
                let param_count = method.sig.inputs.len() - usize::from(has_receiver);

                self.insert_method(
                    &type_name,
                    FunctionDecl {
                        qualified_name: format!("{}::{}::{}", module_path, type_name, name),
                        simple_name: name.clone(),
                        signature: render_signature(&method.sig),
                        param_count,
                        has_receiver,
                        defaulted: false,
                        is_operator: operator_method == Some(name.as_str()),
                        site: Some((file_path.to_string(), line)),
                        dump: capture_dumps.then(|| format!("{:#?}", method)),
                    },
                );
            }
        }
    }

    /// Register compiler-synthesized methods for `#[derive(...)]` attributes.
    /// These are the "defaulted" declarations: callable, typed, but with no
    /// user-written body and no declaration site.
    fn index_derives(&self, module_path: &str, type_name: &str, attrs: &[syn::Attribute]) {
        for attr in attrs {
            if !attr.path().is_ident("derive") {
                continue;
            }
            let parsed = attr.parse_args_with(
                syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated,
            );
            let Ok(paths) = parsed else { continue };
            for path in &paths {
                let Some(derive) = path.segments.last() else { continue };
                let Some(method) = derive_to_method(&derive.ident.to_string()) else {
                    continue;
                };
                let Some((name, signature, param_count, has_receiver)) =
                    derived_methods(type_name).into_iter().find(|(n, ..)| *n == method)
                else {
                    continue;
                };
                self.insert_method(
                    type_name,
                    FunctionDecl {
                        qualified_name: format!("{}::{}::{}", module_path, type_name, name),
                        simple_name: name.to_string(),
                        signature,
                        param_count,
                        has_receiver,
                        defaulted: true,
                        is_operator: false,
                        site: None,
                        dump: None,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(src: &str) -> SymbolIndex {
        let sources = vec![(
            "demo".to_string(),
            "demo/src/lib.rs".to_string(),
            src.to_string(),
        )];
        SymbolIndex::build(&sources, false)
    }

    fn method(name: &str) -> CallTarget {
        CallTarget::Method(name.to_string())
    }

    #[test]
    fn resolves_free_function_by_suffix() {
        let idx = index_of("pub mod util { pub fn helper(x: i32) {} }");
        let decl = idx
            .resolve(&CallTarget::Path(vec!["helper".into()]), 1)
            .unwrap();
        assert_eq!(decl.qualified_name, "demo::util::helper");
        assert_eq!(decl.signature, "fn helper(x: i32)");
        let (file, line) = decl.site.unwrap();
        assert_eq!(file, "demo/src/lib.rs");
        assert_eq!(line, 1);
    }

    #[test]
    fn resolves_method_with_arity_disambiguation() {
        let idx = index_of(
            r#"
            pub struct A;
            pub struct B;
            impl A { pub fn go(&self, x: i32) {} }
            impl B { pub fn go(&self) {} }
            "#,
        );
        let one_arg = idx.resolve(&method("go"), 1).unwrap();
        assert_eq!(one_arg.qualified_name, "demo::A::go");
        let no_arg = idx.resolve(&method("go"), 0).unwrap();
        assert_eq!(no_arg.qualified_name, "demo::B::go");
    }

    #[test]
    fn ambiguous_method_does_not_resolve() {
        let idx = index_of(
            r#"
            pub struct A;
            pub struct B;
            impl A { pub fn go(&self) {} }
            impl B { pub fn go(&self) {} }
            "#,
        );
        assert!(idx.resolve(&method("go"), 0).is_none());
    }

    #[test]
    fn resolves_ufcs_spelling_with_explicit_receiver() {
        let idx = index_of("pub struct C; impl C { pub fn f(&self, x: i32) {} }");
        let decl = idx
            .resolve(&CallTarget::Path(vec!["C".into(), "f".into()]), 2)
            .unwrap();
        assert_eq!(decl.qualified_name, "demo::C::f");
    }

    #[test]
    fn operator_resolution_requires_ops_impl() {
        let idx = index_of(
            r#"
            pub struct Vec2 { pub x: f64, pub y: f64 }
            impl std::ops::Add for Vec2 {
                type Output = Vec2;
                fn add(self, rhs: Vec2) -> Vec2 { Vec2 { x: self.x + rhs.x, y: self.y + rhs.y } }
            }
            impl Vec2 { pub fn scale(&self, k: f64) -> Vec2 { Vec2 { x: self.x * k, y: self.y * k } } }
            "#,
        );
        let add = idx
            .resolve(&CallTarget::Operator("add".into()), 1)
            .unwrap();
        assert!(add.is_operator);
        assert_eq!(add.qualified_name, "demo::Vec2::add");
        // `scale` is not an operator impl, so an operator target cannot bind it.
        assert!(idx.resolve(&CallTarget::Operator("scale".into()), 1).is_none());
    }

    #[test]
    fn derive_synthesizes_defaulted_methods() {
        let idx = index_of("#[derive(Clone, Default)] pub struct Point { x: i32 }");
        let clone = idx.resolve(&method("clone"), 0).unwrap();
        assert!(clone.defaulted);
        assert!(clone.site.is_none());
        assert_eq!(clone.signature, "fn clone(&self) -> Point");

        let default = idx
            .resolve(&CallTarget::Path(vec!["Point".into(), "default".into()]), 0)
            .unwrap();
        assert!(default.defaulted);
        assert_eq!(default.qualified_name, "demo::Point::default");
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let idx = index_of("pub fn helper() {}");
        assert!(idx.resolve(&CallTarget::Path(vec!["missing".into()]), 0).is_none());
        assert!(idx.resolve(&method("missing"), 0).is_none());
    }

    #[test]
    fn mismatched_path_prefix_does_not_resolve() {
        let idx = index_of("pub mod util { pub fn helper() {} }");
        let target = CallTarget::Path(vec!["other".into(), "helper".into()]);
        assert!(idx.resolve(&target, 0).is_none());
    }
}

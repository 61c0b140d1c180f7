// Callee description for Callsight.
// Turns a resolved declaration into the canonical text a report or an
// annotation embeds: qualified name, prototype, and declaration site.

use crate::domain::index::FunctionDecl;
use quote::ToTokens;
use serde::Serialize;

/// Canonical description of a resolved callee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalleeDescription {
    pub qualified_name: String,
    /// Canonical textual prototype of the declaration, independent of how the
    /// call site spelled its arguments.
    pub signature: String,
    /// Declaration site; `None` for compiler-synthesized (defaulted) callees.
    pub site: Option<(String, usize)>,
    pub defaulted: bool,
}

pub fn describe(decl: &FunctionDecl) -> CalleeDescription {
    CalleeDescription {
        qualified_name: decl.qualified_name.clone(),
        signature: decl.signature.clone(),
        site: if decl.defaulted {
            None
        } else {
            decl.site.clone()
        },
        defaulted: decl.defaulted,
    }
}

/// Render a declaration signature as canonical one-line text.
///
/// Token-stream printing inserts spaces between every token; the replacements
/// below collapse them around punctuation so the output reads like written
/// Rust (`fn f(&self, x: i32) -> i32`).
pub fn render_signature(sig: &syn::Signature) -> String {
    tidy_tokens(&sig.to_token_stream().to_string())
}

fn tidy_tokens(s: &str) -> String {
    let mut out = s.replace(" :: ", "::");
    out = out.replace(" < ", "<");
    out = out.replace("< ", "<");
    out = out.replace(" <", "<");
    out = out.replace(" >", ">");
    out = out.replace("& ", "&");
    out = out.replace(" , ", ", ");
    out = out.replace(" ,", ",");
    out = out.replace(" : ", ": ");
    out = out.replace(" ( ", "(");
    out = out.replace("( ", "(");
    out = out.replace(" (", "(");
    out = out.replace(" )", ")");
    out = out.replace("->(", "-> (");
    while out.contains("  ") {
        out = out.replace("  ", " ");
    }
    out.trim().to_string()
}

// Call discovery for Callsight.
// Walks a parsed file depth-first and records every call expression in
// source order, classified by its syntactic kind.

use proc_macro2::LineColumn;
use serde::Serialize;
use std::fmt;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};

/// Syntactic kind of a call expression. Closed set: member-access syntax and
/// operator invocation are mutually exclusive in the grammar, plain function
/// call is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CallKind {
    Function,
    Member,
    Operator,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Function => write!(f, "Function"),
            CallKind::Member => write!(f, "Member"),
            CallKind::Operator => write!(f, "Operator"),
        }
    }
}

/// Syntactic target of a call, as spelled at the call site. Resolution against
/// the symbol index happens later; this only captures what the grammar says.
#[derive(Debug, Clone)]
pub enum CallTarget {
    /// Path call `a::b::f(x)`, keeping the segments as written.
    Path(Vec<String>),
    /// Method call `recv.m(x)`, keeping the method name.
    Method(String),
    /// An operator expression; carries the `std::ops` trait method name the
    /// operator desugars to (`+` is `add`, unary `-` is `neg`, ...).
    Operator(String),
}

impl CallTarget {
    /// The simple name a callee-name prefilter compares against.
    pub fn simple_name(&self) -> &str {
        match self {
            CallTarget::Path(segs) => segs.last().map(String::as_str).unwrap_or(""),
            CallTarget::Method(name) | CallTarget::Operator(name) => name,
        }
    }
}

/// One call expression encountered during traversal. Discarded after it has
/// produced a report (and possibly an edit); holds no tree nodes.
#[derive(Debug, Clone)]
pub struct CallEvent {
    pub kind: CallKind,
    pub target: CallTarget,
    /// Argument count excluding any receiver, used for arity disambiguation.
    pub arg_count: usize,
    pub start: LineColumn,
    /// Position one past the call expression's last token.
    pub end: LineColumn,
    /// Structural dump of the call expression, captured only when the
    /// show-call-ast option is active.
    pub dump: Option<String>,
}

/// Map a binary operator to the `std::ops` trait method it desugars to.
/// Short-circuiting `&&`/`||` and comparisons are not overloadable calls.
fn binary_op_method(op: &syn::BinOp) -> Option<&'static str> {
    use syn::BinOp::*;
    match op {
        Add(_) => Some("add"),
        Sub(_) => Some("sub"),
        Mul(_) => Some("mul"),
        Div(_) => Some("div"),
        Rem(_) => Some("rem"),
        BitAnd(_) => Some("bitand"),
        BitOr(_) => Some("bitor"),
        BitXor(_) => Some("bitxor"),
        Shl(_) => Some("shl"),
        Shr(_) => Some("shr"),
        AddAssign(_) => Some("add_assign"),
        SubAssign(_) => Some("sub_assign"),
        MulAssign(_) => Some("mul_assign"),
        DivAssign(_) => Some("div_assign"),
        RemAssign(_) => Some("rem_assign"),
        BitAndAssign(_) => Some("bitand_assign"),
        BitOrAssign(_) => Some("bitor_assign"),
        BitXorAssign(_) => Some("bitxor_assign"),
        ShlAssign(_) => Some("shl_assign"),
        ShrAssign(_) => Some("shr_assign"),
        _ => None,
    }
}

fn unary_op_method(op: &syn::UnOp) -> Option<&'static str> {
    match op {
        syn::UnOp::Neg(_) => Some("neg"),
        syn::UnOp::Not(_) => Some("not"),
        _ => None,
    }
}

/// Depth-first collector of call events.
///
/// Events are recorded before recursing into operands, so for a fixed tree the
/// output order is the pre-order source order and is repeatable run to run.
pub struct CallCollector {
    events: Vec<CallEvent>,
    /// Syntactic prefilter pushed down from the callee-name criterion: the
    /// final path segment the callee must spell. Post-resolution filtering
    /// still applies; this only prunes the walk.
    name_prefilter: Option<String>,
    capture_dumps: bool,
}

impl CallCollector {
    pub fn new(callee_name_filter: Option<&str>, capture_dumps: bool) -> Self {
        let name_prefilter = callee_name_filter
            .map(|n| n.rsplit("::").next().unwrap_or(n).to_string());
        Self {
            events: Vec::new(),
            name_prefilter,
            capture_dumps,
        }
    }

    /// Walk a parsed file and return its call events in source order.
    pub fn collect(mut self, file: &syn::File) -> Vec<CallEvent> {
        self.visit_file(file);
        self.events
    }

    fn passes_prefilter(&self, target: &CallTarget) -> bool {
        match &self.name_prefilter {
            Some(name) => target.simple_name() == name,
            None => true,
        }
    }

    fn record<N: Spanned + fmt::Debug>(
        &mut self,
        node: &N,
        kind: CallKind,
        target: CallTarget,
        arg_count: usize,
    ) {
        if !self.passes_prefilter(&target) {
            return;
        }
        let span = node.span();
        let dump = self.capture_dumps.then(|| format!("{:#?}", node));
        self.events.push(CallEvent {
            kind,
            target,
            arg_count,
            start: span.start(),
            end: span.end(),
            dump,
        });
    }
}

impl<'ast> Visit<'ast> for CallCollector {
    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let syn::Expr::Path(path) = &*node.func {
            let segments: Vec<String> = path
                .path
                .segments
                .iter()
                .map(|s| s.ident.to_string())
                .collect();
            self.record(
                node,
                CallKind::Function,
                CallTarget::Path(segments),
                node.args.len(),
            );
        }
        visit::visit_expr_call(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        self.record(
            node,
            CallKind::Member,
            CallTarget::Method(node.method.to_string()),
            node.args.len(),
        );
        visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_binary(&mut self, node: &'ast syn::ExprBinary) {
        if let Some(method) = binary_op_method(&node.op) {
            self.record(
                node,
                CallKind::Operator,
                CallTarget::Operator(method.to_string()),
                1,
            );
        }
        visit::visit_expr_binary(self, node);
    }

    fn visit_expr_unary(&mut self, node: &'ast syn::ExprUnary) {
        if let Some(method) = unary_op_method(&node.op) {
            self.record(
                node,
                CallKind::Operator,
                CallTarget::Operator(method.to_string()),
                0,
            );
        }
        visit::visit_expr_unary(self, node);
    }
}

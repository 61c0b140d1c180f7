use callsight::application::{RunDriver, RunOptions};
use callsight::domain::filter::Criteria;
use callsight::domain::index::SymbolIndex;
use callsight::domain::report::TextReportSink;
use callsight::infrastructure::MemoryFileStore;

const LIB: &str = "\
pub mod z {
    pub struct C;
    impl C {
        pub fn f(&self, x: i32) {}
        pub fn g(&self) {}
    }
}
pub struct Vec2 { pub x: f64, pub y: f64 }
impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x.max(rhs.x), y: self.y.max(rhs.y) }
    }
}
pub fn helper(v: i32) -> i32 { v }
";

const MAIN: &str = "\
fn main() {
    let c = demo::z::C;
    c.f(1);
    c.g();
    let a = demo::Vec2 { x: 1.0, y: 2.0 };
    let b = demo::Vec2 { x: 3.0, y: 4.0 };
    let _sum = a + b;
    let _h = helper(7);
}
";

fn sources() -> Vec<(String, String, String)> {
    vec![
        ("demo".to_string(), "src/lib.rs".to_string(), LIB.to_string()),
        ("demo".to_string(), "src/main.rs".to_string(), MAIN.to_string()),
    ]
}

fn run_text(options: RunOptions) -> String {
    let srcs = sources();
    let index = SymbolIndex::build(&srcs, options.show_callee_ast);
    let store = MemoryFileStore::new();
    let mut buf = Vec::new();
    let mut sink = TextReportSink::new(&mut buf);
    let mut driver = RunDriver {
        index: &index,
        options,
        sink: &mut sink,
        file_store: &store,
    };
    driver.run(&srcs).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn member_call_block_matches_fixed_structure() {
    let out = run_text(RunOptions {
        criteria: Criteria::from_cli(3, ""),
        ..Default::default()
    });
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("----"));
    assert_eq!(lines[1], "Member call (File:src/main.rs Line:3 Col:5)");
    assert_eq!(
        lines[2],
        "demo::z::C::f with prototype \"fn f(&self, x: i32)\" declared at src/lib.rs:4"
    );
    assert_eq!(lines[3], "");
}

#[test]
fn all_three_call_kinds_are_reported() {
    let out = run_text(RunOptions::default());
    assert!(out.contains("Member call (File:src/main.rs Line:3 Col:5)"));
    assert!(out.contains("Member call (File:src/main.rs Line:4 Col:5)"));
    assert!(out.contains("Operator call (File:src/main.rs Line:7 Col:16)"));
    assert!(out.contains("Function call (File:src/main.rs Line:8 Col:14)"));
    assert!(out.contains(
        "demo::Vec2::add with prototype \"fn add(self, rhs: Vec2) -> Vec2\" declared at src/lib.rs:11"
    ));
    assert!(out.contains(
        "demo::helper with prototype \"fn helper(v: i32) -> i32\" declared at src/lib.rs:15"
    ));
}

#[test]
fn callee_name_filter_selects_single_callee() {
    let out = run_text(RunOptions {
        criteria: Criteria::from_cli(0, "f"),
        ..Default::default()
    });
    assert!(out.contains("demo::z::C::f"));
    assert!(!out.contains("demo::z::C::g"));
    assert!(!out.contains("demo::helper"));
}

#[test]
fn qualified_callee_name_filter_matches() {
    let out = run_text(RunOptions {
        criteria: Criteria::from_cli(0, "C::f"),
        ..Default::default()
    });
    assert!(out.contains("demo::z::C::f"));
    assert!(!out.contains("demo::z::C::g"));
}

#[test]
fn no_matches_is_not_an_error() {
    let out = run_text(RunOptions {
        criteria: Criteria::from_cli(999, ""),
        ..Default::default()
    });
    assert!(out.is_empty());
}

#[test]
fn show_call_ast_dumps_the_expression_tree() {
    let out = run_text(RunOptions {
        criteria: Criteria::from_cli(3, ""),
        show_call_ast: true,
        ..Default::default()
    });
    assert!(out.contains("ExprMethodCall"));
}

#[test]
fn show_callee_ast_dumps_the_declaration_tree() {
    let out = run_text(RunOptions {
        criteria: Criteria::from_cli(3, ""),
        show_callee_ast: true,
        ..Default::default()
    });
    assert!(out.contains("ImplItemFn"));
}

#[test]
fn output_is_deterministic_across_runs() {
    let first = run_text(RunOptions::default());
    let second = run_text(RunOptions::default());
    assert_eq!(first, second);
}

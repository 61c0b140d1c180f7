// Call filtering for Callsight.
// User criteria restricting which discovered calls get reported.

use crate::domain::describe::CalleeDescription;

/// Filter criteria, built once from the command line and passed into the run
/// driver. No process-wide state; the CLI sentinels (`0`, `""`) map to `None`.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    /// Only calls whose site line equals this value. Lines are 1-based, so 0
    /// is reserved as the CLI's "unset" sentinel.
    pub call_at_line: Option<usize>,
    /// Only calls resolving to this callee name, matched against the qualified
    /// name or its final segment.
    pub callee_name: Option<String>,
}

impl Criteria {
    pub fn from_cli(call_at_line: usize, callee_name: &str) -> Self {
        Self {
            call_at_line: (call_at_line != 0).then_some(call_at_line),
            callee_name: (!callee_name.is_empty()).then(|| callee_name.to_string()),
        }
    }

    /// Both criteria are conjunctive; an unset criterion accepts everything.
    pub fn accepts(&self, site_line: usize, callee: &CalleeDescription) -> bool {
        if let Some(line) = self.call_at_line {
            if site_line != line {
                return false;
            }
        }
        if let Some(name) = &self.callee_name {
            if !name_matches(&callee.qualified_name, name) {
                return false;
            }
        }
        true
    }
}

fn name_matches(qualified: &str, wanted: &str) -> bool {
    qualified == wanted
        || qualified.ends_with(&format!("::{}", wanted))
            && wanted.rsplit("::").next() == qualified.rsplit("::").next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callee(qualified: &str) -> CalleeDescription {
        CalleeDescription {
            qualified_name: qualified.to_string(),
            signature: "fn f()".to_string(),
            site: None,
            defaulted: false,
        }
    }

    #[test]
    fn zero_sentinel_means_no_line_filter() {
        let c = Criteria::from_cli(0, "");
        assert!(c.call_at_line.is_none());
        assert!(c.accepts(7, &callee("demo::f")));
        assert!(c.accepts(12, &callee("demo::f")));
    }

    #[test]
    fn line_filter_matches_exact_line_only() {
        let c = Criteria::from_cli(12, "");
        assert!(c.accepts(12, &callee("demo::f")));
        assert!(!c.accepts(13, &callee("demo::f")));
    }

    #[test]
    fn name_filter_matches_simple_and_qualified() {
        let c = Criteria::from_cli(0, "f");
        assert!(c.accepts(1, &callee("demo::C::f")));
        assert!(!c.accepts(1, &callee("demo::C::g")));

        let q = Criteria::from_cli(0, "C::f");
        assert!(q.accepts(1, &callee("demo::C::f")));
        assert!(!q.accepts(1, &callee("demo::D::f")));
    }

    #[test]
    fn partial_segment_does_not_match() {
        let c = Criteria::from_cli(0, "elper");
        assert!(!c.accepts(1, &callee("demo::helper")));
    }

    #[test]
    fn filters_are_conjunctive() {
        let c = Criteria::from_cli(5, "f");
        assert!(c.accepts(5, &callee("demo::f")));
        assert!(!c.accepts(5, &callee("demo::g")));
        assert!(!c.accepts(6, &callee("demo::f")));
    }
}

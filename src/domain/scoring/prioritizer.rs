//! Issue prioritization.
//!
//! Ordering keys, most significant first:
//! 1. severity weight, descending
//! 2. framework-related issues first
//! 3. confidence, descending, compared in 5-point bands
//! 4. number of affected slides, descending
//! 5. issue type priority, ascending
//! 6. issue id, ascending
//!
//! Comparing confidence in bands keeps small confidence differences from
//! reordering issues while staying transitive, so the result is a strict
//! total order and sorting is stable across runs.

use std::cmp::Ordering;

use super::issue::Issue;

/// Width of a confidence band.
pub const CONFIDENCE_BAND: f64 = 5.0;

fn confidence_band(confidence: f64) -> i64 {
    (confidence.clamp(0.0, 100.0) / CONFIDENCE_BAND).floor() as i64
}

/// Total order over issues, highest priority first.
pub fn compare_issues(a: &Issue, b: &Issue) -> Ordering {
    b.severity
        .weight()
        .cmp(&a.severity.weight())
        .then_with(|| b.framework_related.cmp(&a.framework_related))
        .then_with(|| confidence_band(b.confidence).cmp(&confidence_band(a.confidence)))
        .then_with(|| b.affected_slides.len().cmp(&a.affected_slides.len()))
        .then_with(|| a.issue_type.priority().cmp(&b.issue_type.priority()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Returns the issues sorted by priority.
pub fn prioritize(issues: &[Issue]) -> Vec<Issue> {
    let mut sorted = issues.to_vec();
    sorted.sort_by(compare_issues);
    sorted
}

/// The `limit` highest-priority critical or important issues.
pub fn top_actionable(issues: &[Issue], limit: usize) -> Vec<Issue> {
    prioritize(issues)
        .into_iter()
        .filter(Issue::is_actionable)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{IssueId, SlideId};
    use crate::domain::scoring::{IssueType, Severity};
    use proptest::prelude::*;

    fn issue(id: &str, issue_type: IssueType, severity: Severity) -> Issue {
        Issue::new(IssueId::new(id).unwrap(), issue_type, severity, "desc")
    }

    #[test]
    fn severity_dominates() {
        let issues = vec![
            issue("a", IssueType::Structural, Severity::Minor),
            issue("b", IssueType::Formatting, Severity::Critical),
            issue("c", IssueType::Clarity, Severity::Important),
        ];
        let ids: Vec<_> = prioritize(&issues).into_iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn framework_related_breaks_severity_ties() {
        let issues = vec![
            issue("a", IssueType::Clarity, Severity::Important),
            issue("b", IssueType::Clarity, Severity::Important).framework_related(true),
        ];
        assert_eq!(prioritize(&issues)[0].id.as_str(), "b");
    }

    #[test]
    fn small_confidence_differences_do_not_reorder() {
        let issues = vec![
            issue("a", IssueType::Structural, Severity::Important).with_confidence(81.0),
            issue("b", IssueType::Formatting, Severity::Important).with_confidence(83.0),
        ];
        // same band, structural outranks formatting
        assert_eq!(prioritize(&issues)[0].id.as_str(), "a");
    }

    #[test]
    fn large_confidence_differences_reorder() {
        let issues = vec![
            issue("a", IssueType::Structural, Severity::Important).with_confidence(60.0),
            issue("b", IssueType::Formatting, Severity::Important).with_confidence(90.0),
        ];
        assert_eq!(prioritize(&issues)[0].id.as_str(), "b");
    }

    #[test]
    fn wider_issues_come_first() {
        let issues = vec![
            issue("a", IssueType::Clarity, Severity::Minor).on_slide(SlideId::new("s1").unwrap()),
            issue("b", IssueType::Clarity, Severity::Minor)
                .on_slide(SlideId::new("s1").unwrap())
                .on_slide(SlideId::new("s2").unwrap()),
        ];
        assert_eq!(prioritize(&issues)[0].id.as_str(), "b");
    }

    #[test]
    fn top_actionable_drops_minor_and_caps() {
        let mut issues: Vec<Issue> = (0..12)
            .map(|i| issue(&format!("i{:02}", i), IssueType::Clarity, Severity::Important))
            .collect();
        issues.push(issue("m", IssueType::Structural, Severity::Minor));

        let top = top_actionable(&issues, 10);
        assert_eq!(top.len(), 10);
        assert!(top.iter().all(|i| i.severity != Severity::Minor));
    }

    fn arb_issue() -> impl Strategy<Value = Issue> {
        (
            0usize..50,
            0usize..IssueType::ALL.len(),
            prop_oneof![Just(Severity::Critical), Just(Severity::Important), Just(Severity::Minor)],
            0.0f64..=100.0,
            any::<bool>(),
            0usize..4,
        )
            .prop_map(|(id, t, severity, confidence, fw, slides)| {
                let mut issue = Issue::new(IssueId::sequential(id), IssueType::ALL[t], severity, "d")
                    .with_confidence(confidence)
                    .framework_related(fw);
                for s in 0..slides {
                    issue = issue.on_slide(SlideId::new(format!("s{}", s)).unwrap());
                }
                issue
            })
    }

    proptest! {
        #[test]
        fn prioritize_is_idempotent(issues in prop::collection::vec(arb_issue(), 0..30)) {
            let once = prioritize(&issues);
            let twice = prioritize(&once);
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(prioritize(&issues), once);
        }

        #[test]
        fn severities_are_grouped_in_order(issues in prop::collection::vec(arb_issue(), 0..30)) {
            let sorted = prioritize(&issues);
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].severity.weight() >= pair[1].severity.weight());
            }
        }
    }
}

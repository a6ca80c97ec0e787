//! Activity classification and session merging.
//!
//! Splits a day of heartbeats into pull-request reviews and branch
//! development, reconstructs a session per review and per branch, and merges
//! debugging with coding time on the same branch.
//!
//! Debugging heartbeats carry no branch of their own. They are attributed to
//! the branch of the latest coding heartbeat in the same project that is not
//! more than `branch_lookahead_secs` in the future.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

use crate::category::Category;
use crate::heartbeat::{Heartbeat, SortedHeartbeats};
use crate::session::{Session, reconstruct_session};

/// Abandonment thresholds and branch lookup tolerance, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Maximum gap between review heartbeats on one pull request.
    /// Default: 300 (5 minutes).
    pub review_secs: f64,

    /// Maximum gap between debugging heartbeats on one branch.
    /// Default: 60 (1 minute).
    pub debugging_secs: f64,

    /// Maximum gap between coding heartbeats on one branch.
    /// Default: 120 (2 minutes).
    pub coding_secs: f64,

    /// How far a coding heartbeat may lie after a debugging heartbeat and
    /// still lend it its branch. Look-back is unbounded.
    /// Default: 600 (10 minutes).
    pub branch_lookahead_secs: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            review_secs: 5.0 * 60.0,
            debugging_secs: 60.0,
            coding_secs: 2.0 * 60.0,
            branch_lookahead_secs: 10.0 * 60.0,
        }
    }
}

/// Sessions for one run, keyed by what they will be logged against.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityReport {
    /// Review sessions keyed by pull-request title (the heartbeat entity).
    pub pull_requests: BTreeMap<String, Session>,
    /// Merged debugging and coding sessions keyed by branch.
    pub development: BTreeMap<String, Session>,
}

impl ActivityReport {
    pub fn is_empty(&self) -> bool {
        self.pull_requests.is_empty() && self.development.is_empty()
    }

    /// Review sessions, earliest start first.
    pub fn pull_requests_by_start(&self) -> Vec<(&str, &Session)> {
        by_start(&self.pull_requests)
    }

    /// Development sessions, earliest start first.
    pub fn development_by_start(&self) -> Vec<(&str, &Session)> {
        by_start(&self.development)
    }
}

/// Orders sessions by start time. The sort is stable, so equal starts keep
/// key order.
fn by_start(sessions: &BTreeMap<String, Session>) -> Vec<(&str, &Session)> {
    let mut ordered: Vec<_> = sessions
        .iter()
        .map(|(key, session)| (key.as_str(), session))
        .collect();
    ordered.sort_by(|a, b| a.1.start_time.total_cmp(&b.1.start_time));
    ordered
}

/// Finds the branch a heartbeat at `time` in `project` most likely belongs to.
///
/// Candidates are coding heartbeats of the same project that are either at or
/// before `time`, or at most `lookahead_secs` after it. The latest candidate
/// wins; its branch is returned if it has one.
pub fn closest_branch<'a>(
    time: f64,
    project: Option<&str>,
    heartbeats: &'a SortedHeartbeats,
    lookahead_secs: f64,
) -> Option<&'a str> {
    heartbeats
        .iter()
        .rev()
        .find(|candidate| {
            candidate.category == Category::Coding
                && candidate.project.as_deref() == project
                && (candidate.time <= time || candidate.time - time <= lookahead_secs)
        })
        .and_then(Heartbeat::branch)
}

/// Builds review and development sessions from a day of heartbeats.
pub fn classify(heartbeats: &SortedHeartbeats, thresholds: &Thresholds) -> ActivityReport {
    let mut pull_requests: BTreeMap<String, Session> = BTreeMap::new();
    let mut debugging: BTreeMap<String, Session> = BTreeMap::new();
    let mut coding: BTreeMap<String, Session> = BTreeMap::new();

    let branch_of = |heartbeat: &Heartbeat| {
        closest_branch(
            heartbeat.time,
            heartbeat.project.as_deref(),
            heartbeats,
            thresholds.branch_lookahead_secs,
        )
    };

    for heartbeat in heartbeats.iter() {
        match heartbeat.category {
            Category::CodeReviewing => {
                if let Entry::Vacant(slot) = pull_requests.entry(heartbeat.entity.clone()) {
                    // Every heartbeat on the pull request counts, whatever its category.
                    let group = heartbeats
                        .iter()
                        .filter(|other| other.entity == heartbeat.entity);
                    if let Some(session) = reconstruct_session(group, thresholds.review_secs) {
                        slot.insert(session);
                    }
                }
            }
            Category::Debugging => {
                let Some(branch) = branch_of(heartbeat) else {
                    tracing::debug!(
                        entity = %heartbeat.entity,
                        time = heartbeat.time,
                        "no branch for debugging heartbeat"
                    );
                    continue;
                };
                if let Entry::Vacant(slot) = debugging.entry(branch.to_string()) {
                    let group = heartbeats.iter().filter(|other| {
                        other.category == Category::Debugging && branch_of(other) == Some(branch)
                    });
                    if let Some(session) = reconstruct_session(group, thresholds.debugging_secs) {
                        slot.insert(session);
                    }
                }
            }
            Category::Coding => {
                let Some(branch) = heartbeat.branch() else {
                    continue;
                };
                if let Entry::Vacant(slot) = coding.entry(branch.to_string()) {
                    let group = heartbeats.iter().filter(|other| {
                        other.category == Category::Coding && other.branch() == Some(branch)
                    });
                    if let Some(session) = reconstruct_session(group, thresholds.coding_secs) {
                        slot.insert(session);
                    }
                }
            }
            _ => {}
        }
    }

    tracing::debug!(
        pull_requests = pull_requests.len(),
        debugging_branches = debugging.len(),
        coding_branches = coding.len(),
        "classified heartbeats"
    );

    ActivityReport {
        pull_requests,
        development: merge_development(debugging, coding),
    }
}

/// Merges debugging and coding sessions by branch.
///
/// A branch in both maps gets the earlier start and the summed time; a branch
/// in only one map passes through unchanged.
pub fn merge_development(
    debugging: BTreeMap<String, Session>,
    coding: BTreeMap<String, Session>,
) -> BTreeMap<String, Session> {
    let mut merged = debugging;
    for (branch, session) in coding {
        match merged.entry(branch) {
            Entry::Occupied(mut existing) => {
                let combined = existing.get().merge(session);
                existing.insert(combined);
            }
            Entry::Vacant(slot) => {
                slot.insert(session);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hb(time: f64, category: Category, entity: &str, branch: Option<&str>) -> Heartbeat {
        Heartbeat {
            time,
            entity: entity.to_string(),
            category,
            project: Some("backend".to_string()),
            branch: branch.map(String::from),
        }
    }

    fn coding(time: f64, branch: &str) -> Heartbeat {
        hb(time, Category::Coding, "src/main.rs", Some(branch))
    }

    fn debugging(time: f64) -> Heartbeat {
        hb(time, Category::Debugging, "src/main.rs", None)
    }

    fn review(time: f64, title: &str) -> Heartbeat {
        hb(time, Category::CodeReviewing, title, None)
    }

    fn session(start_time: f64, total_time: f64) -> Session {
        Session {
            start_time,
            total_time,
        }
    }

    #[test]
    fn test_closest_branch_prefers_latest_preceding() {
        let heartbeats = SortedHeartbeats::new(vec![
            coding(0.0, "CAM-1-old"),
            coding(100.0, "CAM-2-new"),
        ]);
        assert_eq!(
            closest_branch(200.0, Some("backend"), &heartbeats, 600.0),
            Some("CAM-2-new")
        );
        assert_eq!(
            closest_branch(50.0, Some("backend"), &heartbeats, 600.0),
            Some("CAM-2-new"),
            "a coding heartbeat within the look-ahead window wins"
        );
    }

    #[test]
    fn test_closest_branch_lookahead_is_bounded() {
        let heartbeats = SortedHeartbeats::new(vec![
            coding(0.0, "early"),
            coding(1000.0, "late"),
        ]);
        // 1000 - 300 = 700 > 600: only the early heartbeat qualifies
        assert_eq!(
            closest_branch(300.0, Some("backend"), &heartbeats, 600.0),
            Some("early")
        );
        // 1000 - 400 = 600: within the window
        assert_eq!(
            closest_branch(400.0, Some("backend"), &heartbeats, 600.0),
            Some("late")
        );
    }

    #[test]
    fn test_closest_branch_lookback_is_unbounded() {
        let heartbeats = SortedHeartbeats::new(vec![coding(0.0, "ancient")]);
        assert_eq!(
            closest_branch(1_000_000.0, Some("backend"), &heartbeats, 600.0),
            Some("ancient")
        );
    }

    #[test]
    fn test_closest_branch_none_without_candidates() {
        let mut other_project = coding(0.0, "elsewhere");
        other_project.project = Some("frontend".to_string());
        let heartbeats = SortedHeartbeats::new(vec![other_project, debugging(10.0)]);
        assert_eq!(
            closest_branch(10.0, Some("backend"), &heartbeats, 600.0),
            None
        );
        assert_eq!(
            closest_branch(5000.0, Some("backend"), &SortedHeartbeats::default(), 600.0),
            None
        );
    }

    #[test]
    fn test_closest_branch_latest_without_branch_yields_none() {
        let heartbeats = SortedHeartbeats::new(vec![
            coding(0.0, "feature"),
            hb(50.0, Category::Coding, "scratch.txt", None),
        ]);
        assert_eq!(
            closest_branch(100.0, Some("backend"), &heartbeats, 600.0),
            None
        );
    }

    #[test]
    fn test_review_sessions_keyed_by_entity() {
        let heartbeats = SortedHeartbeats::new(vec![
            review(0.0, "Fix login · Pull Request #12"),
            review(120.0, "Fix login · Pull Request #12"),
            review(60.0, "Add cache · Pull Request #13"),
        ]);
        let report = classify(&heartbeats, &Thresholds::default());

        assert_eq!(report.pull_requests.len(), 2);
        assert_eq!(
            report.pull_requests["Fix login · Pull Request #12"],
            session(0.0, 120.0)
        );
        assert_eq!(
            report.pull_requests["Add cache · Pull Request #13"],
            session(60.0, 150.0)
        );
        assert!(report.development.is_empty());
    }

    #[test]
    fn test_review_includes_other_categories_on_same_entity() {
        let title = "Refactor · Pull Request #9";
        let heartbeats = SortedHeartbeats::new(vec![
            review(0.0, title),
            hb(200.0, Category::Browsing, title, None),
            review(400.0, title),
        ]);
        let report = classify(&heartbeats, &Thresholds::default());
        assert_eq!(report.pull_requests[title], session(0.0, 400.0));
    }

    #[test]
    fn test_coding_sessions_grouped_by_branch() {
        let heartbeats = SortedHeartbeats::new(vec![
            coding(0.0, "CAM-1"),
            hb(60.0, Category::Coding, "src/other.rs", Some("CAM-1")),
            coding(90.0, "CAM-2"),
            coding(120.0, "CAM-1"),
        ]);
        let report = classify(&heartbeats, &Thresholds::default());

        assert_eq!(report.development["CAM-1"], session(0.0, 120.0));
        assert_eq!(report.development["CAM-2"], session(90.0, 60.0));
    }

    #[test]
    fn test_coding_without_branch_is_dropped() {
        let heartbeats = SortedHeartbeats::new(vec![hb(0.0, Category::Coding, "notes.md", None)]);
        let report = classify(&heartbeats, &Thresholds::default());
        assert!(report.is_empty());
    }

    #[test]
    fn test_debugging_attributed_to_closest_branch() {
        let heartbeats = SortedHeartbeats::new(vec![
            coding(0.0, "CAM-1"),
            debugging(1000.0),
            debugging(1030.0),
            coding(5000.0, "CAM-2"),
            debugging(5010.0),
        ]);
        let report = classify(&heartbeats, &Thresholds::default());

        // CAM-1: coding 60 (single heartbeat) + debugging 30
        assert_eq!(report.development["CAM-1"], session(0.0, 90.0));
        // CAM-2: coding 60 + debugging 30 (single heartbeat)
        assert_eq!(report.development["CAM-2"], session(5000.0, 90.0));
    }

    #[test]
    fn test_debugging_without_branch_is_dropped() {
        let heartbeats = SortedHeartbeats::new(vec![debugging(0.0), debugging(10.0)]);
        let report = classify(&heartbeats, &Thresholds::default());
        assert!(report.development.is_empty());
    }

    #[test]
    fn test_debugging_takes_branch_from_lookahead() {
        // The only coding heartbeat comes after the debugging ones, within the
        // look-ahead window.
        let heartbeats = SortedHeartbeats::new(vec![
            debugging(0.0),
            debugging(40.0),
            coding(300.0, "CAM-5"),
        ]);
        let report = classify(&heartbeats, &Thresholds::default());

        assert_eq!(report.development["CAM-5"], session(0.0, 40.0 + 60.0));
    }

    #[test]
    fn test_merge_development_passes_through_and_combines() {
        let debugging = BTreeMap::from([
            ("shared".to_string(), session(500.0, 30.0)),
            ("debug-only".to_string(), session(10.0, 45.0)),
        ]);
        let coding = BTreeMap::from([
            ("shared".to_string(), session(100.0, 600.0)),
            ("code-only".to_string(), session(20.0, 120.0)),
        ]);

        let merged = merge_development(debugging, coding);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged["shared"], session(100.0, 630.0));
        assert_eq!(merged["debug-only"], session(10.0, 45.0));
        assert_eq!(merged["code-only"], session(20.0, 120.0));
    }

    #[test]
    fn test_report_orders_sessions_by_start() {
        let report = ActivityReport {
            pull_requests: BTreeMap::from([
                ("Add cache · Pull Request #13".to_string(), session(900.0, 60.0)),
                ("Zap bug · Pull Request #2".to_string(), session(100.0, 60.0)),
            ]),
            development: BTreeMap::from([
                ("CAM-1".to_string(), session(5000.0, 60.0)),
                ("CAM-2".to_string(), session(200.0, 60.0)),
                ("CAM-3".to_string(), session(200.0, 60.0)),
            ]),
        };

        let reviews: Vec<_> = report
            .pull_requests_by_start()
            .into_iter()
            .map(|(title, _)| title)
            .collect();
        assert_eq!(
            reviews,
            ["Zap bug · Pull Request #2", "Add cache · Pull Request #13"]
        );

        let branches: Vec<_> = report
            .development_by_start()
            .into_iter()
            .map(|(branch, _)| branch)
            .collect();
        assert_eq!(branches, ["CAM-2", "CAM-3", "CAM-1"]);
    }

    #[test]
    fn test_custom_thresholds_are_used() {
        let heartbeats = SortedHeartbeats::new(vec![coding(0.0, "CAM-1"), coding(200.0, "CAM-1")]);
        let thresholds = Thresholds {
            coding_secs: 300.0,
            ..Thresholds::default()
        };
        let report = classify(&heartbeats, &thresholds);
        assert_eq!(report.development["CAM-1"], session(0.0, 200.0));
    }
}

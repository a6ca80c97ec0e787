//! Raw activity heartbeats from the time-tracking service.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A timestamped activity signal.
///
/// Heartbeats are received as input and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// When the heartbeat was sent, in epoch seconds.
    pub time: f64,
    /// File path, URL, or pull-request title the activity was on.
    pub entity: String,
    /// The type of activity.
    pub category: Category,
    /// Project the entity belongs to.
    #[serde(default)]
    pub project: Option<String>,
    /// Version-control branch, reported for editor activity only.
    #[serde(default)]
    pub branch: Option<String>,
}

impl Heartbeat {
    /// Returns the branch if it is present and non-empty.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref().filter(|branch| !branch.is_empty())
    }
}

/// Heartbeats ordered by time, ascending.
///
/// Session reconstruction only looks at gaps between neighbours, so it is
/// meaningless on unsorted input. Wrapping the feed here makes that ordering a
/// property of the type rather than something every caller has to remember.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedHeartbeats(Vec<Heartbeat>);

impl SortedHeartbeats {
    /// Sorts heartbeats by time. The sort is stable, so heartbeats with equal
    /// timestamps keep their feed order.
    pub fn new(mut heartbeats: Vec<Heartbeat>) -> Self {
        heartbeats.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self(heartbeats)
    }

    /// Keeps only the heartbeats of one project.
    #[must_use]
    pub fn for_project(self, project: &str) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|heartbeat| heartbeat.project.as_deref() == Some(project))
                .collect(),
        )
    }
}

impl Deref for SortedHeartbeats {
    type Target = [Heartbeat];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

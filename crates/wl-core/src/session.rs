//! Session reconstruction from heartbeats.
//!
//! Heartbeats are sparse: an editor reports activity every couple of minutes
//! at most, and nothing at all while the developer reads or thinks. A session
//! is rebuilt by walking the heartbeats in time order and treating any gap
//! longer than an abandonment threshold as the end of one active span and the
//! start of the next.
//!
//! # Algorithm Summary
//!
//! 1. The first heartbeat opens a span with no accumulated time.
//! 2. A gap within the threshold extends the open span by the gap.
//! 3. A gap beyond the threshold closes the open span with half the threshold
//!    as credit for the unobserved tail, and opens a new span.
//! 4. The session total is the sum of all spans, or half the threshold when
//!    that sum is zero; the session starts where the first span started.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reconstructed work interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Start of the first active span, in epoch seconds.
    pub start_time: f64,
    /// Active time across all spans, in seconds.
    pub total_time: f64,
}

impl Session {
    /// Combines two sessions on the same branch: earliest start, summed time.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start_time: self.start_time.min(other.start_time),
            total_time: self.total_time + other.total_time,
        }
    }

    /// Start time as a UTC timestamp, truncated to whole seconds.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "epoch seconds are far inside i64 range"
    )]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_time.floor() as i64, 0)
    }

    /// Total time rounded up to the next whole minute, in seconds.
    ///
    /// Work is always logged in whole minutes and never under-reported:
    /// 125 seconds becomes 180.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "total_time is non-negative and bounded by a day of heartbeats"
    )]
    pub fn rounded_duration_secs(&self) -> u64 {
        ((self.total_time / 60.0).ceil() * 60.0).max(0.0) as u64
    }
}

/// A not-yet-finalized active span.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    prev_time: f64,
    total_time: f64,
}

impl Span {
    const fn open(time: f64) -> Self {
        Self {
            prev_time: time,
            total_time: 0.0,
        }
    }
}

/// Reconstructs one session from heartbeats sharing a grouping key.
///
/// Heartbeats must be sorted by time ascending. Returns `None` only when
/// `heartbeats` is empty. Input with no measurable span, such as a single
/// heartbeat, is credited `threshold_secs / 2`.
pub fn reconstruct_session<'a, I>(heartbeats: I, threshold_secs: f64) -> Option<Session>
where
    I: IntoIterator<Item = &'a crate::Heartbeat>,
{
    let mut times = heartbeats.into_iter().map(|heartbeat| heartbeat.time);
    let first = times.next()?;

    let mut open = Span::open(first);
    let mut closed_total = 0.0;
    let mut span_count = 1_usize;
    for time in times {
        debug_assert!(
            time >= open.prev_time,
            "heartbeats must be sorted by time ascending"
        );

        let diff = time - open.prev_time;
        if diff > threshold_secs {
            open.total_time += threshold_secs / 2.0;
            closed_total += open.total_time;
            open = Span::open(time);
            span_count += 1;
        } else {
            open.total_time += diff;
            open.prev_time = time;
        }
    }

    // An isolated heartbeat still counts for half a threshold.
    let sum = closed_total + open.total_time;
    let total_time = if sum > 0.0 { sum } else { threshold_secs / 2.0 };

    tracing::trace!(
        spans = span_count,
        start_time = first,
        total_time,
        "reconstructed session"
    );

    Some(Session {
        start_time: first,
        total_time,
    })
}

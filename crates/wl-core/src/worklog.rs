//! Sequential work logging.
//!
//! Walks an [`ActivityReport`] one session at a time: pull-request reviews
//! first, then branch development, each in start-time order. Each session is resolved to a ticket and
//! logged before the next one starts, so prompts never interleave and the
//! ticket system never sees two writes racing. A failure on one session is
//! recorded and the loop moves on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::classify::ActivityReport;
use crate::resolve::{BoxError, Prompter, ResolveError, TicketResolver, TicketSearch, TicketSource};
use crate::session::Session;
use crate::types::TicketKey;

/// Work log comment for pull-request review sessions.
pub const REVIEW_COMMENT: &str = "Pull request review";

/// Work log comment for branch development sessions.
pub const DEVELOPMENT_COMMENT: &str = "Development and debugging";

/// A work log to submit to the ticket system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkLogEntry {
    pub ticket: TicketKey,
    pub started: DateTime<Utc>,
    /// Always a whole number of minutes.
    pub duration_secs: u64,
    pub comment: String,
}

impl WorkLogEntry {
    /// Builds the entry for a session, rounding its duration up to the minute.
    pub fn for_session(
        ticket: TicketKey,
        session: &Session,
        comment: &str,
    ) -> Result<Self, LogError> {
        let started = session.started_at().ok_or(LogError::InvalidStart {
            start_time: session.start_time,
        })?;
        Ok(Self {
            ticket,
            started,
            duration_secs: session.rounded_duration_secs(),
            comment: comment.to_string(),
        })
    }
}

/// Submits work logs to the ticket system.
pub trait WorkLogSink {
    fn log_work(&mut self, entry: &WorkLogEntry) -> Result<(), BoxError>;
}

/// Errors for a single session. None of them stop the run.
#[derive(Debug, Error)]
pub enum LogError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("session start {start_time} is not a valid timestamp")]
    InvalidStart { start_time: f64 },
    #[error("failed to log work on {ticket}: {source}")]
    Submit {
        ticket: TicketKey,
        #[source]
        source: BoxError,
    },
}

/// Run options.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Resolve tickets but do not submit anything.
    pub dry_run: bool,
}

/// What happened to one session.
#[derive(Debug)]
pub enum Outcome {
    Logged(WorkLogEntry),
    /// Would have been logged, but the run is a dry run.
    Planned(WorkLogEntry),
    /// No ticket was chosen.
    Skipped,
    Failed(LogError),
}

/// A session and what happened to it.
#[derive(Debug)]
pub struct SessionOutcome {
    pub source: TicketSource,
    pub title: String,
    pub session: Session,
    pub outcome: Outcome,
}

/// Per-session results of a run, in processing order.
#[derive(Debug, Default)]
pub struct LogSummary {
    pub sessions: Vec<SessionOutcome>,
}

impl LogSummary {
    pub fn logged(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Logged(_)))
    }

    pub fn planned(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Planned(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.sessions
            .iter()
            .filter(|session| predicate(&session.outcome))
            .count()
    }
}

/// Resolves and logs every session in `report`, one at a time.
pub fn log_activity<P, T>(
    report: &ActivityReport,
    resolver: &mut TicketResolver,
    prompter: &mut P,
    tracker: &mut T,
    options: LogOptions,
) -> LogSummary
where
    P: Prompter + ?Sized,
    T: TicketSearch + WorkLogSink + ?Sized,
{
    let review = report
        .pull_requests_by_start()
        .into_iter()
        .map(|(title, session)| (TicketSource::PullRequest, title, session, REVIEW_COMMENT));
    let development = report
        .development_by_start()
        .into_iter()
        .map(|(branch, session)| (TicketSource::Branch, branch, session, DEVELOPMENT_COMMENT));

    let mut summary = LogSummary::default();
    for (source, title, session, comment) in review.chain(development) {
        if session.total_time <= 0.0 {
            continue;
        }

        prompter.notify(&match source {
            TicketSource::PullRequest => format!("Processing review of {title}"),
            TicketSource::Branch => format!("Processing development on branch {title}"),
        });

        let outcome = match log_session(
            source, title, session, comment, resolver, prompter, tracker, options,
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(%source, title = %title, error = %err, "failed to log session");
                Outcome::Failed(err)
            }
        };

        summary.sessions.push(SessionOutcome {
            source,
            title: title.to_string(),
            session: *session,
            outcome,
        });
    }
    summary
}

#[expect(
    clippy::too_many_arguments,
    reason = "one call site threading the run context through"
)]
fn log_session<P, T>(
    source: TicketSource,
    title: &str,
    session: &Session,
    comment: &str,
    resolver: &mut TicketResolver,
    prompter: &mut P,
    tracker: &mut T,
    options: LogOptions,
) -> Result<Outcome, LogError>
where
    P: Prompter + ?Sized,
    T: TicketSearch + WorkLogSink + ?Sized,
{
    let Some(ticket) = resolver.resolve(source, title, prompter, tracker)? else {
        tracing::info!(%source, title, "skipped session without ticket");
        return Ok(Outcome::Skipped);
    };

    let entry = WorkLogEntry::for_session(ticket, session, comment)?;
    if options.dry_run {
        tracing::info!(ticket = %entry.ticket, duration_secs = entry.duration_secs, "dry run, not logging");
        return Ok(Outcome::Planned(entry));
    }

    tracker
        .log_work(&entry)
        .map_err(|source| LogError::Submit {
            ticket: entry.ticket.clone(),
            source,
        })?;
    tracing::info!(
        ticket = %entry.ticket,
        started = %entry.started,
        duration_secs = entry.duration_secs,
        "logged work"
    );
    Ok(Outcome::Logged(entry))
}

//! Core domain logic for heartbeat work logging.
//!
//! This crate contains the fundamental types and logic for:
//! - Session reconstruction: turning sparse heartbeats into work intervals
//! - Classification: pull-request reviews vs. branch development
//! - Ticket resolution: mapping titles and branches to tickets
//! - Work logging: the sequential resolve-and-log loop

mod category;
mod classify;
mod heartbeat;
pub mod resolve;
mod session;
pub mod ticket;
mod types;
pub mod worklog;

pub use category::{Category, UnknownCategory};
pub use classify::{ActivityReport, Thresholds, classify, closest_branch, merge_development};
pub use heartbeat::{Heartbeat, SortedHeartbeats};
pub use resolve::{
    BoxError, Prompter, ResolutionState, ResolveError, Selection, TicketResolver, TicketSearch,
    TicketSource,
};
pub use session::{Session, reconstruct_session};
pub use ticket::{PatternError, TicketPattern, search_query_from_title};
pub use types::{TicketChoice, TicketKey, ValidationError};
pub use worklog::{
    LogError, LogOptions, LogSummary, Outcome, SessionOutcome, WorkLogEntry, WorkLogSink,
    log_activity,
};

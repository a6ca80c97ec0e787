//! Ticket resolution for pull requests and branches.
//!
//! Resolution is a small state machine:
//!
//! ```text
//! Unresolved ──match──▶ PatternMatched ──yes──▶ Confirmed ──▶ Resolved(Some)
//!     │                      │ no
//!     └──no match──▶ SearchFallback ◀─┘
//!                      │  ▲ new query
//!                      │  └────────┘
//!                      └──pick/skip──▶ Resolved(Some | None)
//! ```
//!
//! Outcomes are cached per resolver, so a title is only ever asked about once
//! in a run. A resolver is built fresh for every run.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::ticket::{TicketPattern, search_query_from_title};
use crate::types::{TicketChoice, TicketKey};

/// Error type surfaced by collaborator implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop a single resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The interactive prompt failed.
    #[error("prompt failed: {0}")]
    Prompt(#[source] BoxError),
    /// The ticket system search failed.
    #[error("ticket search failed: {0}")]
    Search(#[source] BoxError),
}

/// What the operator chose in a ticket selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Use this ticket.
    Pick(TicketKey),
    /// Search again with a different query.
    Search(String),
    /// Do not log this session.
    Skip,
}

/// Interactive operator prompts.
pub trait Prompter {
    /// Asks a yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, BoxError>;

    /// Offers ticket choices. An empty `choices` still lets the operator
    /// search again or skip.
    fn select(&mut self, message: &str, choices: &[TicketChoice]) -> Result<Selection, BoxError>;

    /// Shows a progress line. Prompters without an output ignore it.
    fn notify(&mut self, _message: &str) {}
}

/// Ticket system search.
pub trait TicketSearch {
    /// Returns tickets similar to `query`, best first.
    fn search(&mut self, query: &str) -> Result<Vec<TicketChoice>, BoxError>;
}

/// Where a title came from. Pull requests and branches are cached separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketSource {
    PullRequest,
    Branch,
}

impl fmt::Display for TicketSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PullRequest => write!(f, "pull request"),
            Self::Branch => write!(f, "branch"),
        }
    }
}

/// Resolution progress for one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    PatternMatched(TicketKey),
    Confirmed(TicketKey),
    SearchFallback { query: String },
    Resolved(Option<TicketKey>),
}

/// Maps pull-request titles and branch names to tickets, caching each
/// outcome for the lifetime of the resolver.
#[derive(Debug)]
pub struct TicketResolver {
    pattern: TicketPattern,
    cache: HashMap<(TicketSource, String), Option<TicketKey>>,
}

impl TicketResolver {
    pub fn new(pattern: TicketPattern) -> Self {
        Self {
            pattern,
            cache: HashMap::new(),
        }
    }

    /// Returns the cached outcome for a title, if it was resolved before.
    pub fn cached(&self, source: TicketSource, title: &str) -> Option<&Option<TicketKey>> {
        self.cache.get(&(source, title.to_string()))
    }

    /// Resolves the ticket for `title`, prompting the operator as needed.
    ///
    /// `Ok(None)` means the operator skipped the session. Errors are not
    /// cached, so a later call for the same title starts over.
    pub fn resolve<P, S>(
        &mut self,
        source: TicketSource,
        title: &str,
        prompter: &mut P,
        search: &mut S,
    ) -> Result<Option<TicketKey>, ResolveError>
    where
        P: Prompter + ?Sized,
        S: TicketSearch + ?Sized,
    {
        if let Some(cached) = self.cached(source, title) {
            tracing::debug!(%source, title, ticket = ?cached, "ticket resolved from cache");
            return Ok(cached.clone());
        }

        let mut state = ResolutionState::Unresolved;
        let ticket = loop {
            state = match state {
                ResolutionState::Resolved(ticket) => break ticket,
                other => self.step(other, source, title, prompter, search)?,
            };
        };

        tracing::debug!(%source, title, ticket = ?ticket, "ticket resolved");
        self.cache.insert((source, title.to_string()), ticket.clone());
        Ok(ticket)
    }

    /// Advances resolution by one state.
    pub fn step<P, S>(
        &self,
        state: ResolutionState,
        source: TicketSource,
        title: &str,
        prompter: &mut P,
        search: &mut S,
    ) -> Result<ResolutionState, ResolveError>
    where
        P: Prompter + ?Sized,
        S: TicketSearch + ?Sized,
    {
        let next = match state {
            ResolutionState::Unresolved => match self.pattern.find(title) {
                Some(key) => ResolutionState::PatternMatched(key),
                None => {
                    tracing::warn!(%source, title, "no ticket key found");
                    prompter.notify(&format!("Cannot find ticket key for {source}: {title}"));
                    ResolutionState::SearchFallback {
                        query: search_query_from_title(title),
                    }
                }
            },
            ResolutionState::PatternMatched(key) => {
                let message = format!("{key} is correct for {title}. Can you confirm this?");
                if prompter
                    .confirm(&message, true)
                    .map_err(ResolveError::Prompt)?
                {
                    ResolutionState::Confirmed(key)
                } else {
                    ResolutionState::SearchFallback {
                        query: search_query_from_title(title),
                    }
                }
            }
            ResolutionState::Confirmed(key) => ResolutionState::Resolved(Some(key)),
            ResolutionState::SearchFallback { query } => {
                let choices = search.search(&query).map_err(ResolveError::Search)?;
                tracing::debug!(query = %query, hits = choices.len(), "ticket search");
                let message = format!("Pick the correct ticket for {title}");
                match prompter
                    .select(&message, &choices)
                    .map_err(ResolveError::Prompt)?
                {
                    Selection::Pick(key) => ResolutionState::Resolved(Some(key)),
                    Selection::Search(query) => ResolutionState::SearchFallback { query },
                    Selection::Skip => ResolutionState::Resolved(None),
                }
            }
            resolved @ ResolutionState::Resolved(_) => resolved,
        };
        Ok(next)
    }
}

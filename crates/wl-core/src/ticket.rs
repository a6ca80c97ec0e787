//! Ticket key detection in branch names and pull-request titles.

use regex::Regex;
use thiserror::Error;

use crate::types::TicketKey;

/// Errors building a [`TicketPattern`].
#[derive(Debug, Error)]
pub enum PatternError {
    /// The project key was empty or contained characters other than ASCII
    /// letters, digits, and underscores.
    #[error("invalid ticket project key: {0:?}")]
    InvalidProjectKey(String),
}

/// Matches `<PROJECT>-<digits>` ticket keys for one ticket-system project.
#[derive(Debug, Clone)]
pub struct TicketPattern {
    regex: Regex,
}

impl TicketPattern {
    /// Builds a matcher for keys such as `CAM-123` given `"CAM"`.
    pub fn new(project: &str) -> Result<Self, PatternError> {
        let valid = !project.is_empty()
            && project
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(PatternError::InvalidProjectKey(project.to_string()));
        }
        let regex = Regex::new(&format!(r"{project}-\d+"))
            .map_err(|_| PatternError::InvalidProjectKey(project.to_string()))?;
        Ok(Self { regex })
    }

    /// Returns the first ticket key mentioned in `title`.
    pub fn find(&self, title: &str) -> Option<TicketKey> {
        self.regex
            .find(title)
            .and_then(|m| TicketKey::new(m.as_str()).ok())
    }
}

/// Derives a ticket search query from a pull-request title or branch name.
///
/// Code-review heartbeats use the browser tab title, e.g.
/// `"Fix login redirect by alice · Pull Request #42 · org/repo"`. The part
/// after `" · Pull Request"` and the trailing `" by <author>"` are noise for a
/// ticket search and are dropped. Anything else is returned trimmed.
pub fn search_query_from_title(title: &str) -> String {
    let Some((head, _)) = title.split_once(" · Pull Request") else {
        return title.trim().to_string();
    };
    let head = head.rsplit_once(" by ").map_or(head, |(summary, _)| summary);
    head.trim().to_string()
}

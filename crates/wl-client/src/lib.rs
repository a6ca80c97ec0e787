//! HTTP clients for the time-tracking service and the ticket system.
//!
//! Provides:
//! - [`WakaTimeClient`]: heartbeats for a day
//! - [`JiraClient`]: ticket search, work logs, and a credentials check

use std::time::Duration;

use thiserror::Error;

mod jira;
mod wakatime;

pub use jira::{JiraClient, JiraUser};
pub use wakatime::{WAKATIME_API_URL, WakaTimeClient};

/// Default request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required credential was missing or blank.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service returned an error response.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

fn require(value: String, reason: &'static str) -> Result<String, ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidCredentials { reason });
    }
    Ok(value)
}

fn build_http(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ClientError::ClientBuild)
}

fn trim_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

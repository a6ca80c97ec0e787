//! WakaTime heartbeats API.

use std::fmt;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use serde::Deserialize;
use wl_core::{Heartbeat, SortedHeartbeats};

use crate::{ClientError, build_http, require, trim_base_url};

/// Public WakaTime API root.
pub const WAKATIME_API_URL: &str = "https://wakatime.com/api/v1";

/// WakaTime API client.
pub struct WakaTimeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for WakaTimeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WakaTimeClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct HeartbeatsResponse {
    data: Vec<Heartbeat>,
}

impl WakaTimeClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the HTTP client fails to
    /// build.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let api_key = require(api_key.into(), "WakaTime API key cannot be empty")?;
        Ok(Self {
            http: build_http(timeout)?,
            base_url: trim_base_url(base_url),
            api_key,
        })
    }

    /// Fetches every heartbeat of the current user on `date`.
    pub async fn heartbeats(&self, date: NaiveDate) -> Result<Vec<Heartbeat>, ClientError> {
        let url = format!("{}/users/current/heartbeats", self.base_url);
        let date = date.format("%Y-%m-%d").to_string();
        let response = self
            .http
            .get(&url)
            .query(&[("date", date.as_str())])
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", STANDARD.encode(&self.api_key)),
            )
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: parse_api_error(&body).unwrap_or(body),
            });
        }

        let payload: HeartbeatsResponse = serde_json::from_str(&body)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;
        tracing::debug!(date = %date, count = payload.data.len(), "fetched heartbeats");
        Ok(payload.data)
    }

    /// Fetches the heartbeats of one project on `date`, sorted by time.
    pub async fn project_heartbeats(
        &self,
        date: NaiveDate,
        project: &str,
    ) -> Result<SortedHeartbeats, ClientError> {
        let heartbeats = self.heartbeats(date).await?;
        Ok(SortedHeartbeats::new(heartbeats).for_project(project))
    }
}

fn parse_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| payload.error)
}

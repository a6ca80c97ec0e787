//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wl_client::{JiraClient, WAKATIME_API_URL, WakaTimeClient};
use wl_core::{TicketPattern, Thresholds};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// WakaTime secret API key.
    pub wakatime_api_key: Option<String>,
    /// WakaTime API root.
    pub wakatime_url: String,
    /// Jira instance root, e.g. `https://jira.example.com`.
    pub jira_url: Option<String>,
    pub jira_username: Option<String>,
    /// Jira API token or password.
    pub jira_token: Option<String>,
    /// Jira project key tickets are matched against.
    pub ticket_project: String,
    /// Project tracked when none is given on the command line.
    pub default_project: Option<String>,
    pub review_threshold_secs: f64,
    pub debugging_threshold_secs: f64,
    pub coding_threshold_secs: f64,
    pub branch_lookahead_secs: f64,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("wakatime_api_key", &redacted(self.wakatime_api_key.as_ref()))
            .field("wakatime_url", &self.wakatime_url)
            .field("jira_url", &self.jira_url)
            .field("jira_username", &self.jira_username)
            .field("jira_token", &redacted(self.jira_token.as_ref()))
            .field("ticket_project", &self.ticket_project)
            .field("default_project", &self.default_project)
            .field("review_threshold_secs", &self.review_threshold_secs)
            .field("debugging_threshold_secs", &self.debugging_threshold_secs)
            .field("coding_threshold_secs", &self.coding_threshold_secs)
            .field("branch_lookahead_secs", &self.branch_lookahead_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn redacted(secret: Option<&String>) -> Option<&'static str> {
    secret.map(|_| "[REDACTED]")
}

impl Default for Config {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            wakatime_api_key: None,
            wakatime_url: WAKATIME_API_URL.to_string(),
            jira_url: None,
            jira_username: None,
            jira_token: None,
            ticket_project: "CAM".to_string(),
            default_project: None,
            review_threshold_secs: thresholds.review_secs,
            debugging_threshold_secs: thresholds.debugging_secs,
            coding_threshold_secs: thresholds.coding_secs,
            branch_lookahead_secs: thresholds.branch_lookahead_secs,
            request_timeout_secs: wl_client::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WL_*)
        figment = figment.merge(Env::prefixed("WL_"));

        figment.extract()
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            review_secs: self.review_threshold_secs,
            debugging_secs: self.debugging_threshold_secs,
            coding_secs: self.coding_threshold_secs,
            branch_lookahead_secs: self.branch_lookahead_secs,
        }
    }

    pub fn ticket_pattern(&self) -> Result<TicketPattern> {
        TicketPattern::new(&self.ticket_project)
            .with_context(|| format!("invalid ticket_project {:?}", self.ticket_project))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn wakatime_client(&self) -> Result<WakaTimeClient> {
        let api_key = required(
            self.wakatime_api_key.as_deref(),
            "missing WakaTime API key (set WL_WAKATIME_API_KEY or config.toml)",
        )?;
        WakaTimeClient::new(&self.wakatime_url, api_key, self.request_timeout())
            .context("failed to create WakaTime client")
    }

    pub fn jira_client(&self) -> Result<JiraClient> {
        let url = required(
            self.jira_url.as_deref(),
            "missing Jira URL (set WL_JIRA_URL or config.toml)",
        )?;
        let username = required(
            self.jira_username.as_deref(),
            "missing Jira username (set WL_JIRA_USERNAME or config.toml)",
        )?;
        let token = required(
            self.jira_token.as_deref(),
            "missing Jira API token (set WL_JIRA_TOKEN or config.toml)",
        )?;
        JiraClient::new(url, username, token, self.request_timeout())
            .context("failed to create Jira client")
    }
}

fn required<'a>(value: Option<&'a str>, message: &'static str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow::anyhow!(message))
}

/// Returns the platform-specific config directory for wl.
///
/// On Linux: `~/.config/wl`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wl"))
}

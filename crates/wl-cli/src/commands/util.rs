//! Shared utilities for CLI commands.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use wl_core::{Heartbeat, SortedHeartbeats};

use crate::Config;
use crate::SourceArgs;
use crate::prompt::TerminalPrompter;

/// Pre-compiled regex for relative day parsing.
static RELATIVE_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+days?\s+ago$").unwrap());

/// Project offered when neither the command line nor the config names one.
const FALLBACK_PROJECT: &str = "backend";

/// Parse a day as either a calendar date or relative to `today`.
///
/// Supports:
/// - Calendar: "2026-01-15"
/// - Named: "today", "yesterday"
/// - Relative: "3 days ago"
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim();
    match s.to_lowercase().as_str() {
        "today" => return Ok(today),
        "yesterday" => return days_before(today, 1),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DAY_RE.captures(s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD (e.g., 2026-01-15), 'today', 'yesterday', or relative (e.g., '3 days ago')"
        );
    };

    let n: u64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;
    days_before(today, n)
}

fn days_before(today: NaiveDate, n: u64) -> Result<NaiveDate> {
    today
        .checked_sub_days(Days::new(n))
        .with_context(|| format!("Relative date too far back: {n} days ago"))
}

/// Formats seconds as a short human-readable duration.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    match (hours, minutes) {
        (0, 0) => format!("{secs}s"),
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Heartbeat files hold either the raw API payload or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum HeartbeatFile {
    Payload { data: Vec<Heartbeat> },
    List(Vec<Heartbeat>),
}

/// Reads heartbeats from a JSON file.
pub fn read_heartbeats(path: &Path) -> Result<Vec<Heartbeat>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file: HeartbeatFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse heartbeats in {}", path.display()))?;
    Ok(match file {
        HeartbeatFile::Payload { data } | HeartbeatFile::List(data) => data,
    })
}

/// Picks the project from the arguments, the config, or the operator.
pub fn resolve_project(args: &SourceArgs, config: &Config) -> Result<String> {
    if let Some(project) = args.project.as_ref().or(config.default_project.as_ref()) {
        return Ok(project.clone());
    }
    TerminalPrompter::stdio()
        .text("Enter the project name to track", FALLBACK_PROJECT)
        .context("failed to read project")?
        .context("no project given")
}

/// Loads one project's heartbeats for the requested day, sorted by time.
pub fn load_heartbeats(args: &SourceArgs, config: &Config) -> Result<SortedHeartbeats> {
    let date = parse_date(&args.date, Local::now().date_naive())?;
    let project = resolve_project(args, config)?;
    tracing::debug!(%date, project = %project, "loading heartbeats");

    if let Some(path) = &args.input {
        return Ok(SortedHeartbeats::new(read_heartbeats(path)?).for_project(&project));
    }

    let client = config.wakatime_client()?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime
        .block_on(client.project_heartbeats(date, &project))
        .context("failed to fetch heartbeats")
}

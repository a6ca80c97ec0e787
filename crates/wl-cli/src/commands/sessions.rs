//! Sessions command for showing what a log run would submit.
//!
//! This module implements `wl sessions`, which reconstructs the day's review
//! and development sessions without touching the ticket system.

use std::io::Write;

use anyhow::Result;
use chrono::SecondsFormat;
use wl_core::{ActivityReport, Session, classify};

use super::util::{format_duration, load_heartbeats};
use crate::{Config, SourceArgs};

pub fn run<W: Write>(writer: &mut W, args: &SourceArgs, json: bool, config: &Config) -> Result<()> {
    let heartbeats = load_heartbeats(args, config)?;
    let report = classify(&heartbeats, &config.thresholds());
    tracing::debug!(
        heartbeats = heartbeats.len(),
        pull_requests = report.pull_requests.len(),
        branches = report.development.len(),
        "classified activity"
    );

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_report(writer, &report)?;
    }
    Ok(())
}

/// Writes the report as aligned text in start order, durations rounded as they
/// would be logged.
pub fn write_report<W: Write>(writer: &mut W, report: &ActivityReport) -> Result<()> {
    if report.is_empty() {
        writeln!(writer, "No sessions found.")?;
        return Ok(());
    }

    write_section(writer, "Pull request reviews", &report.pull_requests_by_start())?;
    write_section(writer, "Branch development", &report.development_by_start())?;
    Ok(())
}

fn write_section<W: Write>(
    writer: &mut W,
    heading: &str,
    sessions: &[(&str, &Session)],
) -> Result<()> {
    if sessions.is_empty() {
        return Ok(());
    }

    writeln!(writer, "{heading}")?;
    for &(title, session) in sessions {
        let started = session.started_at().map_or_else(
            || "?".to_string(),
            |started| started.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        writeln!(
            writer,
            "  {started}  {:>7}  {title}",
            format_duration(session.rounded_duration_secs())
        )?;
    }
    Ok(())
}

//! Log command: resolve each session to a ticket and record it in Jira.

use std::io::Write;

use anyhow::{Result, bail};
use wl_core::{LogOptions, LogSummary, Outcome, TicketResolver, classify, log_activity};

use super::util::{format_duration, load_heartbeats};
use crate::prompt::TerminalPrompter;
use crate::tracker::JiraTracker;
use crate::{Config, SourceArgs};

pub fn run<W: Write>(
    writer: &mut W,
    args: &SourceArgs,
    dry_run: bool,
    config: &Config,
) -> Result<()> {
    let heartbeats = load_heartbeats(args, config)?;
    let report = classify(&heartbeats, &config.thresholds());
    if report.is_empty() {
        writeln!(writer, "No sessions to log.")?;
        return Ok(());
    }

    let mut resolver = TicketResolver::new(config.ticket_pattern()?);
    let mut tracker = JiraTracker::new(config.jira_client()?)?;
    let mut prompter = TerminalPrompter::stdio();

    let summary = log_activity(
        &report,
        &mut resolver,
        &mut prompter,
        &mut tracker,
        LogOptions { dry_run },
    );
    write_summary(writer, &summary)?;

    if summary.failed() > 0 {
        bail!("{} session(s) could not be logged", summary.failed());
    }
    Ok(())
}

/// Writes one line per session followed by the totals.
pub fn write_summary<W: Write>(writer: &mut W, summary: &LogSummary) -> Result<()> {
    for session in &summary.sessions {
        let label = format!("{} {}", session.source, session.title);
        match &session.outcome {
            Outcome::Logged(entry) => writeln!(
                writer,
                "logged   {:<8} {:>7}  {label}",
                entry.ticket.as_str(),
                format_duration(entry.duration_secs)
            )?,
            Outcome::Planned(entry) => writeln!(
                writer,
                "planned  {:<8} {:>7}  {label}",
                entry.ticket.as_str(),
                format_duration(entry.duration_secs)
            )?,
            Outcome::Skipped => writeln!(writer, "skipped  {:<8} {:>7}  {label}", "-", "-")?,
            Outcome::Failed(err) => {
                writeln!(writer, "failed   {:<8} {:>7}  {label}: {err}", "-", "-")?;
            }
        }
    }

    writeln!(
        writer,
        "Logged {}, planned {}, skipped {}, failed {}.",
        summary.logged(),
        summary.planned(),
        summary.skipped(),
        summary.failed()
    )?;
    Ok(())
}

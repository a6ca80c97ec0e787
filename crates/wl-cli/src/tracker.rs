//! Blocking Jira adapter for the work-log loop.

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use wl_client::JiraClient;
use wl_core::{BoxError, TicketChoice, TicketSearch, WorkLogEntry, WorkLogSink};

/// Drives [`JiraClient`] on its own runtime, one request at a time.
#[derive(Debug)]
pub struct JiraTracker {
    client: JiraClient,
    runtime: Runtime,
}

impl JiraTracker {
    pub fn new(client: JiraClient) -> Result<Self> {
        let runtime = Runtime::new().context("failed to initialize tokio runtime")?;
        Ok(Self { client, runtime })
    }
}

impl TicketSearch for JiraTracker {
    fn search(&mut self, query: &str) -> Result<Vec<TicketChoice>, BoxError> {
        Ok(self.runtime.block_on(self.client.search_similar(query)))
    }
}

impl WorkLogSink for JiraTracker {
    fn log_work(&mut self, entry: &WorkLogEntry) -> Result<(), BoxError> {
        self.runtime
            .block_on(self.client.log_work(entry))
            .map_err(Into::into)
    }
}

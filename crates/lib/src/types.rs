use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The external knowledge system a suggestion came from.
///
/// This is a closed set: every adapter declares exactly one of these tags,
/// and the aggregator's source weighting is keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSystem {
    IssueTracker,
    Wiki,
    CodeHost,
    ItsmKb,
}

impl fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceSystem::IssueTracker => "issue_tracker",
            SourceSystem::Wiki => "wiki",
            SourceSystem::CodeHost => "code_host",
            SourceSystem::ItsmKb => "itsm_kb",
        };
        write!(f, "{s}")
    }
}

/// One candidate knowledge item returned by a source for one query.
///
/// Suggestions are ephemeral: they live for the duration of a request and are
/// only ever persisted as part of a serialized [`CachedSuggestionBundle`]
/// payload, never as individual rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub system: SourceSystem,
    pub title: String,
    /// The source-native identifier (issue key, page id, KB number, ...).
    pub id: String,
    pub snippet: String,
    pub link: String,
    pub icon: String,
    pub actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// The search entrypoint request, as received from the surrounding system.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub incident_number: Option<String>,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// The search entrypoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<Suggestion>,
    pub total_found: usize,
    pub search_keywords: String,
    pub search_time_ms: u64,
    pub from_cache: bool,
}

/// A cached aggregation result, keyed by the keyword hash.
///
/// Timestamps are unix seconds. The suggestion list is stored as a JSON
/// payload column; at most one live row exists per hash because `put` is an
/// upsert on the primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSuggestionBundle {
    pub keyword_hash: String,
    pub keywords: String,
    pub suggestions: Vec<Suggestion>,
    pub search_time_ms: u64,
    pub total_found: usize,
    pub expires_at: i64,
    pub updated_at: i64,
}

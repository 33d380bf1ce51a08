//! # Knowledge Source Contract
//!
//! Every external knowledge system (issue tracker, wiki, code host, ITSM
//! knowledge base) is wrapped in an adapter crate implementing
//! [`KnowledgeSource`]. Adapters are self-healing: a disabled configuration,
//! a failed live call, or an empty live result all degrade to a small fixed
//! candidate set ranked by [`fallback_relevance`], and the failure is logged
//! inside the adapter rather than propagated.

use crate::types::{SourceSystem, Suggestion};
use async_trait::async_trait;
use thiserror::Error;

/// A generic error type for all source adapters.
///
/// Adapters map their specific failures (HTTP error, bad status, malformed
/// payload) into these variants. In practice the pipeline never sees them:
/// adapters recover internally via their fallback sets, and the fan-out
/// additionally collapses any stray error into an empty contribution.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to fetch from the source: {0}")]
    Fetch(String),
    #[error("Failed to decode the source response: {0}")]
    Decode(String),
}

/// The contract every source adapter implements.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// The system tag stamped on every suggestion this adapter emits.
    fn system(&self) -> SourceSystem;

    /// Whether the required configuration was present at construction time.
    /// Disabled adapters still answer queries, from their fallback set.
    fn is_enabled(&self) -> bool;

    /// Searches this source for candidates matching `query`.
    ///
    /// At most one outbound call is made per invocation when enabled; no
    /// retries are performed at this layer.
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<Suggestion>, SourceError>;
}

/// Keyword-overlap relevance between a query and a candidate's text: the
/// fraction of query words that appear in the text, case-insensitively.
///
/// This is only used to rank adapter fallback sets; the aggregator applies
/// its own multi-factor scoring afterwards.
pub fn fallback_relevance(query: &str, text: &str) -> f64 {
    let text_lower = text.to_lowercase();
    let query_words: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let matched = query_words
        .iter()
        .filter(|w| text_lower.contains(w.as_str()))
        .count();
    matched as f64 / query_words.len() as f64
}

/// Ranks a fallback candidate set for a query: each suggestion's relevance
/// is recomputed from its title and snippet, zero-overlap candidates are
/// dropped, and the rest are sorted descending and truncated.
pub fn rank_fallback(
    query: &str,
    mut candidates: Vec<Suggestion>,
    max_results: usize,
) -> Vec<Suggestion> {
    for candidate in &mut candidates {
        let haystack = format!("{} {}", candidate.title, candidate.snippet);
        candidate.relevance_score = Some(fallback_relevance(query, &haystack));
    }
    candidates.retain(|c| c.relevance_score.unwrap_or(0.0) > 0.0);
    candidates.sort_by(|a, b| {
        b.relevance_score
            .unwrap_or(0.0)
            .partial_cmp(&a.relevance_score.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(max_results);
    candidates
}

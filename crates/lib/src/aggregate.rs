//! # Result Aggregation
//!
//! This module merges the candidate suggestions produced by all source
//! adapters for one query. The steps, in order:
//!
//! 1.  **Deduplicate** near-identical titles using Jaccard similarity over
//!     normalized word sets. First occurrence wins.
//! 2.  **Score** each survivor from its relevance, source weight, recency,
//!     title/snippet shape, and technical-term density.
//! 3.  **Sort** by score descending and **truncate** to the caller's limit.
//!
//! The whole pass is pure and deterministic: the only time input is the
//! explicit `now` argument, so aggregating the same candidates twice yields
//! identical output.

use crate::types::{SourceSystem, Suggestion};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;

/// The aggregator's output for one query.
#[derive(Debug, Clone)]
pub struct Aggregated {
    /// Deduplicated, scored, sorted, truncated suggestions.
    pub suggestions: Vec<Suggestion>,
    /// The post-dedup, pre-truncation candidate count.
    pub total_found: usize,
}

/// Per-system score multipliers.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceWeights {
    #[serde(default = "default_issue_tracker_weight")]
    pub issue_tracker: f64,
    #[serde(default = "default_itsm_kb_weight")]
    pub itsm_kb: f64,
    #[serde(default = "default_wiki_weight")]
    pub wiki: f64,
    #[serde(default = "default_code_host_weight")]
    pub code_host: f64,
}

fn default_issue_tracker_weight() -> f64 {
    1.2
}
fn default_itsm_kb_weight() -> f64 {
    1.1
}
fn default_wiki_weight() -> f64 {
    1.0
}
fn default_code_host_weight() -> f64 {
    0.9
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            issue_tracker: default_issue_tracker_weight(),
            itsm_kb: default_itsm_kb_weight(),
            wiki: default_wiki_weight(),
            code_host: default_code_host_weight(),
        }
    }
}

impl SourceWeights {
    fn for_system(&self, system: SourceSystem) -> f64 {
        match system {
            SourceSystem::IssueTracker => self.issue_tracker,
            SourceSystem::ItsmKb => self.itsm_kb,
            SourceSystem::Wiki => self.wiki,
            SourceSystem::CodeHost => self.code_host,
        }
    }
}

/// All tunable constants of the dedup and scoring pass.
///
/// The defaults are the canonical values; deployments can override any of
/// them from the server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Candidates whose normalized-title Jaccard similarity against an
    /// already-accepted title exceeds this are dropped.
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f64,
    /// Multiplier applied to the 0..1 relevance score before all boosts.
    #[serde(default = "default_base_scale")]
    pub base_scale: f64,
    #[serde(default)]
    pub source_weights: SourceWeights,
    #[serde(default = "default_fresh_days")]
    pub fresh_days: i64,
    #[serde(default = "default_fresh_boost")]
    pub fresh_boost: f64,
    #[serde(default = "default_recent_days")]
    pub recent_days: i64,
    #[serde(default = "default_recent_boost")]
    pub recent_boost: f64,
    /// Applied when the title length is strictly between 20 and 100 chars.
    #[serde(default = "default_title_length_boost")]
    pub title_length_boost: f64,
    /// Applied when the snippet is longer than 50 chars.
    #[serde(default = "default_snippet_length_boost")]
    pub snippet_length_boost: f64,
    /// Per distinct technical term found in the title.
    #[serde(default = "default_technical_term_boost")]
    pub technical_term_boost: f64,
    #[serde(default = "default_technical_terms")]
    pub technical_terms: Vec<String>,
}

fn default_dedup_threshold() -> f64 {
    0.8
}
fn default_base_scale() -> f64 {
    40.0
}
fn default_fresh_days() -> i64 {
    7
}
fn default_fresh_boost() -> f64 {
    1.3
}
fn default_recent_days() -> i64 {
    30
}
fn default_recent_boost() -> f64 {
    1.1
}
fn default_title_length_boost() -> f64 {
    1.05
}
fn default_snippet_length_boost() -> f64 {
    1.02
}
fn default_technical_term_boost() -> f64 {
    0.1
}
fn default_technical_terms() -> Vec<String> {
    [
        "error", "fix", "issue", "problem", "solution", "resolved", "patch", "update",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            dedup_threshold: default_dedup_threshold(),
            base_scale: default_base_scale(),
            source_weights: SourceWeights::default(),
            fresh_days: default_fresh_days(),
            fresh_boost: default_fresh_boost(),
            recent_days: default_recent_days(),
            recent_boost: default_recent_boost(),
            title_length_boost: default_title_length_boost(),
            snippet_length_boost: default_snippet_length_boost(),
            technical_term_boost: default_technical_term_boost(),
            technical_terms: default_technical_terms(),
        }
    }
}

/// Normalizes a title for comparison: lowercase, punctuation stripped,
/// whitespace collapsed.
pub fn normalize_title(title: &str) -> String {
    let lowered: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn word_set(normalized_title: &str) -> HashSet<String> {
    normalized_title
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// Jaccard similarity of two word sets: |intersection| / |union|.
///
/// Two empty sets are considered identical (1.0), so blank titles collapse
/// into one.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Computes the final multi-factor score for one suggestion.
fn score_suggestion(suggestion: &Suggestion, now: DateTime<Utc>, config: &ScoringConfig) -> f64 {
    // A candidate whose source reported no relevance sits in the middle of
    // the 0..1 band rather than being zeroed out.
    let relevance = suggestion.relevance_score.unwrap_or(0.5).clamp(0.0, 1.0);
    let mut score = relevance * config.base_scale;

    score *= config.source_weights.for_system(suggestion.system);

    if let Some(created) = suggestion.created_date {
        let age_days = now.signed_duration_since(created).num_days();
        if age_days < config.fresh_days {
            score *= config.fresh_boost;
        } else if age_days < config.recent_days {
            score *= config.recent_boost;
        }
    }

    let title_len = suggestion.title.chars().count();
    if title_len > 20 && title_len < 100 {
        score *= config.title_length_boost;
    }
    if suggestion.snippet.chars().count() > 50 {
        score *= config.snippet_length_boost;
    }

    let title_lower = suggestion.title.to_lowercase();
    let term_hits = config
        .technical_terms
        .iter()
        .filter(|term| title_lower.contains(term.as_str()))
        .count();
    score *= 1.0 + config.technical_term_boost * term_hits as f64;

    (score * 100.0).round() / 100.0
}

/// Deduplicates, scores, sorts, and truncates the combined candidate list.
///
/// `candidates` must be the concatenation of all adapters' outputs in
/// dispatch order: when two near-duplicate titles arrive from different
/// sources, the earlier one is kept regardless of how the later one would
/// have scored.
pub fn aggregate(
    candidates: Vec<Suggestion>,
    max_results: usize,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> Aggregated {
    let mut accepted: Vec<Suggestion> = Vec::new();
    let mut accepted_word_sets: Vec<HashSet<String>> = Vec::new();

    for candidate in candidates {
        let words = word_set(&normalize_title(&candidate.title));
        let is_duplicate = accepted_word_sets
            .iter()
            .any(|seen| jaccard(seen, &words) > config.dedup_threshold);
        if is_duplicate {
            continue;
        }
        accepted_word_sets.push(words);
        accepted.push(candidate);
    }

    let total_found = accepted.len();

    for suggestion in &mut accepted {
        suggestion.relevance_score = Some(score_suggestion(suggestion, now, config));
    }

    accepted.sort_by(|a, b| {
        let score_a = a.relevance_score.unwrap_or(0.0);
        let score_b = b.relevance_score.unwrap_or(0.0);
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    accepted.truncate(max_results);

    Aggregated {
        suggestions: accepted,
        total_found,
    }
}

//! # Search Pipeline
//!
//! The orchestration layer for one suggestion request: validate, extract
//! keywords, probe the cache, fan out to every source in parallel, aggregate,
//! write back, respond. Every failure along the way except an empty query is
//! recovered into a best-effort (possibly empty) result; logging is the sole
//! side effect of recovery.

use crate::{
    aggregate::{aggregate, ScoringConfig},
    cache::SuggestionCache,
    keywords::KeywordExtractor,
    sources::KnowledgeSource,
    types::{CachedSuggestionBundle, Suggestion, SuggestionRequest, SuggestionResponse},
};
use chrono::Utc;
use std::{sync::Arc, time::Duration, time::Instant};
use thiserror::Error;
use tracing::{info, warn};

/// Custom error types for the search pipeline.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The only caller-visible failure: nothing to search for. Source,
    /// cache, and embedding problems never surface here.
    #[error("query text is empty")]
    EmptyQuery,
}

/// Tunables for the pipeline, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How long a cached bundle stays live.
    pub cache_ttl: Duration,
    /// Per-adapter call budget; a slower source contributes nothing.
    pub source_timeout: Duration,
    /// Result count when the request does not specify one.
    pub default_max_results: usize,
    pub scoring: ScoringConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30 * 60),
            source_timeout: Duration::from_secs(5),
            default_max_results: 10,
            scoring: ScoringConfig::default(),
        }
    }
}

/// The suggestion pipeline. Constructed once at process start and shared.
pub struct SuggestionPipeline {
    cache: SuggestionCache,
    sources: Vec<Arc<dyn KnowledgeSource>>,
    extractor: Arc<dyn KeywordExtractor>,
    config: PipelineConfig,
}

impl SuggestionPipeline {
    pub fn new(
        cache: SuggestionCache,
        sources: Vec<Arc<dyn KnowledgeSource>>,
        extractor: Arc<dyn KeywordExtractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            cache,
            sources,
            extractor,
            config,
        }
    }

    /// Runs the full pipeline for one request.
    pub async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, SearchError> {
        let started = Instant::now();

        let query_text = match &request.description {
            Some(description) => format!("{} {}", request.short_description, description),
            None => request.short_description.clone(),
        };
        let query_text = query_text.trim().to_string();
        if query_text.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let max_results = request
            .max_results
            .unwrap_or(self.config.default_max_results);

        let terms = self.extractor.extract(&query_text);
        let search_keywords = if terms.is_empty() {
            query_text.clone()
        } else {
            terms
                .iter()
                .map(|t| t.term.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };

        info!(
            incident = request.incident_number.as_deref().unwrap_or("-"),
            keywords = %search_keywords,
            "Searching knowledge sources"
        );

        // Cache probe. A read failure is a miss, not an error.
        let keyword_hash = SuggestionCache::keyword_hash(&search_keywords);
        match self.cache.get(&keyword_hash).await {
            Ok(Some(bundle)) => {
                info!(%keyword_hash, "Serving suggestions from cache");
                return Ok(SuggestionResponse {
                    suggestions: bundle.suggestions,
                    total_found: bundle.total_found,
                    search_keywords,
                    search_time_ms: started.elapsed().as_millis() as u64,
                    from_cache: true,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Cache read failed, treating as miss: {e}");
            }
        }

        let candidates = self.fan_out(&search_keywords, max_results).await;
        let outcome = aggregate(candidates, max_results, Utc::now(), &self.config.scoring);
        let search_time_ms = started.elapsed().as_millis() as u64;

        let now = Utc::now().timestamp();
        let bundle = CachedSuggestionBundle {
            keyword_hash,
            keywords: search_keywords.clone(),
            suggestions: outcome.suggestions.clone(),
            search_time_ms,
            total_found: outcome.total_found,
            expires_at: now + self.config.cache_ttl.as_secs() as i64,
            updated_at: now,
        };
        if let Err(e) = self.cache.put(&bundle).await {
            warn!("Cache write failed, returning uncached result: {e}");
        }

        Ok(SuggestionResponse {
            suggestions: outcome.suggestions,
            total_found: outcome.total_found,
            search_keywords,
            search_time_ms,
            from_cache: false,
        })
    }

    /// Dispatches all sources concurrently and concatenates their outputs in
    /// dispatch order. Total latency is bounded by the slowest adapter (or
    /// its timeout) rather than the sum; a slow, panicking, or failing
    /// adapter contributes an empty list.
    async fn fan_out(&self, query: &str, max_results: usize) -> Vec<Suggestion> {
        let mut handles = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let source = Arc::clone(source);
            let query = query.to_string();
            let timeout = self.config.source_timeout;
            handles.push(tokio::spawn(async move {
                let system = source.system();
                match tokio::time::timeout(timeout, source.search(&query, max_results)).await {
                    Ok(Ok(suggestions)) => suggestions,
                    Ok(Err(e)) => {
                        warn!(%system, "Source search failed: {e}");
                        Vec::new()
                    }
                    Err(_) => {
                        warn!(%system, timeout_ms = timeout.as_millis() as u64, "Source search timed out");
                        Vec::new()
                    }
                }
            }));
        }

        let mut candidates = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(suggestions) => candidates.extend(suggestions),
                Err(e) => warn!("Source task panicked: {e}"),
            }
        }
        candidates
    }
}

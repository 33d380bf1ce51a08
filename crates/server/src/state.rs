//! # Application State
//!
//! Builds the shared, clonable [`AppState`] that every handler receives.
//! All wiring happens here once at startup: storage, cache, vector index,
//! the four knowledge source adapters, and the suggestion pipeline.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use linkhint::{
    cache::SuggestionCache,
    embedding::{EmbeddingProvider, HttpEmbeddingProvider},
    keywords::TermFrequencyExtractor,
    search::{PipelineConfig, SuggestionPipeline},
    sources::KnowledgeSource,
    storage::StorageProvider,
    vector::VectorIndex,
};
use linkhint_confluence::ConfluenceSource;
use linkhint_github::GithubSource;
use linkhint_jira::JiraSource;
use linkhint_servicenow::ServiceNowSource;
use std::{sync::Arc, time::Duration};
use tracing::info;

/// Shared application state, cheap to clone into each request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: SuggestionCache,
    pub vector_index: VectorIndex,
    pub pipeline: Arc<SuggestionPipeline>,
    pub embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
}

/// Constructs the full application state from a resolved configuration.
pub async fn build_app_state(config: AppConfig) -> Result<AppState> {
    let storage = StorageProvider::new(&config.db_url)
        .await
        .context("Failed to open the application database")?;
    storage
        .initialize_schema()
        .await
        .context("Failed to initialize the database schema")?;

    let cache = SuggestionCache::new(&storage.db);
    let vector_index = VectorIndex::new(&storage.db);

    let sources: Vec<Arc<dyn KnowledgeSource>> = vec![
        Arc::new(JiraSource::new(&config.sources.jira)),
        Arc::new(ServiceNowSource::new(&config.sources.servicenow)),
        Arc::new(ConfluenceSource::new(&config.sources.confluence)),
        Arc::new(GithubSource::new(&config.sources.github)),
    ];
    for source in &sources {
        info!(
            system = %source.system(),
            enabled = source.is_enabled(),
            "Registered knowledge source"
        );
    }

    let pipeline_config = PipelineConfig {
        cache_ttl: Duration::from_secs(config.cache.ttl_minutes * 60),
        source_timeout: Duration::from_millis(config.sources.timeout_ms),
        default_max_results: config.default_max_results,
        scoring: config.scoring.clone(),
    };
    let pipeline = Arc::new(SuggestionPipeline::new(
        cache.clone(),
        sources,
        Arc::new(TermFrequencyExtractor::default()),
        pipeline_config,
    ));

    let embedding_provider: Option<Arc<dyn EmbeddingProvider>> = match &config.embedding {
        Some(embedding) => {
            info!(model = %embedding.model_name, "Embedding provider configured");
            Some(Arc::new(HttpEmbeddingProvider::new(
                embedding.api_url.clone(),
                embedding.model_name.clone(),
                embedding.api_key.clone(),
            )?))
        }
        None => {
            info!("No embedding provider configured; vector search is unavailable");
            None
        }
    };

    Ok(AppState {
        config: Arc::new(config),
        cache,
        vector_index,
        pipeline,
        embedding_provider,
    })
}

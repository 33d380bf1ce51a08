//! # API Handlers
//!
//! One function per route. Handlers stay thin: deserialize, delegate to the
//! library, map errors through [`AppError`].

use crate::{
    errors::AppError,
    state::AppState,
    types::{
        CacheCleanupResponse, ChunkMatchResponse, IndexChunksRequest, IndexChunksResponse,
        VectorSearchRequest,
    },
};
use axum::{extract::State, Json};
use linkhint::types::{SuggestionRequest, SuggestionResponse};
use tracing::info;

/// Handler for the root path, providing a simple status message.
pub async fn root_handler() -> &'static str {
    "linkhint server is running."
}

/// Handler for the `/health` endpoint.
pub async fn health_handler() -> &'static str {
    "OK"
}

/// `POST /search/suggestions`: runs the full suggestion pipeline.
pub async fn suggest_handler(
    State(state): State<AppState>,
    Json(request): Json<SuggestionRequest>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let response = state.pipeline.suggest(&request).await?;
    Ok(Json(response))
}

/// `POST /search/vector`: embeds the query text and scans the chunk index.
///
/// Requires an embedding provider in the configuration; without one the
/// route answers 400 rather than pretending to search.
pub async fn vector_search_handler(
    State(state): State<AppState>,
    Json(request): Json<VectorSearchRequest>,
) -> Result<Json<Vec<ChunkMatchResponse>>, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("query text is empty".to_string()));
    }
    let Some(provider) = &state.embedding_provider else {
        return Err(AppError::InvalidInput(
            "no embedding provider is configured".to_string(),
        ));
    };

    let query_vector = provider.embed(query).await?;
    let matches = state.vector_index.search(&query_vector, request.limit).await?;
    Ok(Json(
        matches
            .into_iter()
            .map(|m| ChunkMatchResponse {
                item_id: m.item_id,
                chunk_index: m.chunk_index,
                content: m.content,
                similarity: m.similarity,
            })
            .collect(),
    ))
}

/// `POST /index/chunks`: stores chunks for a knowledge item, embedding any
/// chunk that arrives without a vector.
pub async fn index_chunks_handler(
    State(state): State<AppState>,
    Json(request): Json<IndexChunksRequest>,
) -> Result<Json<IndexChunksResponse>, AppError> {
    if request.item_id.trim().is_empty() {
        return Err(AppError::InvalidInput("item_id is empty".to_string()));
    }

    if request.replace {
        let removed = state.vector_index.delete_item(&request.item_id).await?;
        info!(item_id = %request.item_id, removed, "Cleared existing chunks before re-index");
    }

    let mut indexed = 0;
    for chunk in &request.chunks {
        let embedding = match &chunk.embedding {
            Some(vector) => Some(vector.clone()),
            None => match &state.embedding_provider {
                Some(provider) => Some(provider.embed(&chunk.content).await?),
                None => None,
            },
        };
        state
            .vector_index
            .upsert_chunk(
                &request.item_id,
                chunk.chunk_index,
                &chunk.content,
                embedding.as_deref(),
            )
            .await?;
        indexed += 1;
    }

    info!(item_id = %request.item_id, indexed, "Indexed knowledge chunks");
    Ok(Json(IndexChunksResponse { indexed }))
}

/// `POST /admin/cache/cleanup`: removes expired suggestion bundles.
///
/// Expired rows are already invisible to readers; this reclaims the space.
pub async fn cache_cleanup_handler(
    State(state): State<AppState>,
) -> Result<Json<CacheCleanupResponse>, AppError> {
    let removed = state.cache.cleanup_expired().await?;
    info!(removed, "Cache cleanup sweep complete");
    Ok(Json(CacheCleanupResponse { removed }))
}

//! Wire types for the server's own routes. The suggestion request/response
//! pair lives in the `linkhint` library since the pipeline owns it; only the
//! vector-index and admin payloads are defined here.

use serde::{Deserialize, Serialize};

/// Request body for `POST /search/vector`.
#[derive(Deserialize, Debug)]
pub struct VectorSearchRequest {
    pub query: String,
    #[serde(default = "default_vector_limit")]
    pub limit: usize,
}

fn default_vector_limit() -> usize {
    5
}

/// One scored chunk in a vector search response.
#[derive(Serialize, Debug)]
pub struct ChunkMatchResponse {
    pub item_id: String,
    pub chunk_index: i64,
    pub content: String,
    pub similarity: f64,
}

/// Request body for `POST /index/chunks`.
#[derive(Deserialize, Debug)]
pub struct IndexChunksRequest {
    pub item_id: String,
    /// When true, existing chunks for the item are removed first so stale
    /// trailing chunks from a longer previous version cannot linger.
    #[serde(default)]
    pub replace: bool,
    pub chunks: Vec<ChunkPayload>,
}

/// One chunk to index. When `embedding` is absent the server computes one
/// through the configured embedding provider.
#[derive(Deserialize, Debug)]
pub struct ChunkPayload {
    pub chunk_index: i64,
    pub content: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Response body for `POST /index/chunks`.
#[derive(Serialize, Debug)]
pub struct IndexChunksResponse {
    pub indexed: usize,
}

/// Response body for `POST /admin/cache/cleanup`.
#[derive(Serialize, Debug)]
pub struct CacheCleanupResponse {
    pub removed: u64,
}

//! # Vector Similarity Index
//!
//! Chunk-level embedding store supporting brute-force cosine-similarity
//! retrieval. The linear scan is deliberate: at the target scale (thousands
//! of chunks) it is fast enough, and the external contract would not change
//! if an approximate nearest-neighbor structure were substituted later.

use thiserror::Error;
use tracing::{debug, warn};
use turso::{params, Database, Value as TursoValue};

/// Custom error types for the vector index.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
}

/// One scored chunk from a similarity search, mapped back to its owning item.
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub item_id: String,
    pub chunk_index: i64,
    pub content: String,
    pub similarity: f64,
}

/// The chunk store. Cloning shares the underlying database handle.
#[derive(Clone)]
pub struct VectorIndex {
    db: Database,
}

impl VectorIndex {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Inserts or replaces a chunk, keyed by `(item_id, chunk_index)`.
    ///
    /// The embedding may be absent when the async indexing pass has not
    /// produced a vector yet; such chunks are invisible to `search` until a
    /// later upsert fills the column in.
    pub async fn upsert_chunk(
        &self,
        item_id: &str,
        chunk_index: i64,
        content: &str,
        embedding: Option<&[f32]>,
    ) -> Result<(), VectorError> {
        let conn = self.db.connect()?;
        let embedding_blob: Option<Vec<u8>> =
            embedding.map(|v| v.iter().flat_map(|f| f.to_le_bytes()).collect());

        conn.execute(
            "INSERT INTO knowledge_chunks (item_id, chunk_index, content, embedding)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(item_id, chunk_index) DO UPDATE SET
                 content = excluded.content,
                 embedding = excluded.embedding",
            params![item_id, chunk_index, content, embedding_blob],
        )
        .await?;
        Ok(())
    }

    /// Removes all chunks for an item. Used when the owning knowledge item
    /// is deleted or about to be re-indexed.
    pub async fn delete_item(&self, item_id: &str) -> Result<u64, VectorError> {
        let conn = self.db.connect()?;
        let removed = conn
            .execute(
                "DELETE FROM knowledge_chunks WHERE item_id = ?",
                params![item_id],
            )
            .await?;
        Ok(removed)
    }

    /// Scans every embedded chunk and returns the `limit` most similar ones,
    /// sorted by cosine similarity descending.
    ///
    /// Chunks with a malformed embedding (blob length not a multiple of 4,
    /// or a dimension mismatch with the query) are skipped with a warning,
    /// never fatal to the scan.
    pub async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ChunkMatch>, VectorError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                "SELECT item_id, chunk_index, content, embedding
                 FROM knowledge_chunks
                 WHERE embedding IS NOT NULL",
                (),
            )
            .await?;

        let mut matches: Vec<ChunkMatch> = Vec::new();
        while let Some(row) = rows.next().await? {
            let item_id = match row.get_value(0)? {
                TursoValue::Text(s) => s,
                _ => String::new(),
            };
            let chunk_index = match row.get_value(1)? {
                TursoValue::Integer(i) => i,
                _ => 0,
            };
            let content = match row.get_value(2)? {
                TursoValue::Text(s) => s,
                _ => String::new(),
            };
            let blob = match row.get_value(3)? {
                TursoValue::Blob(b) => b,
                _ => continue,
            };

            let Some(embedding) = decode_embedding(&blob) else {
                warn!(%item_id, chunk_index, "Skipping chunk with malformed embedding");
                continue;
            };
            if embedding.len() != query.len() {
                warn!(
                    %item_id,
                    chunk_index,
                    chunk_dims = embedding.len(),
                    query_dims = query.len(),
                    "Skipping chunk with mismatched embedding dimensions"
                );
                continue;
            }

            matches.push(ChunkMatch {
                item_id,
                chunk_index,
                content,
                similarity: cosine_similarity(query, &embedding),
            });
        }

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);
        debug!(count = matches.len(), "Vector scan complete");
        Ok(matches)
    }
}

fn decode_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.is_empty() || blob.len() % 4 != 0 {
        return None;
    }
    Some(
        blob.chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

/// Cosine similarity of two equal-length vectors.
///
/// When either vector is all-zero the norm product is replaced with 1.0, so
/// the result is 0.0 instead of a division by zero. An identical non-zero
/// pair yields exactly 1.0 within floating tolerance.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    let denom = if denom == 0.0 { 1.0 } else { denom };
    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_bounds_and_identity() {
        let a = [0.3f32, 0.4, 0.1];
        let b = [-0.7f32, 0.2, 0.9];
        let sim = cosine_similarity(&a, &b);
        assert!((-1.0..=1.0).contains(&sim));
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        let zero = [0.0f32; 3];
        let b = [1.0f32, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &b), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_negative_one() {
        let a = [1.0f32, -2.0, 3.0];
        let b = [-1.0f32, 2.0, -3.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn decode_rejects_truncated_blobs() {
        assert!(decode_embedding(&[1, 2, 3]).is_none());
        assert!(decode_embedding(&[]).is_none());
        assert_eq!(
            decode_embedding(&1.0f32.to_le_bytes()),
            Some(vec![1.0f32])
        );
    }
}

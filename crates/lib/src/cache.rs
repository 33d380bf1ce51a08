//! # Suggestion Cache
//!
//! A hash-keyed, TTL-bound store that sits in front of the source fan-out.
//! The key is a SHA-256 digest of the normalized keyword string, so queries
//! that are equal up to case and surrounding whitespace land on one row.

use crate::types::{CachedSuggestionBundle, Suggestion};
use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use turso::{params, Database, Value as TursoValue};

/// Custom error types for cache reads and writes.
///
/// Callers treat a failed read as a cache miss and a failed write as
/// non-fatal; a search is never failed by this error.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Failed to (de)serialize cached payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The cache store. Cloning shares the underlying database handle.
#[derive(Clone)]
pub struct SuggestionCache {
    db: Database,
}

impl SuggestionCache {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Derives the cache key for a keyword string.
    ///
    /// The input is trimmed and lowercased before hashing, guaranteeing
    /// `hash("Database Timeout") == hash("  database timeout  ")`.
    pub fn keyword_hash(keywords: &str) -> String {
        let normalized = keywords.trim().to_lowercase();
        let digest = Sha256::digest(normalized.as_bytes());
        format!("{digest:x}")
    }

    /// Fetches the live bundle for a hash, if any.
    ///
    /// A row whose `expires_at` has passed is invisible here but is not
    /// deleted; removal is the job of [`cleanup_expired`](Self::cleanup_expired).
    pub async fn get(&self, keyword_hash: &str) -> Result<Option<CachedSuggestionBundle>, CacheError> {
        let conn = self.db.connect()?;
        let now = Utc::now().timestamp();

        let mut stmt = conn
            .prepare(
                "SELECT keywords, payload, search_time_ms, total_found, expires_at, updated_at
                 FROM suggestion_cache
                 WHERE keyword_hash = ? AND expires_at > ?",
            )
            .await?;
        let mut rows = stmt.query(params![keyword_hash, now]).await?;

        let Some(row) = rows.next().await? else {
            debug!(%keyword_hash, "Cache miss");
            return Ok(None);
        };

        let keywords = match row.get_value(0)? {
            TursoValue::Text(s) => s,
            _ => String::new(),
        };
        let payload = match row.get_value(1)? {
            TursoValue::Text(s) => s,
            _ => String::new(),
        };
        let search_time_ms = match row.get_value(2)? {
            TursoValue::Integer(i) => i.max(0) as u64,
            _ => 0,
        };
        let total_found = match row.get_value(3)? {
            TursoValue::Integer(i) => i.max(0) as usize,
            _ => 0,
        };
        let expires_at = match row.get_value(4)? {
            TursoValue::Integer(i) => i,
            _ => 0,
        };
        let updated_at = match row.get_value(5)? {
            TursoValue::Integer(i) => i,
            _ => 0,
        };

        let suggestions: Vec<Suggestion> = serde_json::from_str(&payload)?;
        debug!(%keyword_hash, count = suggestions.len(), "Cache hit");

        Ok(Some(CachedSuggestionBundle {
            keyword_hash: keyword_hash.to_string(),
            keywords,
            suggestions,
            search_time_ms,
            total_found,
            expires_at,
            updated_at,
        }))
    }

    /// Stores a bundle, overwriting any existing row for the same hash in
    /// full. This upsert is the reason a hash can never accumulate a second
    /// row, expired or live.
    pub async fn put(&self, bundle: &CachedSuggestionBundle) -> Result<(), CacheError> {
        let conn = self.db.connect()?;
        let payload = serde_json::to_string(&bundle.suggestions)?;

        conn.execute(
            "INSERT INTO suggestion_cache
                 (keyword_hash, keywords, payload, search_time_ms, total_found, expires_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(keyword_hash) DO UPDATE SET
                 keywords = excluded.keywords,
                 payload = excluded.payload,
                 search_time_ms = excluded.search_time_ms,
                 total_found = excluded.total_found,
                 expires_at = excluded.expires_at,
                 updated_at = excluded.updated_at",
            params![
                bundle.keyword_hash.clone(),
                bundle.keywords.clone(),
                payload,
                bundle.search_time_ms as i64,
                bundle.total_found as i64,
                bundle.expires_at,
                bundle.updated_at
            ],
        )
        .await?;

        Ok(())
    }

    /// Deletes every expired row and returns the count removed.
    ///
    /// Idempotent: running it repeatedly, or concurrently with reads and
    /// writes, is safe, and an empty sweep is not an error.
    pub async fn cleanup_expired(&self) -> Result<u64, CacheError> {
        let conn = self.db.connect()?;
        let now = Utc::now().timestamp();
        let removed = conn
            .execute(
                "DELETE FROM suggestion_cache WHERE expires_at <= ?",
                params![now],
            )
            .await?;
        if removed > 0 {
            debug!(removed, "Removed expired cache entries");
        }
        Ok(removed)
    }
}

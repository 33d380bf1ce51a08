//! # SQLite Schema
//!
//! This module centralizes the table creation statements so that the
//! application startup path and the test harnesses initialize an identical
//! schema.

/// The suggestion cache. One row per keyword hash; `put` upserts on the
/// primary key so a hash can never accumulate duplicate rows.
pub const CREATE_SUGGESTION_CACHE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS suggestion_cache (
        keyword_hash    TEXT PRIMARY KEY,
        keywords        TEXT NOT NULL,
        payload         TEXT NOT NULL,
        search_time_ms  INTEGER NOT NULL,
        total_found     INTEGER NOT NULL,
        expires_at      INTEGER NOT NULL,
        updated_at      INTEGER NOT NULL
    );";

/// Knowledge chunks with their embeddings. The embedding column is nullable:
/// a chunk whose async indexing pass has not completed yet simply has no
/// vector and is skipped during similarity search.
pub const CREATE_KNOWLEDGE_CHUNKS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS knowledge_chunks (
        item_id     TEXT NOT NULL,
        chunk_index INTEGER NOT NULL,
        content     TEXT NOT NULL,
        embedding   BLOB,
        PRIMARY KEY (item_id, chunk_index)
    );";

pub const CREATE_CACHE_EXPIRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_suggestion_cache_expires_at ON suggestion_cache (expires_at);";

/// Every statement needed to bring a fresh database up to the current schema.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_SUGGESTION_CACHE_TABLE,
    CREATE_KNOWLEDGE_CHUNKS_TABLE,
    CREATE_CACHE_EXPIRY_INDEX,
];

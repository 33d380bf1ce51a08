use crate::errors::StorageError;
use std::fmt::{self, Debug};
use turso::Database;

pub mod sql;

/// A provider for the local SQLite database used by the suggestion cache and
/// the vector index.
///
/// The provider holds a `Database` instance, which manages a connection pool.
/// When cloned, it shares the same underlying database, so the cache and the
/// vector index can hold independent handles to one store and tolerate
/// concurrent reads and upserts.
#[derive(Clone)]
pub struct StorageProvider {
    pub db: Database,
}

impl StorageProvider {
    /// Creates a new `StorageProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a
    ///   unique, isolated in-memory database. To share an in-memory database
    ///   across components (e.g., in tests), create one provider and then
    ///   `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, StorageError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        // Enable WAL mode for better concurrency on file-backed databases.
        // It has no effect on in-memory databases but is safe to run.
        let conn = db
            .connect()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Ensures that all required tables and indexes exist.
    /// This function is idempotent and safe to call on every startup.
    pub async fn initialize_schema(&self) -> Result<(), StorageError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ())
                .await
                .map_err(|e| StorageError::Operation(e.to_string()))?;
        }
        Ok(())
    }
}

impl Debug for StorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageProvider").finish_non_exhaustive()
    }
}

impl AsRef<Database> for StorageProvider {
    fn as_ref(&self) -> &Database {
        &self.db
    }
}

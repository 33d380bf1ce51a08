use thiserror::Error;

/// Errors for the shared storage provider.
///
/// Component-specific failures (cache, vector index, sources) carry their own
/// error enums in their own modules; this type only covers opening the
/// database and running the schema migration.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage connection failed: {0}")]
    Connection(String),
    #[error("Storage operation failed: {0}")]
    Operation(String),
}

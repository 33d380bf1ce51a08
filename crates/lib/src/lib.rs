//! # Incident-to-Knowledge Linking
//!
//! This crate provides the core pipeline for linking free-text IT incident
//! descriptions to relevant items in external knowledge systems (issue
//! trackers, wikis, code hosts, ITSM knowledge bases).
//!
//! The flow for one search request:
//! 1.  **Keyword Extraction**: weighted terms are derived from the incident text.
//! 2.  **Cache Probe**: a content hash of the keywords is checked against the
//!     suggestion cache; a live entry short-circuits the fan-out entirely.
//! 3.  **Parallel Fan-Out**: every configured [`sources::KnowledgeSource`] is
//!     queried concurrently, each bounded by its own timeout.
//! 4.  **Aggregation**: candidates are deduplicated by title similarity,
//!     scored, sorted, and truncated.
//! 5.  **Cache Write-Back**: the aggregated bundle is stored with a TTL.
//!
//! A separate vector similarity path ([`vector::VectorIndex`]) ranks stored
//! knowledge chunks against a query embedding and can supplement the
//! adapter-based results.

pub mod aggregate;
pub mod cache;
pub mod embedding;
pub mod errors;
pub mod keywords;
pub mod search;
pub mod sources;
pub mod storage;
pub mod types;
pub mod vector;

pub use errors::StorageError;
pub use search::{PipelineConfig, SearchError, SuggestionPipeline};
pub use storage::StorageProvider;
pub use types::{SourceSystem, Suggestion, SuggestionRequest, SuggestionResponse};

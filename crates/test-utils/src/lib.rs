use anyhow::Result;
use async_trait::async_trait;
use linkhint::embedding::{EmbeddingError, EmbeddingProvider};
use linkhint::sources::{KnowledgeSource, SourceError};
use linkhint::storage::StorageProvider;
use linkhint::types::{SourceSystem, Suggestion};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub provider: StorageProvider,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database and initializes the schema.
    pub async fn new() -> Result<Self> {
        let provider = StorageProvider::new(":memory:").await?;
        provider.initialize_schema().await?;
        Ok(Self { provider })
    }
}

// --- Mock Embedding Provider ---

/// A deterministic stand-in for the external embedding service.
///
/// Returns a pre-programmed vector for known inputs and a fixed default for
/// everything else, and records every call for assertions.
#[derive(Clone)]
pub struct MockEmbeddingProvider {
    responses: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    default: Vec<f32>,
}

impl MockEmbeddingProvider {
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            default,
        }
    }

    /// Pre-programs a vector for a specific input text.
    pub fn add_response(&self, input: &str, vector: Vec<f32>) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(input.to_string(), vector);
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, input: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.lock().unwrap().push(input.to_string());
        let responses = self.responses.lock().unwrap();
        Ok(responses.get(input).cloned().unwrap_or_else(|| self.default.clone()))
    }
}

// --- Static Knowledge Source ---

/// A source that returns a fixed suggestion list for every query.
pub struct StaticSource {
    system: SourceSystem,
    suggestions: Vec<Suggestion>,
}

impl StaticSource {
    pub fn new(system: SourceSystem, suggestions: Vec<Suggestion>) -> Self {
        Self {
            system,
            suggestions,
        }
    }
}

#[async_trait]
impl KnowledgeSource for StaticSource {
    fn system(&self) -> SourceSystem {
        self.system
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> Result<Vec<Suggestion>, SourceError> {
        Ok(self.suggestions.clone())
    }
}

/// Builds a plain suggestion for tests that only care about a title.
pub fn sample_suggestion(system: SourceSystem, title: &str, id: &str) -> Suggestion {
    Suggestion {
        system,
        title: title.to_string(),
        id: id.to_string(),
        snippet: "A snippet long enough to look like a real excerpt from a document.".to_string(),
        link: format!("https://example.com/{id}"),
        icon: system.to_string(),
        actions: vec!["attach".to_string(), "open".to_string()],
        relevance_score: Some(0.7),
        created_date: None,
        author: None,
    }
}

//! # Suggestion Cache Tests
//!
//! Covers the TTL visibility rules, the upsert invariant, keyword hashing,
//! and the expired-row sweep.

use anyhow::Result;
use chrono::Utc;
use linkhint::cache::SuggestionCache;
use linkhint::storage::StorageProvider;
use linkhint::types::{CachedSuggestionBundle, SourceSystem, Suggestion};

async fn setup() -> Result<SuggestionCache> {
    let provider = StorageProvider::new(":memory:").await?;
    provider.initialize_schema().await?;
    Ok(SuggestionCache::new(&provider.db))
}

fn sample_suggestion(title: &str) -> Suggestion {
    Suggestion {
        system: SourceSystem::ItsmKb,
        title: title.to_string(),
        id: "KB0010042".to_string(),
        snippet: "Restart the portal pods and invalidate the session cache.".to_string(),
        link: "https://itsm.example.com/kb/KB0010042".to_string(),
        icon: "servicenow".to_string(),
        actions: vec!["attach".to_string(), "open".to_string()],
        relevance_score: Some(52.4),
        created_date: None,
        author: Some("j.doe".to_string()),
    }
}

fn bundle(keywords: &str, expires_in_secs: i64) -> CachedSuggestionBundle {
    let now = Utc::now().timestamp();
    CachedSuggestionBundle {
        keyword_hash: SuggestionCache::keyword_hash(keywords),
        keywords: keywords.to_string(),
        suggestions: vec![sample_suggestion("Portal 401 after certificate rotation")],
        search_time_ms: 128,
        total_found: 1,
        expires_at: now + expires_in_secs,
        updated_at: now,
    }
}

#[test]
fn keyword_hash_normalizes_case_and_whitespace() {
    assert_eq!(
        SuggestionCache::keyword_hash("Database Timeout"),
        SuggestionCache::keyword_hash("  database timeout  ")
    );
    assert_ne!(
        SuggestionCache::keyword_hash("database timeout"),
        SuggestionCache::keyword_hash("database deadlock")
    );
    // SHA-256, lowercase hex.
    assert_eq!(SuggestionCache::keyword_hash("x").len(), 64);
}

#[tokio::test]
async fn put_then_get_round_trips_the_bundle() -> Result<()> {
    let cache = setup().await?;
    let stored = bundle("portal 401 certificate", 600);
    cache.put(&stored).await?;

    let fetched = cache
        .get(&stored.keyword_hash)
        .await?
        .expect("bundle should be live");
    assert_eq!(fetched, stored);
    Ok(())
}

#[tokio::test]
async fn get_never_returns_expired_bundles() -> Result<()> {
    let cache = setup().await?;
    let expired = bundle("stale keywords", -60);
    cache.put(&expired).await?;

    // Expired rows are invisible to get even before any cleanup has run.
    assert!(cache.get(&expired.keyword_hash).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn put_is_an_upsert_not_an_insert() -> Result<()> {
    let cache = setup().await?;
    let first = bundle("checkout timeout", 600);
    cache.put(&first).await?;

    let mut second = first.clone();
    second.suggestions = vec![sample_suggestion("Checkout service circuit breaker open")];
    second.total_found = 1;
    second.search_time_ms = 301;
    cache.put(&second).await?;

    let fetched = cache.get(&first.keyword_hash).await?.expect("live bundle");
    assert_eq!(fetched.search_time_ms, 301);
    assert_eq!(
        fetched.suggestions[0].title,
        "Checkout service circuit breaker open"
    );

    // The overwritten row is the only one: expiring it must leave nothing.
    let mut expired = second.clone();
    expired.expires_at = Utc::now().timestamp() - 1;
    cache.put(&expired).await?;
    assert_eq!(cache.cleanup_expired().await?, 1);
    Ok(())
}

#[tokio::test]
async fn cleanup_removes_only_expired_rows() -> Result<()> {
    let cache = setup().await?;
    for (i, keywords) in ["alpha", "beta", "gamma"].iter().enumerate() {
        let mut b = bundle(keywords, -120);
        b.search_time_ms = i as u64;
        cache.put(&b).await?;
    }
    let live_one = bundle("delta", 600);
    let live_two = bundle("epsilon", 600);
    cache.put(&live_one).await?;
    cache.put(&live_two).await?;

    assert_eq!(cache.cleanup_expired().await?, 3);

    // The live rows survive the sweep and stay readable.
    assert!(cache.get(&live_one.keyword_hash).await?.is_some());
    assert!(cache.get(&live_two.keyword_hash).await?.is_some());

    // Idempotent: a second sweep finds nothing and does not error.
    assert_eq!(cache.cleanup_expired().await?, 0);
    Ok(())
}

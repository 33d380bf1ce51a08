//! # Jira Adapter Tests
//!
//! Verifies the live-call mapping and every degradation path: error status,
//! empty result set, and disabled configuration.

use linkhint::sources::KnowledgeSource;
use linkhint::types::SourceSystem;
use linkhint_jira::{JiraConfig, JiraSource};
use serde_json::json;
use std::sync::Once;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

/// Initializes tracing for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt::init();
    });
}

fn config_for(server: &MockServer) -> JiraConfig {
    JiraConfig {
        base_url: Some(server.uri()),
        api_token: Some("test-token".to_string()),
    }
}

#[tokio::test]
async fn live_search_maps_issues_to_suggestions() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [{
                "key": "OPS-42",
                "fields": {
                    "summary": "Checkout latency spike after deploy",
                    "description": "p99 latency tripled after the 14:00 deploy.",
                    "created": "2024-01-15T10:30:00.000+0000",
                    "reporter": { "displayName": "Dana Ops" }
                }
            }]
        })))
        .mount(&server)
        .await;

    let source = JiraSource::new(&config_for(&server));
    assert!(source.is_enabled());

    let suggestions = source.search("checkout latency", 5).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    let s = &suggestions[0];
    assert_eq!(s.system, SourceSystem::IssueTracker);
    assert_eq!(s.id, "OPS-42");
    assert_eq!(s.title, "Checkout latency spike after deploy");
    assert_eq!(s.link, format!("{}/browse/OPS-42", server.uri()));
    assert_eq!(s.author.as_deref(), Some("Dana Ops"));
    assert!(s.created_date.is_some());
}

#[tokio::test]
async fn error_status_degrades_to_fallback() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let source = JiraSource::new(&config_for(&server));
    let suggestions = source.search("database connection pool", 5).await.unwrap();

    assert!(!suggestions.is_empty());
    assert!(suggestions
        .iter()
        .all(|s| s.system == SourceSystem::IssueTracker));
    // Fallback candidates are ranked by keyword overlap.
    assert!(suggestions[0].title.to_lowercase().contains("database"));
}

#[tokio::test]
async fn empty_live_result_degrades_to_fallback() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "issues": [] })))
        .mount(&server)
        .await;

    let source = JiraSource::new(&config_for(&server));
    let suggestions = source.search("vpn disconnect", 5).await.unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions[0].title.to_lowercase().contains("vpn"));
}

#[tokio::test]
async fn disabled_adapter_serves_fallback_without_calling_out() {
    setup_tracing();
    let source = JiraSource::new(&JiraConfig::default());

    let suggestions = source.search("portal 401 certificate", 5).await.unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions[0].relevance_score.unwrap() > 0.0);

    // Zero keyword overlap filters the whole fallback set out.
    let none = source.search("zzz qqq xyzzy", 5).await.unwrap();
    assert!(none.is_empty());
}

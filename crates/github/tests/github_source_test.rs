//! # GitHub Adapter Tests

use linkhint::sources::KnowledgeSource;
use linkhint::types::SourceSystem;
use linkhint_github::{GithubConfig, GithubSource};
use serde_json::json;
use std::sync::Once;
use wiremock::matchers::{method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

/// Initializes tracing for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt::init();
    });
}

fn config_for(server: &MockServer) -> GithubConfig {
    GithubConfig {
        api_url: Some(server.uri()),
        token: Some("ghp_test".to_string()),
        repos: vec!["example/platform".to_string()],
    }
}

#[tokio::test]
async fn live_search_scopes_query_to_repos_and_maps_items() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param_contains("q", "repo:example/platform"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "number": 2113,
                "title": "Fix panic in retry scheduler",
                "body": "The scheduler unwraps a closed channel on shutdown.",
                "html_url": "https://github.com/example/platform/issues/2113",
                "created_at": "2024-02-01T08:00:00Z",
                "user": { "login": "octocat" }
            }]
        })))
        .mount(&server)
        .await;

    let source = GithubSource::new(&config_for(&server));
    assert!(source.is_enabled());

    let suggestions = source.search("retry scheduler panic", 5).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].system, SourceSystem::CodeHost);
    assert_eq!(suggestions[0].id, "#2113");
    assert_eq!(suggestions[0].author.as_deref(), Some("octocat"));
    assert!(suggestions[0].created_date.is_some());
}

#[tokio::test]
async fn rate_limited_search_degrades_to_fallback() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(403).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let source = GithubSource::new(&config_for(&server));
    let suggestions = source.search("connection leak pool", 5).await.unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions[0].title.to_lowercase().contains("connection leak"));
}

#[tokio::test]
async fn missing_token_disables_the_adapter() {
    setup_tracing();
    let source = GithubSource::new(&GithubConfig {
        api_url: None,
        token: None,
        repos: vec!["example/platform".to_string()],
    });
    assert!(!source.is_enabled());

    let suggestions = source.search("session cache eviction", 5).await.unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions[0].title.to_lowercase().contains("cache eviction"));
}

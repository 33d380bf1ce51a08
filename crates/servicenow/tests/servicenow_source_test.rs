//! # ServiceNow Adapter Tests

use linkhint::sources::KnowledgeSource;
use linkhint::types::SourceSystem;
use linkhint_servicenow::{ServiceNowConfig, ServiceNowSource};
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

fn config_for(server: &MockServer) -> ServiceNowConfig {
    ServiceNowConfig {
        instance_url: Some(server.uri()),
        username: Some("integration".to_string()),
        password: Some("secret".to_string()),
    }
}

#[tokio::test]
async fn live_search_maps_articles_to_suggestions() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/kb_knowledge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{
                "sys_id": "a1b2c3d4",
                "number": "KB0012345",
                "short_description": "Resolving checkout latency alerts",
                "text": "Scale out the payment workers and flush the slow-query log.",
                "sys_created_on": "2024-02-10 09:15:00",
                "author": "ops.admin"
            }]
        })))
        .mount(&server)
        .await;

    let source = ServiceNowSource::new(&config_for(&server));
    assert!(source.is_enabled());

    let suggestions = source.search("checkout latency", 5).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    let s = &suggestions[0];
    assert_eq!(s.system, SourceSystem::ItsmKb);
    assert_eq!(s.id, "KB0012345");
    assert_eq!(s.link, format!("{}/kb_view.do?sys_kb_id=a1b2c3d4", server.uri()));
    assert!(s.created_date.is_some());
    assert_eq!(s.author.as_deref(), Some("ops.admin"));
}

#[tokio::test]
async fn unauthorized_degrades_to_fallback() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/kb_knowledge"))
        .respond_with(ResponseTemplate::new(401).set_body_string("user not authenticated"))
        .mount(&server)
        .await;

    let source = ServiceNowSource::new(&config_for(&server));
    let suggestions = source.search("email notifications queue", 5).await.unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions[0].title.to_lowercase().contains("email notifications"));
    assert!(suggestions.iter().all(|s| s.system == SourceSystem::ItsmKb));
}

#[tokio::test]
async fn incomplete_credentials_disable_the_adapter() {
    setup_tracing();
    let source = ServiceNowSource::new(&ServiceNowConfig {
        instance_url: Some("https://example.service-now.com".to_string()),
        username: Some("integration".to_string()),
        password: None,
    });
    assert!(!source.is_enabled());

    let suggestions = source.search("vpn troubleshooting", 5).await.unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions[0].title.to_lowercase().contains("vpn"));
}

use std::collections::HashMap;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use deepmem::config::MemoryConfig;
use deepmem::memory::fallback::fallback_match;
use deepmem::memory::mem0::Mem0Client;
use deepmem::memory::types::ScopeFilter;
use deepmem::memory::MemoryStore;
use deepmem::Error;
use serde_json::{json, Value};

/// Serve a fixed listing page on an ephemeral port and return a client for it.
/// The page echoes the requested `user_id` into each record's metadata.
async fn local_mem0() -> Mem0Client {
    async fn list(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let user = params.get("user_id").cloned().unwrap_or_default();
        Json(json!({"results": [
            {"id": "work", "memory": "Kyoto offsite agenda", "metadata": {"topic": "work", "user": user}},
            {"id": "home", "memory": "Kyoto trip with family", "metadata": {"topic": "family", "user": user}},
            {"id": "misc", "memory": "Renew passport"}
        ]}))
    }

    serve(Router::new().route("/v1/memories/", get(list))).await
}

async fn serve(router: Router) -> Mem0Client {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let config = MemoryConfig {
        base_url: format!("http://{addr}"),
        api_key: Some("test-key".into()),
        ..MemoryConfig::default()
    };
    Mem0Client::new(&config).unwrap()
}

#[tokio::test]
async fn get_all_applies_metadata_scope() {
    let client = local_mem0().await;
    let scope = ScopeFilter::for_user("u").with_metadata("topic", "work".into());

    let result = client.get_all(&scope, 100).await.unwrap();

    let ids: Vec<&str> = result.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["work"]);
    assert_eq!(result.records[0].metadata.as_ref().unwrap()["user"], "u");
}

#[tokio::test]
async fn get_all_without_metadata_scope_returns_page() {
    let client = local_mem0().await;

    let result = client.get_all(&ScopeFilter::for_user("u"), 100).await.unwrap();

    assert_eq!(result.len(), 3);
}

#[tokio::test]
async fn fallback_over_client_stays_in_scope() {
    let client = local_mem0().await;
    let scope = ScopeFilter::for_user("u").with_metadata("topic", "work".into());

    let result = fallback_match(&client, "kyoto", &scope, 100).await.unwrap();

    let ids: Vec<&str> = result.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["work"]);
}

#[tokio::test]
async fn undecodable_body_is_a_json_error() {
    let client = serve(Router::new().route("/v1/memories/", get(|| async { "<html>maintenance</html>" }))).await;

    let err = client.get_all(&ScopeFilter::for_user("u"), 10).await.unwrap_err();

    assert!(matches!(err, Error::Json(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn error_status_is_a_remote_error() {
    let client = serve(Router::new().route(
        "/v1/memories/",
        get(|| async { (axum::http::StatusCode::UNAUTHORIZED, "bad token") }),
    ))
    .await;

    let err = client.get_all(&ScopeFilter::for_user("u"), 10).await.unwrap_err();

    match err {
        Error::Remote { operation, message } => {
            assert_eq!(operation, "mem0 get_all");
            assert!(message.contains("401"));
            assert!(message.contains("bad token"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

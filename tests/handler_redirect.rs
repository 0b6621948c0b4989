mod common;

use axum::http::StatusCode;
use std::sync::Arc;
use tinylink::application::services::LinkPolicy;
use tinylink::domain::repositories::LinkStore;
use tinylink::infrastructure::persistence::FileLinkStore;

#[tokio::test]
async fn test_redirect_success() {
    let (server, store) = common::make_server();
    common::create_test_link(store.as_ref(), "abc", "https://example.com").await;

    let response = server.get("/abc").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com");
}

#[tokio::test]
async fn test_redirect_counts_clicks() {
    let (server, store) = common::make_server();
    common::create_test_link(store.as_ref(), "abc", "https://example.com").await;

    for _ in 0..3 {
        server.get("/abc").await.assert_status(StatusCode::FOUND);
    }

    assert_eq!(store.get("abc").await.unwrap().unwrap().clicks, 3);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (server, _store) = common::make_server();

    let response = server.get("/nonexistent").await;

    response.assert_status_not_found();
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "not_found"
    );
}

#[tokio::test]
async fn test_redirect_expired_link() {
    let (server, store) = common::make_server();
    common::create_expired_link(store.as_ref(), "old", "https://example.com").await;

    let response = server.get("/old").await;

    response.assert_status(StatusCode::GONE);

    let record = store.get("old").await.unwrap().unwrap();
    assert_eq!(record.clicks, 0);
}

#[tokio::test]
async fn test_redirect_expired_link_purged_when_enabled() {
    let store = Arc::new(FileLinkStore::in_memory());
    common::create_expired_link(store.as_ref(), "old", "https://example.com").await;

    let policy = LinkPolicy {
        purge_expired_on_read: true,
        ..LinkPolicy::default()
    };
    let server =
        common::make_server_with_state(common::create_test_state_with_policy(store.clone(), policy));

    server.get("/old").await.assert_status(StatusCode::GONE);

    assert!(store.get("old").await.unwrap().is_none());
    server.get("/old").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_is_not_rate_limited() {
    let (server, store) = common::make_server();
    common::create_test_link(store.as_ref(), "abc", "https://example.com").await;

    for _ in 0..10 {
        server.get("/abc").await.assert_status(StatusCode::FOUND);
    }
}

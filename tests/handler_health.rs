mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tinylink::domain::entities::{LinkRecord, StoredLink};
use tinylink::domain::repositories::{LinkStore, WriteMode};
use tinylink::error::AppError;

/// Store whose backend is unreachable.
struct UnreachableStore;

fn unreachable() -> AppError {
    AppError::internal("Backend unreachable", json!({}))
}

#[async_trait]
impl LinkStore for UnreachableStore {
    async fn put(&self, _: &str, _: LinkRecord, _: WriteMode) -> Result<(), AppError> {
        Err(unreachable())
    }

    async fn get(&self, _: &str) -> Result<Option<LinkRecord>, AppError> {
        Err(unreachable())
    }

    async fn delete(&self, _: &str) -> Result<bool, AppError> {
        Err(unreachable())
    }

    async fn delete_if_expired(&self, _: &str, _: DateTime<Utc>) -> Result<bool, AppError> {
        Err(unreachable())
    }

    async fn list(&self) -> Result<Vec<StoredLink>, AppError> {
        Err(unreachable())
    }

    async fn allocate_id(&self) -> Result<u64, AppError> {
        Err(unreachable())
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let (server, _store) = common::make_server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["store"]["message"], "Backend: file");
}

#[tokio::test]
async fn test_health_endpoint_degraded() {
    let state = common::create_test_state(Arc::new(UnreachableStore));
    let server = common::make_server_with_state(state);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["store"]["status"], "error");
}

#[tokio::test]
async fn test_storage_failure_maps_to_500() {
    let state = common::create_test_state(Arc::new(UnreachableStore));
    let server = common::make_server_with_state(state);

    let response = server.get("/abc").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "internal_error"
    );
}

#[tokio::test]
async fn test_allocation_failure_maps_to_500() {
    let state = common::create_test_state(Arc::new(UnreachableStore));
    let server = common::make_server_with_state(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "allocation_failure"
    );
}

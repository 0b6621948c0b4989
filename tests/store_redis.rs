//! Integration tests against a live Redis.
//!
//! Run with `REDIS_URL=redis://localhost:6379 cargo test --test store_redis -- --ignored`.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tinylink::application::services::{LinkPolicy, LinkService};
use tinylink::domain::entities::LinkRecord;
use tinylink::domain::repositories::{LinkStore, WriteMode};
use tinylink::error::AppError;
use tinylink::infrastructure::persistence::RedisLinkStore;

/// Connects with a key namespace unique to this test run.
async fn connect(test: &str) -> RedisLinkStore {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let run = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let prefix = format!("test:{test}:{run}:");

    RedisLinkStore::connect(&url, &prefix)
        .await
        .unwrap()
        .with_counter_key(format!("test-counter:{test}:{run}"))
}

#[tokio::test]
#[ignore]
async fn test_redis_put_get_delete() {
    let store = connect("crud").await;
    let record = LinkRecord::new("https://example.com".to_string(), Utc::now(), 60);

    store
        .put("abc", record.clone(), WriteMode::CreateOnly)
        .await
        .unwrap();

    assert_eq!(
        store.get("abc").await.unwrap().unwrap().target,
        record.target
    );
    assert!(store.delete("abc").await.unwrap());
    assert!(!store.delete("abc").await.unwrap());
    assert!(store.get("abc").await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_redis_create_only_conflict() {
    let store = connect("conflict").await;
    let record = LinkRecord::new("https://original.com".to_string(), Utc::now(), 60);

    store
        .put("promo", record, WriteMode::CreateOnly)
        .await
        .unwrap();

    let other = LinkRecord::new("https://other.com".to_string(), Utc::now(), 60);
    let err = store
        .put("promo", other, WriteMode::CreateOnly)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
    assert_eq!(
        store.get("promo").await.unwrap().unwrap().target,
        "https://original.com"
    );
}

#[tokio::test]
#[ignore]
async fn test_redis_list_and_counter() {
    let store: Arc<dyn LinkStore> = Arc::new(connect("list").await);
    let service = LinkService::new(store.clone(), LinkPolicy::default());

    for _ in 0..3 {
        service
            .shorten("https://example.com".to_string(), None, None)
            .await
            .unwrap();
    }

    let mut codes: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.code)
        .collect();
    codes.sort();

    assert_eq!(codes, ["1", "2", "3"]);
    assert!(store.health_check().await);
    assert_eq!(store.backend_name(), "redis");
}

#[tokio::test]
#[ignore]
async fn test_redis_delete_if_expired() {
    let store = connect("expire").await;
    let now = Utc::now();
    let long_ago = now - Duration::seconds(120);

    store
        .put(
            "old",
            LinkRecord::new("https://old.com".to_string(), long_ago, 10),
            WriteMode::Upsert,
        )
        .await
        .unwrap();
    store
        .put(
            "live",
            LinkRecord::new("https://live.com".to_string(), now, 3600),
            WriteMode::Upsert,
        )
        .await
        .unwrap();

    assert!(store.delete_if_expired("old", now).await.unwrap());
    assert!(!store.delete_if_expired("live", now).await.unwrap());
    assert!(!store.delete_if_expired("missing", now).await.unwrap());
    assert!(store.get("old").await.unwrap().is_none());
    assert!(store.get("live").await.unwrap().is_some());

    store.delete("live").await.unwrap();
}

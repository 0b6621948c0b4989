use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tinylink::application::services::{LinkPolicy, LinkService};
use tinylink::domain::entities::{LinkRecord, StoredLink};
use tinylink::domain::expiry;
use tinylink::domain::repositories::{LinkStore, WriteMode};
use tinylink::error::AppError;
use tinylink::infrastructure::persistence::FileLinkStore;

/// Store that replaces `code` with a fresh record right after every listing,
/// as a user re-creating a custom code during a sweep would.
struct RecreateAfterList {
    inner: FileLinkStore,
    code: &'static str,
    fresh: LinkRecord,
}

#[async_trait]
impl LinkStore for RecreateAfterList {
    async fn put(&self, code: &str, record: LinkRecord, mode: WriteMode) -> Result<(), AppError> {
        self.inner.put(code, record, mode).await
    }

    async fn get(&self, code: &str) -> Result<Option<LinkRecord>, AppError> {
        self.inner.get(code).await
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        self.inner.delete(code).await
    }

    async fn delete_if_expired(&self, code: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        self.inner.delete_if_expired(code, now).await
    }

    async fn list(&self) -> Result<Vec<StoredLink>, AppError> {
        let links = self.inner.list().await?;
        self.inner.delete(self.code).await?;
        self.inner
            .put(self.code, self.fresh.clone(), WriteMode::CreateOnly)
            .await?;
        Ok(links)
    }

    async fn allocate_id(&self) -> Result<u64, AppError> {
        self.inner.allocate_id().await
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}

#[tokio::test]
async fn test_reopen_restores_counter_and_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    {
        let store: Arc<dyn LinkStore> = Arc::new(FileLinkStore::open(&path).unwrap());
        let service = LinkService::new(store.clone(), LinkPolicy::default());

        for _ in 0..3 {
            service
                .shorten("https://example.com".to_string(), None, None)
                .await
                .unwrap();
        }
        service.redirect("3").await.unwrap();
    }

    let reopened: Arc<dyn LinkStore> = Arc::new(FileLinkStore::open(&path).unwrap());
    assert_eq!(reopened.get("3").await.unwrap().unwrap().clicks, 1);
    assert_eq!(reopened.list().await.unwrap().len(), 3);

    let service = LinkService::new(reopened, LinkPolicy::default());
    let next = service
        .shorten("https://example.com".to_string(), None, None)
        .await
        .unwrap();
    assert_eq!(next.code, "4");
}

#[tokio::test]
async fn test_loads_existing_snapshot_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    fs::write(
        &path,
        serde_json::to_vec(&json!({
            "idCounter": 3,
            "urlStore": {
                "3": {
                    "long_url": "https://example.com",
                    "clicks": 2,
                    "created_at": 1_700_000_000,
                    "expiry": 604_800
                }
            }
        }))
        .unwrap(),
    )
    .unwrap();

    let store = FileLinkStore::open(&path).unwrap();

    let record = store.get("3").await.unwrap().unwrap();
    assert_eq!(record.target, "https://example.com");
    assert_eq!(record.clicks, 2);
    assert_eq!(record.created_at, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    assert_eq!(record.ttl_seconds, 604_800);

    assert_eq!(store.allocate_id().await.unwrap(), 4);
}

#[tokio::test]
async fn test_sweep_persists_removals() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let store = FileLinkStore::open(&path).unwrap();

    let created = Utc.timestamp_opt(1_000, 0).unwrap();
    store
        .put(
            "old",
            LinkRecord::new("https://a.com".to_string(), created, 10),
            WriteMode::Upsert,
        )
        .await
        .unwrap();
    store
        .put(
            "forever",
            LinkRecord::new("https://b.com".to_string(), created, 0),
            WriteMode::Upsert,
        )
        .await
        .unwrap();

    let report = expiry::sweep(&store, Utc.timestamp_opt(2_000, 0).unwrap())
        .await
        .unwrap();
    assert_eq!(report.removed, 1);

    let reopened = FileLinkStore::open(&path).unwrap();
    assert!(reopened.get("old").await.unwrap().is_none());
    assert!(reopened.get("forever").await.unwrap().is_some());
}

#[tokio::test]
async fn test_sweep_spares_code_recreated_after_listing() {
    let inner = FileLinkStore::in_memory();
    inner
        .put(
            "promo",
            LinkRecord::new(
                "https://old.com".to_string(),
                Utc.timestamp_opt(0, 0).unwrap(),
                10,
            ),
            WriteMode::Upsert,
        )
        .await
        .unwrap();

    let fresh = LinkRecord::new(
        "https://new.com".to_string(),
        Utc.timestamp_opt(1_990, 0).unwrap(),
        3600,
    );
    let store = RecreateAfterList {
        inner,
        code: "promo",
        fresh: fresh.clone(),
    };

    let report = expiry::sweep(&store, Utc.timestamp_opt(2_000, 0).unwrap())
        .await
        .unwrap();

    assert_eq!(report.scanned, 1);
    assert_eq!(report.removed, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(store.get("promo").await.unwrap(), Some(fresh));
}

#[tokio::test]
async fn test_concurrent_allocations_are_unique() {
    let store = Arc::new(FileLinkStore::in_memory());

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.allocate_id().await.unwrap() })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();

    assert_eq!(ids, (1..=50).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_concurrent_create_only_has_single_winner() {
    let store = Arc::new(FileLinkStore::in_memory());

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let record = LinkRecord::new(format!("https://{i}.example.com"), Utc::now(), 60);
                store.put("promo", record, WriteMode::CreateOnly).await.is_ok()
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }

    assert_eq!(winners, 1);
}

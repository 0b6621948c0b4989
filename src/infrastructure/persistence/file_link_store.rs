//! In-process link store persisted as a JSON snapshot file.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tempfile::NamedTempFile;
use tokio::task;
use tracing::{debug, info};

use crate::domain::entities::{LinkRecord, StoredLink};
use crate::domain::expiry::is_expired;
use crate::domain::repositories::{LinkStore, WriteMode};
use crate::error::AppError;

/// On-disk document: `{ "idCounter": n, "urlStore": { code: record } }`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Snapshot {
    #[serde(rename = "idCounter")]
    id_counter: u64,
    #[serde(rename = "urlStore", default)]
    url_store: HashMap<String, LinkRecord>,
}

/// Link store backed by an in-memory map and an atomically replaced snapshot.
///
/// A single mutex guards the counter and the map together, and every
/// operation, including the snapshot write that follows a mutation, runs
/// inside one critical section. Readers therefore see either the state before
/// or after a mutation, never a mix.
///
/// Each mutation rewrites the whole document to a temporary file in the same
/// directory, fsyncs it, and renames it over the snapshot path, so the file on
/// disk is always a complete document. If the snapshot cannot be written the
/// in-memory mutation is rolled back and the error is returned.
///
/// Critical sections run on the blocking thread pool, never on an async
/// worker thread.
pub struct FileLinkStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: Option<PathBuf>,
    state: Mutex<Snapshot>,
}

impl FileLinkStore {
    /// Opens the store at `path`, loading the snapshot if one exists.
    ///
    /// A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or is not a valid snapshot.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let snapshot = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)
                .with_context(|| format!("Malformed snapshot file {}", path.display()))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No existing store file. Starting fresh.");
                Snapshot::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        info!(
            path = %path.display(),
            entries = snapshot.url_store.len(),
            id_counter = snapshot.id_counter,
            "Loaded link store"
        );

        Ok(Self::from_parts(Some(path), snapshot))
    }

    /// Creates a store that is never persisted.
    pub fn in_memory() -> Self {
        Self::from_parts(None, Snapshot::default())
    }

    fn from_parts(path: Option<PathBuf>, snapshot: Snapshot) -> Self {
        Self {
            inner: Arc::new(Inner {
                path,
                state: Mutex::new(snapshot),
            }),
        }
    }

    /// Runs `op` against the shared state on the blocking pool.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&Inner) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);

        task::spawn_blocking(move || op(&inner))
            .await
            .map_err(|e| {
                AppError::internal("Link store task failed", json!({ "error": e.to_string() }))
            })?
    }
}

impl Inner {
    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::internal("Link store lock poisoned", json!({})))
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        write_snapshot(path, snapshot)?;
        debug!(path = %path.display(), entries = snapshot.url_store.len(), "Snapshot written");
        Ok(())
    }

    fn put(&self, code: String, record: LinkRecord, mode: WriteMode) -> Result<(), AppError> {
        let mut state = self.lock()?;

        if mode == WriteMode::CreateOnly && state.url_store.contains_key(&code) {
            return Err(AppError::conflict(
                "Custom code already in use",
                json!({ "code": code }),
            ));
        }

        let previous = state.url_store.insert(code.clone(), record);

        if let Err(e) = self.persist(&state) {
            match previous {
                Some(old) => state.url_store.insert(code, old),
                None => state.url_store.remove(&code),
            };
            return Err(e);
        }

        Ok(())
    }

    /// Removes `code` if `should_remove` accepts its current record.
    fn remove_where(
        &self,
        code: String,
        should_remove: impl FnOnce(&LinkRecord) -> bool,
    ) -> Result<bool, AppError> {
        let mut state = self.lock()?;

        if !state.url_store.get(&code).is_some_and(should_remove) {
            return Ok(false);
        }

        let Some(removed) = state.url_store.remove(&code) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&state) {
            state.url_store.insert(code, removed);
            return Err(e);
        }

        Ok(true)
    }

    fn allocate_id(&self) -> Result<u64, AppError> {
        let mut state = self.lock()?;

        let next = state.id_counter.checked_add(1).ok_or_else(|| {
            AppError::allocation_failure("Allocation counter exhausted", json!({}))
        })?;
        state.id_counter = next;

        if let Err(e) = self.persist(&state) {
            state.id_counter = next - 1;
            return Err(e);
        }

        Ok(next)
    }
}

/// Writes `snapshot` next to `path` and atomically renames it into place.
fn write_snapshot(path: &Path, snapshot: &Snapshot) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let bytes = serde_json::to_vec_pretty(snapshot)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[async_trait]
impl LinkStore for FileLinkStore {
    async fn put(&self, code: &str, record: LinkRecord, mode: WriteMode) -> Result<(), AppError> {
        let code = code.to_string();
        self.run_blocking(move |inner| inner.put(code, record, mode))
            .await
    }

    async fn get(&self, code: &str) -> Result<Option<LinkRecord>, AppError> {
        let code = code.to_string();
        self.run_blocking(move |inner| Ok(inner.lock()?.url_store.get(&code).cloned()))
            .await
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let code = code.to_string();
        self.run_blocking(move |inner| inner.remove_where(code, |_| true))
            .await
    }

    async fn delete_if_expired(&self, code: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let code = code.to_string();
        self.run_blocking(move |inner| {
            inner.remove_where(code, |record| is_expired(record, now))
        })
        .await
    }

    async fn list(&self) -> Result<Vec<StoredLink>, AppError> {
        self.run_blocking(|inner| {
            Ok(inner
                .lock()?
                .url_store
                .iter()
                .map(|(code, record)| StoredLink::new(code.clone(), record.clone()))
                .collect())
        })
        .await
    }

    async fn allocate_id(&self) -> Result<u64, AppError> {
        self.run_blocking(|inner| inner.allocate_id()).await
    }

    async fn health_check(&self) -> bool {
        !self.inner.state.is_poisoned()
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

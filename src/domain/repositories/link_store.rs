//! Storage contract for link records and the code allocation counter.

use crate::domain::entities::{LinkRecord, StoredLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// How [`LinkStore::put`] treats an already-present code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail with [`AppError::Conflict`] if the code already exists.
    CreateOnly,
    /// Insert or overwrite unconditionally.
    Upsert,
}

/// Backend-independent store of link records keyed by short code.
///
/// Records are value-copied in and out; callers never hold references into
/// the store.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::FileLinkStore`] - In-process map
///   with an atomically replaced JSON snapshot
/// - [`crate::infrastructure::persistence::RedisLinkStore`] - One Redis key
///   per code plus a counter key
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Stores `record` under `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] in [`WriteMode::CreateOnly`] when the code
    /// is already present; the existing record is left untouched.
    ///
    /// Returns [`AppError::Internal`] on backend errors.
    async fn put(&self, code: &str, record: LinkRecord, mode: WriteMode) -> Result<(), AppError>;

    /// Finds a record by its code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on backend errors.
    async fn get(&self, code: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Removes a record.
    ///
    /// Returns `Ok(true)` if the code was present, `Ok(false)` otherwise.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Removes the record under `code` only if it is expired at `now`.
    ///
    /// The expiry check and the removal are one atomic step, so a record that
    /// was replaced by a fresh one after being observed as expired survives.
    /// Returns `Ok(true)` if a record was removed.
    async fn delete_if_expired(&self, code: &str, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Returns an unordered point-in-time snapshot of every record.
    ///
    /// Entries that cannot be read individually are skipped so a single
    /// corrupt record does not fail the whole listing.
    async fn list(&self) -> Result<Vec<StoredLink>, AppError>;

    /// Atomically advances the allocation counter and returns the new value.
    async fn allocate_id(&self) -> Result<u64, AppError>;

    /// Checks that the backend is reachable.
    async fn health_check(&self) -> bool;

    /// Human-readable backend name used in logs and health output.
    fn backend_name(&self) -> &'static str;
}

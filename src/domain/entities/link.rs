//! Link entities: stored records and the projections handed to callers.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted link lifetime: 100 years.
pub const MAX_TTL_SECONDS: u64 = 3_153_600_000;

/// A shortened URL record as persisted by a link store.
///
/// Field names on the wire match the snapshot document format
/// (`long_url`, `clicks`, `created_at` in unix seconds, `expiry` in seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(rename = "long_url")]
    pub target: String,
    pub clicks: u64,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Lifetime in seconds. `0` means the record never expires.
    #[serde(rename = "expiry")]
    pub ttl_seconds: u64,
}

impl LinkRecord {
    /// Creates a fresh record with a zero click counter.
    pub fn new(target: String, created_at: DateTime<Utc>, ttl_seconds: u64) -> Self {
        Self {
            target,
            clicks: 0,
            created_at,
            ttl_seconds,
        }
    }

    /// Absolute expiry instant, or `None` for records that never expire.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.ttl_seconds == 0 {
            return None;
        }

        let ttl = TimeDelta::try_seconds(i64::try_from(self.ttl_seconds).ok()?)?;
        self.created_at.checked_add_signed(ttl)
    }
}

/// A record together with the code it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLink {
    pub code: String,
    pub record: LinkRecord,
}

impl StoredLink {
    pub fn new(code: String, record: LinkRecord) -> Self {
        Self { code, record }
    }
}

/// Read-only view of a link used by the inspect and list operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkInfo {
    pub code: String,
    #[serde(rename = "long_url")]
    pub target: String,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
}

impl LinkInfo {
    /// Projects a record as seen at `now`.
    pub fn from_record(code: &str, record: &LinkRecord, now: DateTime<Utc>) -> Self {
        Self {
            code: code.to_string(),
            target: record.target.clone(),
            clicks: record.clicks,
            created_at: record.created_at,
            expires_at: record.expires_at(),
            is_expired: crate::domain::expiry::is_expired(record, now),
        }
    }
}

/// Outcome of a successful shorten operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub code: String,
    pub ttl_seconds: u64,
}

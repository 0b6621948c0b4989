//! Redis-backed link store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{LinkRecord, StoredLink};
use crate::domain::expiry::is_expired;
use crate::domain::repositories::{LinkStore, WriteMode};
use crate::error::AppError;
use crate::utils::code_generator::is_valid_code;

/// Number of keys requested per `SCAN` round trip.
const SCAN_BATCH: usize = 500;

/// Deletes `KEYS[1]` only while it still holds `ARGV[1]`.
const COMPARE_AND_DELETE: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Link store keeping one Redis key per code plus a dedicated counter key.
///
/// # Key Layout
///
/// ```text
/// <prefix><code>   -> LinkRecord JSON
/// url_id_counter   -> allocation counter (INCR)
/// ```
///
/// Custom codes are inserted with `SET NX`, so the existence check and the
/// write are one atomic step on the server. Expired records are purged with a
/// compare-and-delete script keyed on the payload that was judged expired. Durability is whatever the Redis
/// deployment provides; this store keeps no snapshot of its own.
pub struct RedisLinkStore {
    client: ConnectionManager,
    key_prefix: String,
    counter_key: String,
}

impl RedisLinkStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379/0"`)
    /// - `key_prefix` - Namespace prepended to every code key (e.g., `"link:"`)
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, key_prefix: &str) -> Result<Self, AppError> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;

        let mut test_conn = manager.clone();
        test_conn.ping::<()>().await?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: key_prefix.to_string(),
            counter_key: "url_id_counter".to_string(),
        })
    }

    /// Overrides the counter key (tests use a per-run key).
    pub fn with_counter_key(mut self, counter_key: impl Into<String>) -> Self {
        self.counter_key = counter_key.into();
        self
    }

    fn build_key(&self, code: &str) -> String {
        format!("{}{}", self.key_prefix, code)
    }

    fn code_from_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.key_prefix.as_str())
            .filter(|code| is_valid_code(code))
    }

    async fn scan_keys(&self) -> Result<Vec<String>, AppError> {
        let mut conn = self.client.clone();
        let pattern = format!("{}*", self.key_prefix);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl LinkStore for RedisLinkStore {
    async fn put(&self, code: &str, record: LinkRecord, mode: WriteMode) -> Result<(), AppError> {
        let key = self.build_key(code);
        let payload = serde_json::to_string(&record)?;
        let mut conn = self.client.clone();

        match mode {
            WriteMode::CreateOnly => {
                let reply: Option<String> = redis::cmd("SET")
                    .arg(&key)
                    .arg(&payload)
                    .arg("NX")
                    .query_async(&mut conn)
                    .await?;

                if reply.is_none() {
                    return Err(AppError::conflict(
                        "Custom code already in use",
                        json!({ "code": code }),
                    ));
                }
            }
            WriteMode::Upsert => {
                conn.set::<_, _, ()>(&key, &payload).await?;
            }
        }

        debug!(code, ?mode, "Stored link");
        Ok(())
    }

    async fn get(&self, code: &str) -> Result<Option<LinkRecord>, AppError> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        let Some(payload) = conn.get::<_, Option<String>>(&key).await? else {
            return Ok(None);
        };

        Ok(Some(serde_json::from_str(&payload)?))
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        let deleted: i64 = conn.del(&key).await?;
        Ok(deleted > 0)
    }

    async fn delete_if_expired(&self, code: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        let Some(payload) = conn.get::<_, Option<String>>(&key).await? else {
            return Ok(false);
        };

        let record: LinkRecord = serde_json::from_str(&payload)?;
        if !is_expired(&record, now) {
            return Ok(false);
        }

        // The payload check makes the delete a no-op if the code was rewritten
        // after the GET above.
        let deleted: i64 = redis::cmd("EVAL")
            .arg(COMPARE_AND_DELETE)
            .arg(1)
            .arg(&key)
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        Ok(deleted > 0)
    }

    async fn list(&self) -> Result<Vec<StoredLink>, AppError> {
        let keys = self.scan_keys().await?;
        let mut conn = self.client.clone();
        let mut links = Vec::with_capacity(keys.len());

        for key in keys {
            let Some(code) = self.code_from_key(&key) else {
                continue;
            };

            let payload = match conn.get::<_, Option<String>>(&key).await {
                Ok(Some(payload)) => payload,
                // Deleted between SCAN and GET.
                Ok(None) => continue,
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping unreadable link");
                    continue;
                }
            };

            match serde_json::from_str::<LinkRecord>(&payload) {
                Ok(record) => links.push(StoredLink::new(code.to_string(), record)),
                Err(e) => warn!(key = %key, error = %e, "Skipping corrupt link record"),
            }
        }

        Ok(links)
    }

    async fn allocate_id(&self) -> Result<u64, AppError> {
        let mut conn = self.client.clone();
        let id: u64 = conn.incr(&self.counter_key, 1u64).await?;
        Ok(id)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

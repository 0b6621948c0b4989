//! Link shortening, redirect, inspection and deletion service.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::admission::{Admission, AdmissionLimiter};
use crate::domain::code_allocator::CodeAllocator;
use crate::domain::entities::{LinkInfo, LinkRecord, MAX_TTL_SECONDS, ShortLink};
use crate::domain::expiry::is_expired;
use crate::domain::repositories::{LinkStore, WriteMode};
use crate::error::AppError;
use crate::utils::code_generator::validate_custom_code;
use crate::utils::url_validator::validate_target_url;

/// Default link lifetime: 7 days.
pub const DEFAULT_TTL_SECONDS: u64 = 7 * 24 * 3600;

/// Upper bound on counter draws when generated codes keep hitting existing
/// custom codes.
const MAX_ALLOCATION_ATTEMPTS: usize = 8;

/// Service policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPolicy {
    /// TTL applied when the caller gives none (or zero).
    pub default_ttl_seconds: u64,
    /// Delete expired records as soon as a redirect finds them.
    pub purge_expired_on_read: bool,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            purge_expired_on_read: false,
        }
    }
}

/// Orchestrates the link store, code allocator and admission limiter.
///
/// This is the operation set the HTTP layer calls; it never touches HTTP
/// types itself.
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    allocator: CodeAllocator,
    limiter: Option<Arc<AdmissionLimiter>>,
    policy: LinkPolicy,
}

impl LinkService {
    /// Creates a new link service without admission control.
    pub fn new(store: Arc<dyn LinkStore>, policy: LinkPolicy) -> Self {
        Self {
            allocator: CodeAllocator::new(store.clone()),
            store,
            limiter: None,
            policy,
        }
    }

    /// Gates [`Self::shorten_for_client`] behind `limiter`.
    pub fn with_limiter(mut self, limiter: Arc<AdmissionLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.store
    }

    /// Shortens `target` on behalf of `client`, subject to admission control.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RateLimited`] if the client has used up its window,
    /// otherwise see [`Self::shorten`].
    pub async fn shorten_for_client(
        &self,
        client: &str,
        target: String,
        custom_code: Option<String>,
        ttl_seconds: Option<u64>,
    ) -> Result<ShortLink, AppError> {
        if let Some(limiter) = &self.limiter
            && let Admission::Rejected { retry_after } = limiter.try_admit(client, Instant::now())
        {
            warn!(client, retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
            return Err(AppError::rate_limited(
                "Rate limit exceeded. Try again later.",
                json!({ "retry_after_seconds": retry_after.as_secs().max(1) }),
            ));
        }

        self.shorten(target, custom_code, ttl_seconds).await
    }

    /// Creates a short link for `target`.
    ///
    /// # Code Selection
    ///
    /// - A custom code is validated and inserted with
    ///   [`WriteMode::CreateOnly`]; an existing code is a conflict.
    /// - Otherwise the next counter value is encoded in base 62. If that text
    ///   is already taken by a custom code, the next value is drawn instead.
    ///
    /// An absent or zero `ttl_seconds` becomes the policy default.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a non-HTTP(S) target, a lifetime
    /// above [`MAX_TTL_SECONDS`] or a malformed custom code, [`AppError::Conflict`] if the custom code
    /// exists, and [`AppError::AllocationFailure`] if no code could be issued.
    pub async fn shorten(
        &self,
        target: String,
        custom_code: Option<String>,
        ttl_seconds: Option<u64>,
    ) -> Result<ShortLink, AppError> {
        validate_target_url(&target).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "url": target.as_str() }))
        })?;

        let ttl_seconds = match ttl_seconds {
            Some(ttl) if ttl > MAX_TTL_SECONDS => {
                return Err(AppError::bad_request(
                    format!("Expiry must be at most {MAX_TTL_SECONDS} seconds"),
                    json!({ "expiry_seconds": ttl }),
                ));
            }
            Some(ttl) if ttl > 0 => ttl,
            _ => self.policy.default_ttl_seconds,
        };
        let record = LinkRecord::new(target, Utc::now(), ttl_seconds);

        let code = match custom_code.filter(|c| !c.is_empty()) {
            Some(custom) => {
                validate_custom_code(&custom)?;
                self.store
                    .put(&custom, record, WriteMode::CreateOnly)
                    .await?;
                custom
            }
            None => self.insert_generated(record).await?,
        };

        debug!(code, ttl_seconds, "Short link created");

        Ok(ShortLink { code, ttl_seconds })
    }

    /// Resolves `code` to its target and counts the click.
    ///
    /// Expired records are reported as gone and their click counter is left
    /// alone. The increment is a read-modify-write through
    /// [`WriteMode::Upsert`]; concurrent redirects of one code are
    /// last-write-wins.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown codes and [`AppError::Gone`]
    /// for expired ones.
    pub async fn redirect(&self, code: &str) -> Result<String, AppError> {
        let now = Utc::now();

        let mut record = self
            .store
            .get(code)
            .await?
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "code": code })))?;

        if is_expired(&record, now) {
            if self.policy.purge_expired_on_read
                && let Err(e) = self.store.delete_if_expired(code, now).await
            {
                warn!(code, error = %e, "Failed to purge expired link on read");
            }
            return Err(AppError::gone("URL expired", json!({ "code": code })));
        }

        record.clicks = record.clicks.saturating_add(1);
        let target = record.target.clone();
        self.store.put(code, record, WriteMode::Upsert).await?;

        Ok(target)
    }

    /// Returns the read-only view of a link. Does not count a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown codes.
    pub async fn info(&self, code: &str) -> Result<LinkInfo, AppError> {
        let record = self.store.get(code).await?.ok_or_else(|| {
            AppError::not_found("Short URL not found", json!({ "code": code }))
        })?;

        Ok(LinkInfo::from_record(code, &record, Utc::now()))
    }

    /// Lists every stored link, including expired ones not yet swept.
    pub async fn list_all(&self) -> Result<Vec<LinkInfo>, AppError> {
        let now = Utc::now();
        let links = self.store.list().await?;

        Ok(links
            .iter()
            .map(|l| LinkInfo::from_record(&l.code, &l.record, now))
            .collect())
    }

    /// Deletes a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist.
    pub async fn delete_code(&self, code: &str) -> Result<(), AppError> {
        if !self.store.delete(code).await? {
            return Err(AppError::not_found(
                "Short URL not found",
                json!({ "code": code }),
            ));
        }

        debug!(code, "Short link deleted");
        Ok(())
    }

    /// Constructs the full short URL from the public base URL and a code.
    pub fn get_short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    async fn insert_generated(&self, record: LinkRecord) -> Result<String, AppError> {
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let code = self.allocator.next_code().await?;

            match self
                .store
                .put(&code, record.clone(), WriteMode::CreateOnly)
                .await
            {
                Ok(()) => return Ok(code),
                Err(AppError::Conflict { .. }) => {
                    warn!(code, "Generated code already taken by a custom code, drawing another");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::allocation_failure(
            "Failed to generate short code",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}

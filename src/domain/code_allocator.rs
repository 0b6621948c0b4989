//! Collision-free short code allocation from the store's monotonic counter.

use std::sync::Arc;

use crate::domain::repositories::LinkStore;
use crate::error::AppError;
use crate::utils::code_generator::encode_base62;
use serde_json::json;

/// Issues system-generated codes by advancing the store's allocation counter.
///
/// Codes are the base-62 encoding of each new counter value, so two codes
/// issued by this allocator never repeat. They may still textually match a
/// custom code created earlier; callers write generated codes in
/// [`crate::domain::repositories::WriteMode::CreateOnly`] and ask for another
/// code on conflict.
pub struct CodeAllocator {
    store: Arc<dyn LinkStore>,
}

impl CodeAllocator {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// Atomically advances the counter and returns its base-62 encoding.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AllocationFailure`] if the backend cannot advance
    /// the counter.
    pub async fn next_code(&self) -> Result<String, AppError> {
        let id = self.store.allocate_id().await.map_err(|e| {
            tracing::error!(error = %e, backend = self.store.backend_name(), "Counter allocation failed");
            AppError::allocation_failure(
                "Failed to generate short code",
                json!({ "backend": self.store.backend_name() }),
            )
        })?;

        Ok(encode_base62(id))
    }
}

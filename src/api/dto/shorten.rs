//! DTOs for link shortening endpoint.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::MAX_TTL_SECONDS;

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]*$").unwrap());

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The URL to shorten (must be HTTP/HTTPS, checked by the service).
    #[validate(length(min = 1, message = "URL must not be empty"))]
    pub url: String,

    /// Optional custom short code (letters and digits only). An empty string
    /// is treated like an absent one.
    #[validate(regex(
        path = "*CUSTOM_CODE_REGEX",
        message = "Invalid custom code. Use only letters and numbers."
    ))]
    pub custom_code: Option<String>,

    /// Optional lifetime in seconds. Absent or `0` uses the server default.
    #[validate(range(max = MAX_TTL_SECONDS, message = "Expiry must be at most 100 years"))]
    pub expiry_seconds: Option<u64>,
}

/// Response for a created short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
    pub expiry_seconds: u64,
}

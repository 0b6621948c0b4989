//! Target URL validation.
//!
//! Only absolute `http` and `https` URLs may be shortened. The accepted URL is
//! stored exactly as the caller sent it.

use url::Url;

/// Errors that can occur while validating a target URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Invalid URL. Must start with http:// or https://")]
    UnsupportedProtocol,
}

/// Checks that `input` is an absolute HTTP(S) URL with a host.
///
/// # Errors
///
/// Returns [`UrlValidationError::InvalidFormat`] for malformed URLs and
/// [`UrlValidationError::UnsupportedProtocol`] for any other scheme
/// (`ftp:`, `javascript:`, `data:` and so on).
pub fn validate_target_url(input: &str) -> Result<(), UrlValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let lower = trimmed.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(UrlValidationError::UnsupportedProtocol);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::InvalidFormat(
            "URL has no host".to_string(),
        ));
    }

    Ok(())
}

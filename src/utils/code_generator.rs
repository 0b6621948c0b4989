//! Short code encoding and validation utilities.
//!
//! System-generated codes are the base-62 encoding of the store's allocation
//! counter; custom codes supplied by callers are validated against the same
//! alphabet.

use crate::error::AppError;
use serde_json::json;

/// Digit alphabet in digit-value order: `0-9`, then `a-z`, then `A-Z`.
const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Encodes `n` in base 62 without padding.
///
/// # Examples
///
/// ```
/// use tinylink::utils::code_generator::encode_base62;
///
/// assert_eq!(encode_base62(0), "0");
/// assert_eq!(encode_base62(1), "1");
/// assert_eq!(encode_base62(61), "Z");
/// assert_eq!(encode_base62(62), "10");
/// ```
pub fn encode_base62(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while n > 0 {
        digits.push(BASE62_ALPHABET[(n % 62) as usize]);
        n /= 62;
    }
    digits.reverse();

    // Alphabet is pure ASCII.
    digits.into_iter().map(char::from).collect()
}

/// Returns true if `code` is non-empty and strictly ASCII alphanumeric.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Validates a user-provided custom short code.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the code is empty or contains anything
/// other than letters and digits.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if !is_valid_code(code) {
        return Err(AppError::bad_request(
            "Invalid custom code. Use only letters and numbers.",
            json!({ "code": code }),
        ));
    }

    Ok(())
}

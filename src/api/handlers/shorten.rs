//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::HeaderMap,
};
use std::net::SocketAddr;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_identity;

/// Creates a short link for one URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "custom_code": "promo2025",  // optional
///   "expiry_seconds": 3600       // optional, default 7 days
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "code": "promo2025",
///   "short_url": "http://localhost:8080/promo2025",
///   "expiry_seconds": 3600
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: invalid URL or custom code
/// - 409 Conflict: custom code already in use
/// - 429 Too Many Requests: client exceeded its admission window
pub async fn shorten_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let client = client_identity(&headers, addr, state.behind_proxy);

    let link = state
        .link_service
        .shorten_for_client(
            &client,
            payload.url,
            payload.custom_code,
            payload.expiry_seconds,
        )
        .await?;

    let short_url = state.link_service.get_short_url(&state.base_url, &link.code);

    Ok(Json(ShortenResponse {
        code: link.code,
        short_url,
        expiry_seconds: link.ttl_seconds,
    }))
}

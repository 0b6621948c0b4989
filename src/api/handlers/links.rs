//! Handlers for link inspection, listing and deletion.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::domain::entities::LinkInfo;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the stored details of a link without counting a click.
///
/// # Endpoint
///
/// `GET /info/{code}`
///
/// # Response
///
/// ```json
/// {
///   "code": "abc",
///   "long_url": "https://example.com",
///   "clicks": 3,
///   "created_at": "2025-01-01T00:00:00Z",
///   "expires_at": "2025-01-08T00:00:00Z",
///   "is_expired": false
/// }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn info_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkInfo>, AppError> {
    let info = state.link_service.info(&code).await?;
    Ok(Json(info))
}

/// Lists every stored link, expired ones included.
///
/// # Endpoint
///
/// `GET /list`
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<LinkInfo>>, AppError> {
    let links = state.link_service.list_all().await?;
    Ok(Json(links))
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /delete/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_code(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

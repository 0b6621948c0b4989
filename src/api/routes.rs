//! Link API route configuration.

use crate::api::handlers::{
    delete_link_handler, info_handler, list_handler, redirect_handler, shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Link routes.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Create a short link (admission-limited)
/// - `GET    /info/{code}`    - Link details
/// - `GET    /list`           - All stored links
/// - `DELETE /delete/{code}`  - Delete a link
/// - `GET    /{code}`         - Redirect to the target URL
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/info/{code}", get(info_handler))
        .route("/list", get(list_handler))
        .route("/delete/{code}", delete(delete_link_handler))
        .route("/{code}", get(redirect_handler))
}

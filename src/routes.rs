//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST   /shorten`        - Create a short link
//! - `GET    /info/{code}`    - Link details
//! - `GET    /list`           - All stored links
//! - `DELETE /delete/{code}`  - Delete a link
//! - `GET    /health`         - Store health check
//! - `GET    /{code}`         - Short link redirect
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling
//!
//! Admission control for `/shorten` lives in
//! [`crate::application::services::LinkService`], not in a layer.

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// The shorten handler needs `ConnectInfo<SocketAddr>`; serve the result with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(api::routes::link_routes())
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

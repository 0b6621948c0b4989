use std::sync::Arc;

use crate::application::services::LinkService;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    /// Public origin used to build `short_url` values.
    pub base_url: String,
    /// Read client identity from proxy headers instead of the peer address.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService>, base_url: impl Into<String>, behind_proxy: bool) -> Self {
        Self {
            link_service,
            base_url: base_url.into(),
            behind_proxy,
        }
    }
}

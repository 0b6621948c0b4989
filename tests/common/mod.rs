#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum::routing::get;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tinylink::application::services::{LinkPolicy, LinkService};
use tinylink::domain::admission::{AdmissionLimiter, LimiterConfig};
use tinylink::domain::entities::LinkRecord;
use tinylink::domain::repositories::{LinkStore, WriteMode};
use tinylink::infrastructure::persistence::FileLinkStore;
use tinylink::api::handlers::health_handler;
use tinylink::api::routes::link_routes;
use tinylink::state::AppState;
use tower::Layer;

pub const BASE_URL: &str = "http://localhost:8080";

pub fn create_test_state(store: Arc<dyn LinkStore>) -> AppState {
    create_test_state_with_policy(store, LinkPolicy::default())
}

pub fn create_test_state_with_policy(store: Arc<dyn LinkStore>, policy: LinkPolicy) -> AppState {
    let limiter = Arc::new(AdmissionLimiter::new(LimiterConfig::default()));
    let link_service = Arc::new(LinkService::new(store, policy).with_limiter(limiter));

    AppState::new(link_service, BASE_URL, false)
}

/// All link and health routes over an in-memory store.
pub fn make_server() -> (TestServer, Arc<FileLinkStore>) {
    let store = Arc::new(FileLinkStore::in_memory());
    let server = make_server_with_state(create_test_state(store.clone()));
    (server, store)
}

pub fn make_server_with_state(state: AppState) -> TestServer {
    let app = link_routes()
        .route("/health", get(health_handler))
        .layer(MockConnectInfoLayer)
        .with_state(state);

    TestServer::new(app).unwrap()
}

pub async fn create_test_link(store: &dyn LinkStore, code: &str, url: &str) {
    let record = LinkRecord::new(url.to_string(), Utc::now(), 604_800);
    store.put(code, record, WriteMode::CreateOnly).await.unwrap();
}

pub async fn create_expired_link(store: &dyn LinkStore, code: &str, url: &str) {
    let record = LinkRecord::new(url.to_string(), Utc::now() - Duration::seconds(11), 10);
    store.put(code, record, WriteMode::CreateOnly).await.unwrap();
}

/// Injects a fixed peer address, standing in for
/// `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

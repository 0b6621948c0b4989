//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, background task spawning, and the Axum server
//! lifecycle including graceful shutdown.

use crate::application::services::LinkService;
use crate::config::{Config, StoreBackend};
use crate::domain::admission::{AdmissionLimiter, run_limiter_eviction};
use crate::domain::expiry::run_expiry_sweeper;
use crate::domain::repositories::LinkStore;
use crate::infrastructure::persistence::{FileLinkStore, RedisLinkStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Opens the link store selected by `config`.
///
/// # Errors
///
/// Returns an error if the snapshot file is unreadable or malformed, or if
/// Redis cannot be reached.
pub async fn build_store(config: &Config) -> Result<Arc<dyn LinkStore>> {
    let store: Arc<dyn LinkStore> = match config.store_backend {
        StoreBackend::File => Arc::new(
            FileLinkStore::open(&config.store_path).context("Failed to open link store")?,
        ),
        StoreBackend::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("Redis backend selected but no Redis URL configured")?;

            Arc::new(
                RedisLinkStore::connect(redis_url, &config.redis_key_prefix)
                    .await
                    .context("Failed to connect to Redis")?,
            )
        }
    };

    tracing::info!(backend = store.backend_name(), "Link store ready");
    Ok(store)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Link store (snapshot file or Redis)
/// - Admission limiter and its eviction task
/// - Expiry sweeper
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, drains
/// in-flight requests, then signals the background tasks and waits up to
/// `SHUTDOWN_TIMEOUT_SECONDS` for them.
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be opened
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = build_store(&config).await?;

    let limiter = Arc::new(AdmissionLimiter::new(config.limiter_config()));
    let link_service = Arc::new(
        LinkService::new(store.clone(), config.link_policy()).with_limiter(limiter.clone()),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let workers = vec![
        tokio::spawn(run_expiry_sweeper(
            store.clone(),
            Duration::from_secs(config.sweep_interval_seconds),
            shutdown_rx.clone(),
        )),
        tokio::spawn(run_limiter_eviction(
            limiter,
            Duration::from_secs(config.rate_limit_evict_interval_seconds),
            Duration::from_secs(config.rate_limit_stale_seconds),
            shutdown_rx,
        )),
    ];
    tracing::info!("Background workers started");

    let state = AppState::new(link_service, config.base_url.clone(), config.behind_proxy);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("HTTP server stopped, shutting down workers");
    stop_workers(
        shutdown_tx,
        workers,
        Duration::from_secs(config.shutdown_timeout_seconds),
    )
    .await;

    Ok(())
}

/// Flips the shutdown flag and waits up to `timeout` for every worker.
async fn stop_workers(
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
    timeout: Duration,
) {
    // Receivers may already be gone if a worker exited early.
    let _ = shutdown_tx.send(true);

    let join_all = async {
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Background worker panicked");
            }
        }
    };

    if tokio::time::timeout(timeout, join_all).await.is_err() {
        tracing::warn!(
            timeout_secs = timeout.as_secs(),
            "Background workers did not stop in time"
        );
    } else {
        tracing::info!("Background workers stopped");
    }
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

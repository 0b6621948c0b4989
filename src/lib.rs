//! # tinylink
//!
//! A small URL shortener built with Axum, with expiring links, click counters
//! and swappable storage (JSON snapshot file or Redis).
//!
//! ## Architecture
//!
//! The crate keeps the same layer separation throughout:
//!
//! - **Domain Layer** ([`domain`]) - Entities, the [`domain::repositories::LinkStore`]
//!   trait, code allocation, expiry and admission control
//! - **Application Layer** ([`application`]) - The link service orchestrating all of the above
//! - **Infrastructure Layer** ([`infrastructure`]) - File and Redis store implementations
//! - **API Layer** ([`api`]) - HTTP handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Base-62 codes from a monotonic counter, plus validated custom codes
//! - Per-link TTL (default 7 days) with periodic purge of expired links
//! - Click counting on redirect
//! - Per-client fixed-window rate limiting of link creation
//! - Graceful shutdown of the server and background workers
//!
//! ## Quick Start
//!
//! ```bash
//! # File-backed store (default)
//! export STORE_PATH="store.json"
//!
//! # Or Redis
//! export STORE_BACKEND="redis"
//! export REDIS_URL="redis://localhost:6379"
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

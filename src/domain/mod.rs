//! Domain layer containing business entities and logic.
//!
//! Independent of HTTP and of any concrete storage backend.
//!
//! # Architecture
//!
//! - [`entities`] - Link records and their projections
//! - [`repositories`] - The [`repositories::LinkStore`] storage contract
//! - [`code_allocator`] - Base-62 codes from the store's monotonic counter
//! - [`expiry`] - Expiry evaluation and the periodic sweep task
//! - [`admission`] - Per-client fixed-window admission limiter
//!
//! # Background Tasks
//!
//! [`expiry::run_expiry_sweeper`] and [`admission::run_limiter_eviction`] both
//! take a `tokio::sync::watch` receiver and exit between cycles once it
//! reports `true`.

pub mod admission;
pub mod code_allocator;
pub mod entities;
pub mod expiry;
pub mod repositories;

//! Repository trait definitions for the domain layer.
//!
//! The [`LinkStore`] trait is the storage contract every backend implements.
//! Implementations live in `crate::infrastructure::persistence`; a mock is
//! auto-generated via `mockall` for service tests.
//!
//! # Testing
//!
//! See `tests/store_file.rs` and `tests/store_redis.rs` for backend contract tests.

pub mod link_store;

pub use link_store::{LinkStore, WriteMode};

#[cfg(test)]
pub use link_store::MockLinkStore;

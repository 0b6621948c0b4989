//! Link store implementations.
//!
//! # Backends
//!
//! - [`FileLinkStore`] - In-process map persisted as an atomically replaced
//!   JSON snapshot (`STORE_BACKEND=file`)
//! - [`RedisLinkStore`] - One Redis key per code plus a counter key
//!   (`STORE_BACKEND=redis`)

pub mod file_link_store;
pub mod redis_link_store;

pub use file_link_store::FileLinkStore;
pub use redis_link_store::RedisLinkStore;

//! Business logic services for the application layer.

pub mod link_service;

pub use link_service::{DEFAULT_TTL_SECONDS, LinkPolicy, LinkService};

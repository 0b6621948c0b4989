//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures. Records are owned by a
//! [`crate::domain::repositories::LinkStore`] and value-copied out to callers.
//!
//! # Entity Types
//!
//! - [`LinkRecord`] - A stored URL mapping with its click counter and lifetime
//! - [`StoredLink`] - A record paired with the code it is stored under
//! - [`LinkInfo`] - Read-only projection returned by inspect/list operations
//! - [`ShortLink`] - Result of a successful shorten operation

pub mod link;

pub use link::{LinkInfo, LinkRecord, MAX_TTL_SECONDS, ShortLink, StoredLink};

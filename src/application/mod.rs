//! Application layer services implementing business logic.
//!
//! Services consume the [`crate::domain::repositories::LinkStore`] trait and
//! provide the operation set the HTTP handlers and the admin tool call.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Shorten, redirect, inspect, list and delete
pub mod services;

//! Utility functions for code generation, URL validation, and request handling.
//!
//! - [`code_generator`] - Base-62 code encoding and custom code validation
//! - [`url_validator`] - Target URL validation
//! - [`client_ip`] - Client identity extraction from HTTP requests

pub mod client_ip;
pub mod code_generator;
pub mod url_validator;

//! Utility functions used across the application.
//!
//! - [`code_generator`] - Short code and API token generation
//! - [`url_normalizer`] - Destination URL validation and normalization
//! - [`extract_domain`] - `Host` / `User-Agent` header access

pub mod code_generator;
pub mod extract_domain;
pub mod url_normalizer;

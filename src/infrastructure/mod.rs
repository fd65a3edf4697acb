//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and outbound HTTP.
//!
//! # Modules
//!
//! - [`metadata`] - Page metadata fetching (HTTP and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod metadata;
pub mod persistence;

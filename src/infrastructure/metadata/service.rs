//! Metadata fetcher trait and error types.

use async_trait::async_trait;

use crate::domain::entities::LinkMetadata;

/// Errors that can occur while fetching page metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Metadata client error: {0}")]
    Client(String),

    #[error("Metadata request failed: {0}")]
    Request(String),

    #[error("Unsupported content type: {0}")]
    NotHtml(String),

    #[error("Refusing to fetch non-public address: {0}")]
    Blocked(String),

    #[error("Response body too large: {0} bytes")]
    TooLarge(u64),
}

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Fetches social preview metadata from a destination page.
///
/// Callers treat every error as "no metadata"; failures are logged and never
/// reach the client that created the link.
///
/// # Implementations
///
/// - [`crate::infrastructure::metadata::HttpMetadataFetcher`] - reqwest + scraper
/// - [`crate::infrastructure::metadata::NullMetadataFetcher`] - always empty
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> MetadataResult<LinkMetadata>;
}

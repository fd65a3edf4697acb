//! Page metadata fetching for link previews.
//!
//! Provides a [`MetadataFetcher`] trait with two implementations:
//! - [`HttpMetadataFetcher`] - Fetches the page and parses Open Graph / HTML tags
//! - [`NullMetadataFetcher`] - No-op implementation for testing/disabled backfill

mod http_fetcher;
mod null_fetcher;
mod service;

pub use http_fetcher::{HttpMetadataFetcher, extract_metadata};
pub use null_fetcher::NullMetadataFetcher;
#[cfg(test)]
pub use service::MockMetadataFetcher;
pub use service::{MetadataError, MetadataFetcher, MetadataResult};

//! No-op metadata fetcher for tests or disabled backfill.

use super::service::{MetadataFetcher, MetadataResult};
use crate::domain::entities::LinkMetadata;
use async_trait::async_trait;
use tracing::debug;

/// A fetcher that never contacts the network and always finds nothing.
///
/// Used when `METADATA_FETCH_ENABLED=false` and in integration tests.
pub struct NullMetadataFetcher;

impl NullMetadataFetcher {
    pub fn new() -> Self {
        debug!("Using NullMetadataFetcher (metadata backfill disabled)");
        Self
    }
}

impl Default for NullMetadataFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataFetcher for NullMetadataFetcher {
    async fn fetch(&self, _url: &str) -> MetadataResult<LinkMetadata> {
        Ok(LinkMetadata::default())
    }
}

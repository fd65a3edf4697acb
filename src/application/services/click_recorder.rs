//! Detached per-channel click counting.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::domain::destination::Channel;
use crate::domain::repositories::LinkRepository;

/// Records redirect clicks off the request path.
///
/// Each call spawns its own task that owns a clone of the repository, so the
/// write runs to completion even if the client has already disconnected.
/// Failures are logged and counted, never returned.
pub struct ClickRecorder<L: LinkRepository> {
    repository: Arc<L>,
}

impl<L: LinkRepository + 'static> ClickRecorder<L> {
    pub fn new(repository: Arc<L>) -> Self {
        Self { repository }
    }

    /// Spawns the atomic increment of `clicks` and the channel counter.
    ///
    /// The returned handle is only awaited in tests.
    pub fn record(&self, link_id: i64, channel: Channel) -> JoinHandle<()> {
        let repository = self.repository.clone();

        tokio::spawn(async move {
            match repository.increment_clicks(link_id, channel).await {
                Ok(true) => {
                    metrics::counter!("link_clicks_recorded_total", "channel" => channel.as_str())
                        .increment(1);
                }
                Ok(false) => {
                    tracing::debug!(link_id, channel = channel.as_str(), "Click for deleted link dropped");
                }
                Err(e) => {
                    metrics::counter!("link_clicks_failed_total", "channel" => channel.as_str())
                        .increment(1);
                    tracing::error!(link_id, channel = channel.as_str(), error = %e, "Failed to record click");
                }
            }
        })
    }
}

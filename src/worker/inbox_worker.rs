use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::api::email::EmailIngestionPipeline;
use crate::api::error::ServiceError;

/// Background worker that pulls the inbox on a fixed interval
///
/// Shares the pipeline (and its single-flight gate) with the HTTP trigger:
/// a tick that overlaps a manually started sync is skipped, not duplicated.
pub struct InboxSyncWorker {
    pipeline: Arc<EmailIngestionPipeline>,
    interval: Duration,
}

impl InboxSyncWorker {
    pub fn new(pipeline: Arc<EmailIngestionPipeline>, interval: Duration) -> Self {
        Self { pipeline, interval }
    }

    /// Run until the shutdown channel flips to true.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            "Inbox sync worker started, interval={}s",
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    match self.pipeline.sync_inbox().await {
                        Ok(summary) => info!(
                            "Periodic inbox sync: stored={}, failed={}",
                            summary.stored_count, summary.failed_count
                        ),
                        Err(ServiceError::SyncInProgress(_)) => {
                            debug!("Inbox sync already running, skipping tick")
                        }
                        Err(e) => error!("Periodic inbox sync failed: {}", e),
                    }
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Inbox sync worker stopping");
                        break;
                    }
                }
            }
        }
    }
}

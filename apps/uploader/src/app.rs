//! Wires the API client and the sync orchestrator together.

use std::sync::Arc;

use replaysync_client::Client;
use replaysync_sync::{ReplayService, SyncError, SyncOrchestrator};
use tokio_util::sync::CancellationToken;

use crate::config::Config;

/// Runs one sync until it completes, fails, or Ctrl-C is pressed.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = Client::new(config.client_config())?;
    let service: Arc<dyn ReplayService> = Arc::new(client);
    let orchestrator = SyncOrchestrator::new(service, config.sync_config());

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            cancel_on_signal.cancel();
        }
    });

    match orchestrator.run(cancel).await {
        Ok(report) => {
            let queue_ids: Vec<i64> = report.uploaded.iter().map(|r| r.outcome.queue_id).collect();
            tracing::info!(
                uploaded = report.uploaded.len(),
                queue_ids = ?queue_ids,
                "sync finished"
            );
            Ok(())
        }
        Err(SyncError::Cancelled) => {
            tracing::info!("sync cancelled");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

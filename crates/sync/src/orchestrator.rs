//! Sync orchestrator: backlog upload followed by optional live watching.
//!
//! Uploads are strictly sequential. Any error ends the current mode and is
//! returned unchanged; nothing is retried. Re-running is always safe since
//! the starting point is re-derived from the remote marker.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::Event;
use replaysync_catalog::{
    ReplayRecord, is_replay_file, list_all_replays, list_replays_newer_than, list_subdirectories,
};
use replaysync_protocol::UploadOutcome;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::service::ReplayService;
use crate::watch_state::WatchState;
use crate::watcher::{ReplayWatcher, is_create_event, is_write_event};

/// A replay accepted by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedReplay {
    pub path: PathBuf,
    pub outcome: UploadOutcome,
}

/// Replays uploaded during the backlog, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BacklogReport {
    pub uploaded: Vec<UploadedReplay>,
}

/// Sorts records by modification time, oldest first. Ties keep their order.
pub fn sort_oldest_first(records: &mut [ReplayRecord]) {
    records.sort_by_key(|record| record.modified);
}

/// Drives backlog processing and the watch loop.
pub struct SyncOrchestrator {
    service: Arc<dyn ReplayService>,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(service: Arc<dyn ReplayService>, config: SyncConfig) -> Self {
        Self { service, config }
    }

    /// Uploads the backlog, then watches if configured.
    ///
    /// Cancelling `cancel` stops the backlog between uploads (with
    /// [`SyncError::Cancelled`]) or ends the watch loop cleanly.
    pub async fn run(&self, cancel: CancellationToken) -> Result<BacklogReport, SyncError> {
        let report = self.run_backlog(&cancel).await?;

        if self.config.watch {
            self.watch(cancel).await?;
        }

        Ok(report)
    }

    /// Uploads every not-yet-uploaded replay, oldest first.
    pub async fn run_backlog(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BacklogReport, SyncError> {
        let mut records = self.select_backlog().await?;
        sort_oldest_first(&mut records);

        info!(count = records.len(), "backlog selected");

        let mut report = BacklogReport::default();
        for record in records {
            if cancel.is_cancelled() {
                info!(
                    uploaded = report.uploaded.len(),
                    "backlog cancelled"
                );
                return Err(SyncError::Cancelled);
            }

            let outcome = self.upload(&record.path).await?;
            report.uploaded.push(UploadedReplay {
                path: record.path,
                outcome,
            });
        }

        info!(uploaded = report.uploaded.len(), "backlog complete");
        Ok(report)
    }

    async fn select_backlog(&self) -> Result<Vec<ReplayRecord>, SyncError> {
        let root = &self.config.root_dir;
        let suffix = &self.config.replay_suffix;

        if self.config.upload_all {
            info!(root = %root.display(), "uploading all replays");
            return Ok(list_all_replays(root, suffix)?);
        }

        let marker = self
            .service
            .fetch_last_replay_marker(&self.config.auth_token)
            .await?;

        match marker {
            Some(marker) => {
                info!(replay_date = %marker.replay_date, "last uploaded replay");
                Ok(list_replays_newer_than(root, suffix, &marker)?)
            }
            None => {
                info!("no replay recorded for account, uploading all replays");
                Ok(list_all_replays(root, suffix)?)
            }
        }
    }

    /// Watches the replay tree until `cancel` fires or an error occurs.
    pub async fn watch(&self, cancel: CancellationToken) -> Result<(), SyncError> {
        let dirs = list_subdirectories(&self.config.root_dir)?;

        let mut watcher = ReplayWatcher::new()?;
        for dir in &dirs {
            watcher.watch_dir(dir)?;
        }
        info!(dirs = watcher.watched_count(), "watching for new replays");

        self.watch_events(&mut watcher, cancel).await
    }

    /// Consumes events from `watcher` until cancelled or the source fails.
    async fn watch_events(
        &self,
        watcher: &mut ReplayWatcher,
        cancel: CancellationToken,
    ) -> Result<(), SyncError> {
        let mut state = WatchState::new();

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    info!(tracked = state.len(), "watch stopped");
                    return Ok(());
                }
                event = watcher.next_event() => event,
            };

            let event = match event {
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    error!(error = %e, "filesystem event source failed");
                    return Err(SyncError::EventSourceFailed(e));
                }
                None => {
                    error!("filesystem event channel closed");
                    return Err(SyncError::EventSourceFailed(notify::Error::generic(
                        "event channel closed",
                    )));
                }
            };

            self.handle_event(watcher, &mut state, event).await?;
        }
    }

    async fn handle_event(
        &self,
        watcher: &mut ReplayWatcher,
        state: &mut WatchState,
        event: Event,
    ) -> Result<(), SyncError> {
        if is_create_event(&event.kind) {
            for path in event.paths.iter().filter(|p| p.is_dir()) {
                if let Err(e) = watcher.watch_dir(path) {
                    warn!(dir = %path.display(), error = %e, "failed to watch new directory");
                }
            }
            return Ok(());
        }

        if !is_write_event(&event.kind) {
            return Ok(());
        }

        for path in &event.paths {
            self.handle_write(state, path).await?;
        }
        Ok(())
    }

    /// Handles a content write to `path`.
    ///
    /// Uploads the file if it is a replay whose size differs from the last
    /// recorded one. Returns whether an upload happened.
    pub async fn handle_write(
        &self,
        state: &mut WatchState,
        path: &Path,
    ) -> Result<bool, SyncError> {
        match is_replay_file(path, &self.config.replay_suffix) {
            Ok(true) => {}
            Ok(false) => return Ok(false),
            Err(e) => {
                warn!(error = %e, "skipping vanished path");
                return Ok(false);
            }
        }

        let size = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping vanished path");
                return Ok(false);
            }
        };

        if !state.observe(path, size) {
            debug!(path = %path.display(), size, "size unchanged, not uploading");
            return Ok(false);
        }

        self.upload(path).await?;
        Ok(true)
    }

    async fn upload(&self, path: &Path) -> Result<UploadOutcome, SyncError> {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self
            .service
            .upload_replay(&self.config.account_hash, &self.config.auth_token, path)
            .await
        {
            Ok(outcome) => {
                info!(
                    file = %file,
                    status = outcome.http_status,
                    queue_id = outcome.queue_id,
                    "replay uploaded"
                );
                Ok(outcome)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "replay upload failed");
                Err(e.into())
            }
        }
    }
}

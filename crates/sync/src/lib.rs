//! Replay synchronization: backlog upload and live watching.
//!
//! # Pipeline
//!
//! 1. **Select**: all replays, or those newer than the remote marker
//! 2. **Order**: oldest modification time first
//! 3. **Upload**: one at a time; the first failure aborts the backlog
//! 4. **Watch** (optional): upload replays whose size changed since the
//!    last handled write event

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod service;
pub mod watch_state;
pub mod watcher;

pub use config::SyncConfig;
pub use error::SyncError;
pub use orchestrator::{BacklogReport, SyncOrchestrator, UploadedReplay, sort_oldest_first};
pub use service::{ReplayService, ServiceFuture};
pub use watch_state::WatchState;
pub use watcher::{ReplayWatcher, is_create_event, is_write_event};

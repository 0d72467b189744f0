//! Sync error types.

use replaysync_catalog::CatalogError;
use replaysync_client::ClientError;

/// Errors that end a backlog run or the watch loop.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("filesystem event source failed: {0}")]
    EventSourceFailed(#[from] notify::Error),

    #[error("cancelled")]
    Cancelled,
}

//! Replay catalog: finds replay files below a directory.
//!
//! A file is a replay iff it is a regular file whose name ends with the
//! replay suffix. Walks are depth-first, visit the entries of a directory in
//! file-name order, and do not follow symlinks. Any error while walking aborts
//! the walk: a partial listing would silently skip uploads.

mod scanner;

use std::path::PathBuf;

pub use scanner::{
    ReplayRecord, filter_newer_than, is_replay_file, list_all_replays, list_replays_newer_than,
    list_subdirectories,
};

/// Errors produced by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The path could not be stat'd (commonly: removed in the meantime).
    #[error("cannot stat {}: {source}", path.display())]
    StatUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error walking {}: {source}", path.display())]
    WalkFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

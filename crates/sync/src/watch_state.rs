//! Size tracking for files seen while watching.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Last observed size per replay path.
///
/// The game writes replays incrementally and every write raises an event;
/// a path is only worth uploading again once its size has changed since the
/// last handled event. Entries are never evicted.
#[derive(Debug, Default)]
pub struct WatchState {
    sizes: HashMap<PathBuf, u64>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `size` for `path`.
    ///
    /// Returns `true` if the path was unseen or its size differs from the
    /// recorded one, i.e. the caller should upload it.
    pub fn observe(&mut self, path: &Path, size: u64) -> bool {
        match self.sizes.get(path) {
            Some(&previous) if previous == size => false,
            _ => {
                self.sizes.insert(path.to_path_buf(), size);
                true
            }
        }
    }

    /// Returns the recorded size for `path`.
    pub fn tracked_size(&self, path: &Path) -> Option<u64> {
        self.sizes.get(path).copied()
    }

    /// Number of tracked paths.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

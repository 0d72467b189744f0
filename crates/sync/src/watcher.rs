//! Filesystem event source for the watch loop.
//!
//! Wraps a `notify` watcher whose callback forwards every event into a tokio
//! channel, so the watch loop can `await` events alongside its cancellation
//! token. Directories are registered one by one (non-recursive).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Directory watcher delivering events asynchronously.
pub struct ReplayWatcher {
    watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<notify::Result<Event>>,
    watched: HashSet<PathBuf>,
}

impl ReplayWatcher {
    /// Creates a watcher with no registered directories.
    pub fn new() -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        Ok(Self {
            watcher,
            receiver: rx,
            watched: HashSet::new(),
        })
    }

    /// Watcher whose events come only from the returned sender.
    #[cfg(test)]
    pub(crate) fn with_channel()
    -> notify::Result<(Self, mpsc::UnboundedSender<notify::Result<Event>>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = RecommendedWatcher::new(|_: notify::Result<Event>| {}, Config::default())?;

        Ok((
            Self {
                watcher,
                receiver: rx,
                watched: HashSet::new(),
            },
            tx,
        ))
    }

    /// Registers `dir`. Returns `false` if it was already registered.
    pub fn watch_dir(&mut self, dir: &Path) -> notify::Result<bool> {
        if self.watched.contains(dir) {
            return Ok(false);
        }
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        self.watched.insert(dir.to_path_buf());
        tracing::debug!(dir = %dir.display(), "watching directory");
        Ok(true)
    }

    /// Waits for the next event or event-source error.
    ///
    /// `None` means the event source has shut down.
    pub async fn next_event(&mut self) -> Option<notify::Result<Event>> {
        self.receiver.recv().await
    }

    /// Number of registered directories.
    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }
}

/// Whether the event reports written file content.
///
/// Create, rename, remove, metadata and access events are not writes.
pub fn is_write_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}

/// Whether the event reports a newly created entry.
pub fn is_create_event(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};
    use std::time::Duration;

    #[test]
    fn write_events() {
        assert!(is_write_event(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(is_write_event(&EventKind::Modify(ModifyKind::Data(
            DataChange::Any
        ))));
        assert!(is_write_event(&EventKind::Modify(ModifyKind::Any)));
    }

    #[test]
    fn non_write_events() {
        let kinds = [
            EventKind::Create(CreateKind::File),
            EventKind::Remove(RemoveKind::File),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            EventKind::Access(AccessKind::Any),
            EventKind::Any,
            EventKind::Other,
        ];
        for kind in kinds {
            assert!(!is_write_event(&kind), "{kind:?} should not count as a write");
        }
    }

    #[test]
    fn create_events() {
        assert!(is_create_event(&EventKind::Create(CreateKind::Folder)));
        assert!(!is_create_event(&EventKind::Modify(ModifyKind::Any)));
    }

    #[test]
    fn watch_dir_registers_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = ReplayWatcher::new().unwrap();

        assert!(watcher.watch_dir(dir.path()).unwrap());
        assert!(!watcher.watch_dir(dir.path()).unwrap());
        assert_eq!(watcher.watched_count(), 1);
    }

    #[test]
    fn watch_dir_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = ReplayWatcher::new().unwrap();
        assert!(watcher.watch_dir(&dir.path().join("missing")).is_err());
        assert_eq!(watcher.watched_count(), 0);
    }

    #[tokio::test]
    async fn delivers_write_event() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = ReplayWatcher::new().unwrap();
        watcher.watch_dir(dir.path()).unwrap();

        let path = dir.path().join("a.SC2Replay");
        std::fs::write(&path, b"replay bytes").unwrap();

        let saw_write = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = watcher.next_event().await {
                let event = event.unwrap();
                if is_write_event(&event.kind)
                    && event.paths.iter().any(|p| p.file_name() == path.file_name())
                {
                    return true;
                }
            }
            false
        })
        .await
        .unwrap_or(false);

        assert!(saw_write, "expected a write event for {}", path.display());
    }
}

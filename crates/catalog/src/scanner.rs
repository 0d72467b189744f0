//! Recursive directory walks producing replay records.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use replaysync_protocol::RemoteReplayMarker;

use crate::CatalogError;

/// A replay file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRecord {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    pub is_regular_file: bool,
}

/// Returns whether `path` currently names a replay file.
///
/// Follows symlinks. Fails with [`CatalogError::StatUnavailable`] when the
/// path cannot be stat'd; callers watching a live directory should treat that
/// as "not a replay right now".
pub fn is_replay_file(path: &Path, suffix: &str) -> Result<bool, CatalogError> {
    let metadata = std::fs::metadata(path).map_err(|source| CatalogError::StatUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(is_replay(path, &metadata, suffix))
}

/// Lists every replay below `root`, in traversal order.
pub fn list_all_replays(root: &Path, suffix: &str) -> Result<Vec<ReplayRecord>, CatalogError> {
    let mut replays = Vec::new();

    walk_tree(root, &mut |path: &Path, metadata: &Metadata| {
        if is_replay(path, metadata, suffix) {
            let modified = metadata
                .modified()
                .map_err(|source| walk_failed(path, source))?;
            replays.push(ReplayRecord {
                path: path.to_path_buf(),
                modified: modified.into(),
                is_regular_file: true,
            });
        }
        Ok(())
    })?;

    tracing::debug!(root = %root.display(), count = replays.len(), "replay scan complete");
    Ok(replays)
}

/// Lists the replays below `root` modified after the marker's cutoff.
pub fn list_replays_newer_than(
    root: &Path,
    suffix: &str,
    marker: &RemoteReplayMarker,
) -> Result<Vec<ReplayRecord>, CatalogError> {
    let all = list_all_replays(root, suffix)?;
    Ok(filter_newer_than(all, marker))
}

/// Keeps the records modified strictly after `marker.cutoff()`.
pub fn filter_newer_than(
    records: Vec<ReplayRecord>,
    marker: &RemoteReplayMarker,
) -> Vec<ReplayRecord> {
    let cutoff = marker.cutoff();
    records
        .into_iter()
        .filter(|record| record.modified > cutoff)
        .collect()
}

/// Lists every directory in the tree, `root` first.
pub fn list_subdirectories(root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut dirs = Vec::new();

    walk_tree(root, &mut |path: &Path, metadata: &Metadata| {
        if metadata.is_dir() {
            dirs.push(path.to_path_buf());
        }
        Ok(())
    })?;

    Ok(dirs)
}

fn is_replay(path: &Path, metadata: &Metadata, suffix: &str) -> bool {
    metadata.is_file()
        && path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(suffix))
}

fn walk_failed(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::WalkFailed {
        path: path.to_path_buf(),
        source,
    }
}

/// Calls `on_entry` for `root` and everything below it.
fn walk_tree<F>(root: &Path, on_entry: &mut F) -> Result<(), CatalogError>
where
    F: FnMut(&Path, &Metadata) -> Result<(), CatalogError>,
{
    let metadata = std::fs::metadata(root).map_err(|source| walk_failed(root, source))?;
    on_entry(root, &metadata)?;

    if metadata.is_dir() {
        walk_dir(root, on_entry)?;
    }
    Ok(())
}

fn walk_dir<F>(current: &Path, on_entry: &mut F) -> Result<(), CatalogError>
where
    F: FnMut(&Path, &Metadata) -> Result<(), CatalogError>,
{
    let mut entries = std::fs::read_dir(current)
        .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
        .map_err(|source| walk_failed(current, source))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        // Symlink metadata: links are neither descended into nor classified.
        let metadata = entry
            .metadata()
            .map_err(|source| walk_failed(&path, source))?;

        on_entry(&path, &metadata)?;

        if metadata.is_dir() {
            walk_dir(&path, on_entry)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use replaysync_protocol::constants::REPLAY_SUFFIX;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn set_mtime(path: &Path, time: SystemTime) {
        fs::OpenOptions::new()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn create_replay_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let multiplayer = root.join("Accounts").join("1234").join("Replays").join("Multiplayer");
        fs::create_dir_all(&multiplayer).unwrap();
        fs::write(multiplayer.join("Alcyone LE.SC2Replay"), b"REPLAY_A").unwrap();
        fs::write(multiplayer.join("Oceanborn LE.SC2Replay"), b"REPLAY_B").unwrap();
        fs::write(multiplayer.join("notes.txt"), b"not a replay").unwrap();

        fs::write(root.join("Variables.txt"), b"cfg").unwrap();
        fs::create_dir_all(root.join("Folder.SC2Replay")).unwrap();

        dir
    }

    fn names(records: &[ReplayRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn is_replay_file_regular_with_suffix() {
        let dir = create_replay_tree();
        let path = dir
            .path()
            .join("Accounts/1234/Replays/Multiplayer/Alcyone LE.SC2Replay");
        assert!(is_replay_file(&path, REPLAY_SUFFIX).unwrap());
    }

    #[test]
    fn is_replay_file_rejects_other_names() {
        let dir = create_replay_tree();
        assert!(!is_replay_file(&dir.path().join("Variables.txt"), REPLAY_SUFFIX).unwrap());

        fs::write(dir.path().join("lower.sc2replay"), b"x").unwrap();
        assert!(!is_replay_file(&dir.path().join("lower.sc2replay"), REPLAY_SUFFIX).unwrap());
    }

    #[test]
    fn is_replay_file_rejects_directories() {
        let dir = create_replay_tree();
        assert!(!is_replay_file(&dir.path().join("Folder.SC2Replay"), REPLAY_SUFFIX).unwrap());
    }

    #[test]
    fn is_replay_file_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = is_replay_file(&dir.path().join("gone.SC2Replay"), REPLAY_SUFFIX).unwrap_err();
        assert!(matches!(err, CatalogError::StatUnavailable { .. }));
    }

    #[test]
    fn is_replay_file_custom_suffix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("match.rep");
        fs::write(&path, b"x").unwrap();
        assert!(is_replay_file(&path, ".rep").unwrap());
        assert!(!is_replay_file(&path, REPLAY_SUFFIX).unwrap());
    }

    #[test]
    fn list_all_finds_nested_replays_only() {
        let dir = create_replay_tree();
        let replays = list_all_replays(dir.path(), REPLAY_SUFFIX).unwrap();

        assert_eq!(
            names(&replays),
            vec!["Alcyone LE.SC2Replay", "Oceanborn LE.SC2Replay"]
        );
        assert!(replays.iter().all(|r| r.is_regular_file));
    }

    #[test]
    fn list_all_records_modification_time() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.SC2Replay");
        fs::write(&path, b"x").unwrap();
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        set_mtime(&path, mtime);

        let replays = list_all_replays(dir.path(), REPLAY_SUFFIX).unwrap();
        assert_eq!(replays.len(), 1);
        assert_eq!(replays[0].modified, DateTime::<Utc>::from(mtime));
    }

    #[test]
    fn list_all_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(list_all_replays(dir.path(), REPLAY_SUFFIX).unwrap().is_empty());
    }

    #[test]
    fn list_all_nonexistent_root() {
        let err = list_all_replays(Path::new("/nonexistent/replay/root"), REPLAY_SUFFIX)
            .unwrap_err();
        assert!(matches!(err, CatalogError::WalkFailed { .. }));
    }

    #[test]
    fn list_all_root_is_replay_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("single.SC2Replay");
        fs::write(&path, b"x").unwrap();

        let replays = list_all_replays(&path, REPLAY_SUFFIX).unwrap();
        assert_eq!(replays.len(), 1);
        assert_eq!(replays[0].path, path);
    }

    #[cfg(unix)]
    #[test]
    fn list_all_skips_symlinks() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("real.SC2Replay");
        fs::write(&target, b"x").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.SC2Replay")).unwrap();
        std::os::unix::fs::symlink("/nonexistent", dir.path().join("broken.SC2Replay")).unwrap();

        let replays = list_all_replays(dir.path(), REPLAY_SUFFIX).unwrap();
        assert_eq!(names(&replays), vec!["real.SC2Replay"]);
    }

    #[test]
    fn newer_than_applies_buffer() {
        let dir = TempDir::new().unwrap();
        let marker_time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let marker = RemoteReplayMarker::at(marker_time.into());

        let cases = [
            ("old.SC2Replay", marker_time - Duration::from_secs(3600)),
            ("at_cutoff.SC2Replay", marker_time - Duration::from_secs(300)),
            ("in_buffer.SC2Replay", marker_time - Duration::from_secs(299)),
            ("new.SC2Replay", marker_time + Duration::from_secs(60)),
        ];
        for (name, mtime) in cases {
            let path = dir.path().join(name);
            fs::write(&path, b"x").unwrap();
            set_mtime(&path, mtime);
        }

        let newer = list_replays_newer_than(dir.path(), REPLAY_SUFFIX, &marker).unwrap();
        assert_eq!(names(&newer), vec!["in_buffer.SC2Replay", "new.SC2Replay"]);
    }

    #[test]
    fn newer_than_is_subset_of_all() {
        let dir = create_replay_tree();
        let all = list_all_replays(dir.path(), REPLAY_SUFFIX).unwrap();
        let marker = RemoteReplayMarker::at(all[0].modified);

        let newer = list_replays_newer_than(dir.path(), REPLAY_SUFFIX, &marker).unwrap();
        assert!(newer.iter().all(|r| all.contains(r)));

        let expected: Vec<_> = all
            .iter()
            .filter(|r| r.modified > marker.replay_time - TimeDelta::minutes(5))
            .cloned()
            .collect();
        assert_eq!(newer, expected);
    }

    #[test]
    fn filter_newer_than_far_future_marker_is_empty() {
        let dir = create_replay_tree();
        let all = list_all_replays(dir.path(), REPLAY_SUFFIX).unwrap();
        let marker = RemoteReplayMarker::at(Utc::now() + TimeDelta::days(1));
        assert!(filter_newer_than(all, &marker).is_empty());
    }

    #[test]
    fn subdirectories_include_root_and_nested() {
        let dir = create_replay_tree();
        let dirs = list_subdirectories(dir.path()).unwrap();

        assert_eq!(dirs[0], dir.path());
        assert!(dirs.contains(&dir.path().join("Accounts")));
        assert!(dirs.contains(&dir.path().join("Accounts/1234/Replays/Multiplayer")));
        assert!(dirs.contains(&dir.path().join("Folder.SC2Replay")));
        assert!(dirs.iter().all(|d| d.is_dir()));
        assert_eq!(dirs.len(), 6);
    }

    #[test]
    fn subdirectories_nonexistent_root() {
        let err = list_subdirectories(Path::new("/nonexistent/replay/root")).unwrap_err();
        assert!(matches!(err, CatalogError::WalkFailed { .. }));
    }
}

use std::fmt;
use std::path::PathBuf;

use replaysync_protocol::constants::REPLAY_SUFFIX;

/// Immutable settings for one sync run.
#[derive(Clone)]
pub struct SyncConfig {
    /// Account the replays are attributed to (`hashkey`).
    pub account_hash: String,
    /// Sent verbatim as the `Authorization` header.
    pub auth_token: String,
    /// Directory tree holding the replays.
    pub root_dir: PathBuf,
    pub replay_suffix: String,
    /// Upload every replay instead of only those newer than the remote marker.
    pub upload_all: bool,
    /// Keep watching `root_dir` after the backlog.
    pub watch: bool,
}

impl SyncConfig {
    /// Incremental, non-watching config with the default replay suffix.
    pub fn new(
        account_hash: impl Into<String>,
        auth_token: impl Into<String>,
        root_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            account_hash: account_hash.into(),
            auth_token: auth_token.into(),
            root_dir: root_dir.into(),
            replay_suffix: REPLAY_SUFFIX.to_string(),
            upload_all: false,
            watch: false,
        }
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("account_hash", &self.account_hash)
            .field("auth_token", &"<redacted>")
            .field("root_dir", &self.root_dir)
            .field("replay_suffix", &self.replay_suffix)
            .field("upload_all", &self.upload_all)
            .field("watch", &self.watch)
            .finish()
    }
}

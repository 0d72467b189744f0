//! Uploader configuration.
//!
//! Settings come from a TOML file, overridden by command-line flags:
//! - Linux: `$XDG_CONFIG_HOME/replaysync/config.toml` (or `~/.config/...`)
//! - Windows: `%APPDATA%/replaysync/config.toml`

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use replaysync_client::ClientConfig;
use replaysync_protocol::constants::{
    DEFAULT_API_URL, DEFAULT_DUMP_FILE, DEFAULT_REQUEST_TIMEOUT, REPLAY_SUFFIX,
};
use replaysync_sync::SyncConfig;
use serde::{Deserialize, Serialize};

/// Uploads StarCraft II replays to a replay-statistics service.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "replaysync", version, about, long_about = None)]
pub struct Cli {
    /// Account hash the replays are attributed to.
    #[arg(long)]
    pub hash: Option<String>,

    /// Authorization token for the API.
    #[arg(long)]
    pub token: Option<String>,

    /// Directory holding the replays.
    #[arg(long)]
    pub dir: Option<String>,

    /// Upload every replay, not only those newer than the last uploaded one.
    #[arg(long, default_value_t = false)]
    pub all: bool,

    /// Keep running and upload replays as they are written.
    #[arg(long, default_value_t = false)]
    pub watch: bool,

    /// API root URL.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Configuration file (defaults to the platform config directory).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Uploader configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account_hash: String,

    #[serde(default)]
    pub auth_token: String,

    /// Replay directory; `~` expands to the home directory.
    #[serde(default)]
    pub replay_dir: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_replay_suffix")]
    pub replay_suffix: String,

    /// Where undecodable API responses are dumped.
    #[serde(default = "default_dump_path")]
    pub dump_path: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub upload_all: bool,

    #[serde(default)]
    pub watch: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

fn default_replay_suffix() -> String {
    REPLAY_SUFFIX.into()
}

fn default_dump_path() -> String {
    DEFAULT_DUMP_FILE.into()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account_hash: String::new(),
            auth_token: String::new(),
            replay_dir: String::new(),
            api_url: default_api_url(),
            replay_suffix: default_replay_suffix(),
            dump_path: default_dump_path(),
            request_timeout_secs: default_request_timeout_secs(),
            upload_all: false,
            watch: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("account_hash", &self.account_hash)
            .field("auth_token", &"<redacted>")
            .field("replay_dir", &self.replay_dir)
            .field("api_url", &self.api_url)
            .field("replay_suffix", &self.replay_suffix)
            .field("dump_path", &self.dump_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("upload_all", &self.upload_all)
            .field("watch", &self.watch)
            .finish()
    }
}

impl Config {
    /// Loads the file named by `--config` (or the default one), applies the
    /// flags, expands `~` and validates the result.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = config_path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_cli(cli);
        config.expand_paths(home_dir().as_deref());
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Overrides file values with the flags that were given.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(hash) = &cli.hash {
            self.account_hash = hash.clone();
        }
        if let Some(token) = &cli.token {
            self.auth_token = token.clone();
        }
        if let Some(dir) = &cli.dir {
            self.replay_dir = dir.clone();
        }
        if let Some(url) = &cli.api_url {
            self.api_url = url.clone();
        }
        self.upload_all |= cli.all;
        self.watch |= cli.watch;
    }

    fn expand_paths(&mut self, home: Option<&Path>) {
        self.replay_dir = expand_home(&self.replay_dir, home);
        self.dump_path = expand_home(&self.dump_path, home);
    }

    /// Checks that the required settings are present.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.replay_dir.is_empty() || self.account_hash.is_empty() || self.auth_token.is_empty()
        {
            bail!("dir, hash and token must be set");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            dump_path: PathBuf::from(&self.dump_path),
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            replay_suffix: self.replay_suffix.clone(),
            upload_all: self.upload_all,
            watch: self.watch,
            ..SyncConfig::new(&self.account_hash, &self.auth_token, &self.replay_dir)
        }
    }
}

/// Replaces a leading `~` or `~/` with `home`. Other paths pass through.
pub fn expand_home(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return path.to_string();
    };

    if path == "~" {
        return home.to_string_lossy().into_owned();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => path.to_string(),
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "USERPROFILE";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let base = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("replaysync").join("config.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("replaysync").join("config.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("replaysync")
            .join("config.toml"))
    }
}

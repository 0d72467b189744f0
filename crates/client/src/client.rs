//! Replay-statistics API client.
//!
//! Every request carries the caller's token verbatim in the `Authorization`
//! header and is bounded by the configured timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use replaysync_protocol::constants::{
    DEFAULT_API_URL, DEFAULT_DUMP_FILE, DEFAULT_REQUEST_TIMEOUT, FIELD_HASHKEY, FIELD_REPLAY_FILE,
    FIELD_UPLOAD_METHOD, LAST_REPLAY_PATH, REPLAY_PATH, UPLOADER_IDENTITY,
};
use replaysync_protocol::{RemoteReplayMarker, UploadOutcome};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::multipart::{Form, Part};

use crate::response::{parse_marker_response, parse_upload_response};

/// Errors from the API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid authorization token")]
    InvalidToken,

    #[error("last replay unavailable (status {status}): {reason}")]
    MarkerUnavailable { status: u16, reason: String },

    #[error("malformed response: {0}")]
    ResponseMalformed(#[source] serde_json::Error),

    #[error("malformed queue id {raw:?}: {source}")]
    QueueIdMalformed {
        raw: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("upload rejected with status {status}: {body}")]
    UploadRejected { status: u16, body: String },
}

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    pub request_timeout: Duration,
    /// Where the raw body of an undecodable response is written.
    pub dump_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            dump_path: PathBuf::from(DEFAULT_DUMP_FILE),
        }
    }
}

/// Replay-statistics API client.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    dump_path: PathBuf,
}

impl Client {
    /// Creates a new client.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dump_path: config.dump_path,
        })
    }

    /// Fetches the last replay the service recorded for the account.
    ///
    /// Returns `Ok(None)` when the account has no recorded replay.
    pub async fn fetch_last_replay_marker(
        &self,
        auth_token: &str,
    ) -> Result<Option<RemoteReplayMarker>, ClientError> {
        let url = format!("{}{}", self.base_url, LAST_REPLAY_PATH);
        let resp = self
            .http
            .get(&url)
            .header(AUTHORIZATION, auth_header(auth_token)?)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;

        let result = parse_marker_response(status, &body);
        if let Err(ClientError::ResponseMalformed(_)) = &result {
            self.dump_body(&body).await;
        }

        match &result {
            Ok(Some(marker)) => {
                tracing::debug!(replay_date = %marker.replay_date, "fetched last replay marker");
            }
            Ok(None) => tracing::debug!(status, "no replay recorded for account"),
            Err(_) => {}
        }
        result
    }

    /// Uploads one replay file for the given account.
    pub async fn upload_replay(
        &self,
        account_hash: &str,
        auth_token: &str,
        path: &Path,
    ) -> Result<UploadOutcome, ClientError> {
        let auth = auth_header(auth_token)?;
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!(file = %file_name, bytes = data.len(), "uploading replay");

        let replay_part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .text(FIELD_UPLOAD_METHOD, UPLOADER_IDENTITY)
            .text(FIELD_HASHKEY, account_hash.to_string())
            .part(FIELD_REPLAY_FILE, replay_part);

        let url = format!("{}{}", self.base_url, REPLAY_PATH);
        let resp = self
            .http
            .post(&url)
            .header(AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;

        let result = parse_upload_response(status, &body);
        if let Err(ClientError::ResponseMalformed(_)) = &result {
            self.dump_body(&body).await;
        }
        result
    }

    /// Preserves an undecodable body for inspection. Best effort.
    async fn dump_body(&self, body: &[u8]) {
        match tokio::fs::write(&self.dump_path, body).await {
            Ok(()) => tracing::warn!(
                path = %self.dump_path.display(),
                "undecodable response body written to dump file"
            ),
            Err(e) => tracing::warn!(
                path = %self.dump_path.display(),
                error = %e,
                "couldn't write dump file"
            ),
        }
    }
}

fn auth_header(token: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(token).map_err(|_| ClientError::InvalidToken)?;
    value.set_sensitive(true);
    Ok(value)
}

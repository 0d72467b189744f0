//! Seam between the orchestrator and the remote API.
//!
//! The binary uses [`replaysync_client::Client`]; tests substitute doubles
//! that record calls.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use replaysync_client::{Client, ClientError};
use replaysync_protocol::{RemoteReplayMarker, UploadOutcome};

/// Boxed future returned by [`ReplayService`] methods.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// Remote operations the orchestrator needs.
pub trait ReplayService: Send + Sync {
    /// Fetches the last replay recorded for the account, if any.
    fn fetch_last_replay_marker<'a>(
        &'a self,
        auth_token: &'a str,
    ) -> ServiceFuture<'a, Option<RemoteReplayMarker>>;

    /// Uploads one replay file.
    fn upload_replay<'a>(
        &'a self,
        account_hash: &'a str,
        auth_token: &'a str,
        path: &'a Path,
    ) -> ServiceFuture<'a, UploadOutcome>;
}

impl ReplayService for Client {
    fn fetch_last_replay_marker<'a>(
        &'a self,
        auth_token: &'a str,
    ) -> ServiceFuture<'a, Option<RemoteReplayMarker>> {
        Box::pin(Client::fetch_last_replay_marker(self, auth_token))
    }

    fn upload_replay<'a>(
        &'a self,
        account_hash: &'a str,
        auth_token: &'a str,
        path: &'a Path,
    ) -> ServiceFuture<'a, UploadOutcome> {
        Box::pin(Client::upload_replay(self, account_hash, auth_token, path))
    }
}

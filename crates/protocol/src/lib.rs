//! Wire types and constants for the replay-statistics API.
//!
//! Shared by the catalog (which needs the marker and suffix), the HTTP client
//! (which produces markers and outcomes) and the sync orchestrator.

pub mod constants;
pub mod types;

pub use types::{LastReplayResponse, RemoteReplayMarker, UploadOutcome, UploadResponse};

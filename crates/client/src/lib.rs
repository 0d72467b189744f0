//! Replay-statistics API client.
//!
//! Async client using `reqwest`. Two operations: fetching the marker of the
//! last replay the service recorded for the account, and uploading a replay
//! file as a multipart form. Response interpretation lives in [`response`]
//! and is usable without any I/O.

pub mod client;
pub mod response;

pub use client::{Client, ClientConfig, ClientError};
pub use response::{parse_marker_response, parse_upload_response};

//! Interpretation of API responses.
//!
//! Only HTTP 200 counts as success. Bodies of other statuses are carried
//! verbatim in the error and never decoded.

use replaysync_protocol::{LastReplayResponse, RemoteReplayMarker, UploadOutcome, UploadResponse};

use crate::ClientError;

const STATUS_OK: u16 = 200;
const STATUS_NOT_FOUND: u16 = 404;

/// Interprets a `GET /account/last-replay` response.
///
/// `Ok(None)` means the account has no recorded replay: a 404, or a 200 whose
/// `replay_date` is missing, null or empty.
pub fn parse_marker_response(
    status: u16,
    body: &[u8],
) -> Result<Option<RemoteReplayMarker>, ClientError> {
    match status {
        STATUS_OK => {}
        STATUS_NOT_FOUND => return Ok(None),
        _ => {
            return Err(ClientError::MarkerUnavailable {
                status,
                reason: body_text(body),
            });
        }
    }

    let resp: LastReplayResponse =
        serde_json::from_slice(body).map_err(ClientError::ResponseMalformed)?;

    match resp.replay_date.as_deref() {
        None | Some("") => Ok(None),
        Some(date) => RemoteReplayMarker::parse(date).map(Some).map_err(|e| {
            ClientError::MarkerUnavailable {
                status,
                reason: format!("invalid replay_date {date:?}: {e}"),
            }
        }),
    }
}

/// Interprets a `POST /replay` response.
pub fn parse_upload_response(status: u16, body: &[u8]) -> Result<UploadOutcome, ClientError> {
    if status != STATUS_OK {
        return Err(ClientError::UploadRejected {
            status,
            body: body_text(body),
        });
    }

    let resp: UploadResponse =
        serde_json::from_slice(body).map_err(ClientError::ResponseMalformed)?;

    let queue_id = resp
        .replay_queue_id
        .parse::<i64>()
        .map_err(|source| ClientError::QueueIdMalformed {
            raw: resp.replay_queue_id.clone(),
            source,
        })?;

    Ok(UploadOutcome {
        http_status: status,
        queue_id_raw: resp.replay_queue_id,
        queue_id,
    })
}

fn body_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}

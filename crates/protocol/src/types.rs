use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::REPLAY_BUFFER_MINUTES;

/// Body of `GET /account/last-replay`.
///
/// `replay_date` is absent or null for accounts without any replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastReplayResponse {
    #[serde(default)]
    pub replay_date: Option<String>,
}

/// Body of a successful `POST /replay`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub replay_queue_id: String,
}

/// The most recent replay the service has recorded for the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReplayMarker {
    /// Parsed `replay_date`.
    pub replay_time: DateTime<Utc>,
    /// `replay_date` as the service sent it.
    pub replay_date: String,
}

impl RemoteReplayMarker {
    /// Parses an RFC3339 `replay_date` string.
    pub fn parse(replay_date: &str) -> Result<Self, chrono::ParseError> {
        let replay_time = DateTime::parse_from_rfc3339(replay_date)?.with_timezone(&Utc);
        Ok(Self {
            replay_time,
            replay_date: replay_date.to_string(),
        })
    }

    /// Builds a marker from an already-parsed time.
    pub fn at(replay_time: DateTime<Utc>) -> Self {
        Self {
            replay_time,
            replay_date: replay_time.to_rfc3339(),
        }
    }

    /// Files modified strictly after this instant count as not yet uploaded.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.replay_time - TimeDelta::minutes(REPLAY_BUFFER_MINUTES)
    }
}

/// Result of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub http_status: u16,
    /// `replay_queue_id` as the service sent it.
    pub queue_id_raw: String,
    pub queue_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn last_replay_with_date() {
        let json = r#"{"replay_date":"2024-03-01T18:30:00+01:00"}"#;
        let resp: LastReplayResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.replay_date.as_deref(), Some("2024-03-01T18:30:00+01:00"));
    }

    #[test]
    fn last_replay_missing_or_null_date() {
        let missing: LastReplayResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.replay_date, None);

        let null: LastReplayResponse = serde_json::from_str(r#"{"replay_date":null}"#).unwrap();
        assert_eq!(null.replay_date, None);
    }

    #[test]
    fn last_replay_ignores_unknown_fields() {
        let json = r#"{"replay_id":7,"replay_date":"2024-03-01T17:30:00Z","map":"Alcyone"}"#;
        let resp: LastReplayResponse = serde_json::from_str(json).unwrap();
        assert!(resp.replay_date.is_some());
    }

    #[test]
    fn marker_parse_normalizes_to_utc() {
        let marker = RemoteReplayMarker::parse("2024-03-01T18:30:00+01:00").unwrap();
        assert_eq!(
            marker.replay_time,
            Utc.with_ymd_and_hms(2024, 3, 1, 17, 30, 0).unwrap()
        );
        assert_eq!(marker.replay_date, "2024-03-01T18:30:00+01:00");
    }

    #[test]
    fn marker_parse_rejects_garbage() {
        assert!(RemoteReplayMarker::parse("").is_err());
        assert!(RemoteReplayMarker::parse("yesterday").is_err());
        assert!(RemoteReplayMarker::parse("2024-03-01 18:30:00").is_err());
    }

    #[test]
    fn cutoff_subtracts_buffer() {
        let marker = RemoteReplayMarker::at(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(
            marker.cutoff(),
            Utc.with_ymd_and_hms(2024, 3, 1, 11, 55, 0).unwrap()
        );
    }

    #[test]
    fn upload_response_queue_id() {
        let resp: UploadResponse = serde_json::from_str(r#"{"replay_queue_id":"42"}"#).unwrap();
        assert_eq!(resp.replay_queue_id, "42");
    }
}

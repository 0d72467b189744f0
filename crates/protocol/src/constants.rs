use std::time::Duration;

/// Identifies this uploader to the API (sent as `upload_method`).
pub const UPLOADER_IDENTITY: &str = "https://github.com/poettler-ric/sc2replayuploader";

/// Root URL for all API endpoints.
pub const DEFAULT_API_URL: &str = "http://api.sc2replaystats.com";

/// Path of the "last uploaded replay" resource.
pub const LAST_REPLAY_PATH: &str = "/account/last-replay";

/// Path of the replay upload resource.
pub const REPLAY_PATH: &str = "/replay";

/// File suffix of replay files written by the game client.
pub const REPLAY_SUFFIX: &str = ".SC2Replay";

/// Subtracted from the remote marker before comparing modification times.
///
/// Absorbs skew between the local clock and the times the service records.
pub const REPLAY_BUFFER_MINUTES: i64 = 5;

/// Multipart field carrying [`UPLOADER_IDENTITY`].
pub const FIELD_UPLOAD_METHOD: &str = "upload_method";

/// Multipart field carrying the account hash.
pub const FIELD_HASHKEY: &str = "hashkey";

/// Multipart file part carrying the replay bytes.
pub const FIELD_REPLAY_FILE: &str = "replay_file";

/// Default file the raw body of an undecodable response is written to.
pub const DEFAULT_DUMP_FILE: &str = "replaysync.dump";

/// Default timeout applied to every API request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

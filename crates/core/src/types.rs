/// Players are keyed by the authentication provider's opaque user id.
pub type PlayerId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

use chrono::SubsecRound;

/// Project identifiers are opaque strings (UUIDv7 when generated here).
pub type ProjectId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Current time truncated to millisecond precision.
///
/// Persisted records store timestamps as epoch milliseconds, so anything
/// finer would not survive a storage round trip.
pub fn now() -> Timestamp {
    chrono::Utc::now().trunc_subsecs(3)
}

/// Generate a new time-ordered project identifier.
pub fn new_project_id() -> ProjectId {
    uuid::Uuid::now_v7().to_string()
}

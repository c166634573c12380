/// Jobs are keyed by a random (v4) UUID allocated at submission.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Allocate a fresh job identifier.
pub fn new_job_id() -> JobId {
    uuid::Uuid::new_v4()
}

/// Parse a job identifier from a URL path segment.
///
/// Only the canonical lowercase hyphenated form handed out at submission is
/// accepted. Anything else yields `None`, so callers can treat malformed ids
/// the same as unknown ones.
pub fn parse_job_id(raw: &str) -> Option<JobId> {
    let id = uuid::Uuid::parse_str(raw).ok()?;
    (id.hyphenated().to_string() == raw).then_some(id)
}

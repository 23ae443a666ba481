//! Time related utils.

/// DateTime in UTC.
pub type DateTime = chrono::DateTime<chrono::Utc>;

/// Create a new DateTime of the current time.
pub fn now() -> DateTime {
    chrono::Utc::now()
}

/// Format a time into the ISO-8601 form a post policy's `expiration`
/// field carries: `2030-01-01T00:00:00.000Z`.
pub fn format_policy_expiration(t: DateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

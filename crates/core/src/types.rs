/// All database primary keys are 64-bit integers.
pub type DbId = i64;

/// All audit timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Instants compared inside SQL (lock deadlines) are unix epoch milliseconds,
/// so expiry checks are plain integer comparisons regardless of which process
/// wrote the row.
pub type UnixMillis = i64;

/// Current time as unix epoch milliseconds.
pub fn now_ms() -> UnixMillis {
    chrono::Utc::now().timestamp_millis()
}

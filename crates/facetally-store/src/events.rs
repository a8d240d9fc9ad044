//! Count-event rows: schema bootstrap and append.
//!
//! Functions here take a plain `rusqlite::Connection` and return
//! `rusqlite::Result` so callers (including the daemon's async writer
//! closure) can compose them directly.

use rusqlite::{params, Connection};

/// Timestamp format stored in `observed_at`: UTC ISO-8601 at seconds
/// precision. Fixed-width, so lexicographic comparison equals temporal
/// comparison in queries.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One previously-unseen face was counted.
///
/// Immutable once constructed; `sequence` is the running count at the
/// moment of creation and the store assigns the timestamp at insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountEvent {
    pub sequence: u64,
    pub label: String,
}

impl CountEvent {
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            label: format!("face-{sequence}"),
        }
    }
}

/// Create the append-only event table if it does not exist. Idempotent.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS count_events (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            label       TEXT    NOT NULL,
            sequence    INTEGER NOT NULL,
            observed_at TEXT    NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        );
        CREATE INDEX IF NOT EXISTS idx_count_events_observed_at
            ON count_events (observed_at);",
    )
}

/// Append one count event; the row's timestamp is store-assigned.
/// Returns the new row id.
pub fn append_event(conn: &Connection, event: &CountEvent) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO count_events (label, sequence) VALUES (?1, ?2)",
        params![event.label, event.sequence as i64],
    )?;
    Ok(conn.last_insert_rowid())
}

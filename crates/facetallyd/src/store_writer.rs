//! Asynchronous, best-effort count-event writer.
//!
//! Runs as a background task fed by the engine's channel, keeping store
//! latency and failures entirely off the frame path. Per event it re-reads
//! the connection settings, opens a connection, performs a single insert
//! and closes again — so settings edits apply on the next write, and there
//! is no pooling and no retry: a failed append is logged and the event
//! dropped.

use facetally_store::{events, CountEvent, StoreConfig, StoreError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("settings: {0}")]
    Settings(#[from] StoreError),
    #[error("sqlite: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
}

/// Spawn the writer task. It drains the channel until every sender is
/// dropped, then exits.
pub fn spawn(
    settings_path: PathBuf,
    data_dir: PathBuf,
    mut events_rx: mpsc::Receiver<CountEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("store writer started");
        while let Some(event) = events_rx.recv().await {
            let sequence = event.sequence;
            match write_event(&settings_path, &data_dir, event).await {
                Ok(row_id) => {
                    tracing::debug!(sequence, row_id, "count event persisted");
                }
                Err(error) => {
                    tracing::warn!(%error, sequence, "store append failed; dropping event");
                }
            }
        }
        tracing::info!("store writer stopped");
    })
}

async fn write_event(
    settings_path: &Path,
    data_dir: &Path,
    event: CountEvent,
) -> Result<i64, WriterError> {
    let config = StoreConfig::load(settings_path)?;
    let db_path = config.db_path(data_dir);

    let conn = tokio_rusqlite::Connection::open(&db_path).await?;
    let row_id = conn
        .call(move |conn| {
            events::ensure_schema(conn)?;
            Ok(events::append_event(conn, &event)?)
        })
        .await?;

    if let Err(error) = conn.close().await {
        tracing::debug!(%error, "store connection close failed");
    }
    Ok(row_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_event_appends_row() {
        let dir = tempfile::tempdir().unwrap();
        let settings_path = dir.path().join("settings.toml");
        StoreConfig::default().save(&settings_path).unwrap();

        let row_id = write_event(&settings_path, dir.path(), CountEvent::new(1))
            .await
            .unwrap();
        assert_eq!(row_id, 1);

        let db_path = StoreConfig::default().db_path(dir.path());
        let conn = rusqlite::Connection::open(db_path).unwrap();
        let (label, sequence): (String, i64) = conn
            .query_row(
                "SELECT label, sequence FROM count_events WHERE id = ?1",
                [row_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(label, "face-1");
        assert_eq!(sequence, 1);
    }

    #[tokio::test]
    async fn test_write_event_missing_settings_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_event(
            &dir.path().join("absent.toml"),
            dir.path(),
            CountEvent::new(1),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_settings_edit_applies_on_next_write() {
        let dir = tempfile::tempdir().unwrap();
        let settings_path = dir.path().join("settings.toml");

        let mut config = StoreConfig::default();
        config.save(&settings_path).unwrap();
        write_event(&settings_path, dir.path(), CountEvent::new(1))
            .await
            .unwrap();

        // Point the settings at a different database; the next write must
        // land there without any writer restart.
        config.database = "relocated".to_string();
        config.save(&settings_path).unwrap();
        write_event(&settings_path, dir.path(), CountEvent::new(2))
            .await
            .unwrap();

        let conn = rusqlite::Connection::open(config.db_path(dir.path())).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM count_events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}

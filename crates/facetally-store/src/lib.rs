//! facetally-store — Count-event persistence and time-bucket aggregations.
//!
//! One append-only table of count events backs both processes: the capture
//! daemon appends one row per newly-seen unique face (fire-and-forget),
//! and the reporting CLI runs read-only aggregations over it.

pub mod config;
pub mod events;
pub mod reports;

use thiserror::Error;

pub use config::{default_data_dir, default_settings_path, StoreConfig};
pub use events::{append_event, ensure_schema, CountEvent};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store settings field '{field}' must not be empty")]
    InvalidConfig { field: &'static str },
    #[error("invalid calendar date: year {year}, month {month}")]
    InvalidDate { year: i32, month: u32 },
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("settings encode: {0}")]
    Encode(#[from] toml::ser::Error),
}

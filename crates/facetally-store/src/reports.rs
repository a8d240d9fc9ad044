//! Read-only time-bucket aggregations over the count-event table.
//!
//! Buckets are always returned fully zero-filled: an hour, day or month
//! with no events reports 0, never a missing entry. Queries bucket on the
//! stored UTC timestamps.

use crate::events::TIMESTAMP_FORMAT;
use crate::StoreError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection};

/// Unique-face counts per hour-of-day over the 24 hours ending at `now`.
///
/// Index 0 is hour 00; the window is `(now - 24h, now]`, so at most one
/// day's worth of events contributes to each bucket.
pub fn counts_by_hour(conn: &Connection, now: DateTime<Utc>) -> Result<[u64; 24], StoreError> {
    let end = now.format(TIMESTAMP_FORMAT).to_string();
    let start = (now - Duration::hours(24)).format(TIMESTAMP_FORMAT).to_string();

    let mut stmt = conn.prepare(
        "SELECT CAST(strftime('%H', observed_at) AS INTEGER) AS hour, COUNT(*)
         FROM count_events
         WHERE observed_at > ?1 AND observed_at <= ?2
         GROUP BY hour",
    )?;
    let rows = stmt.query_map(params![start, end], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut buckets = [0u64; 24];
    for row in rows {
        let (hour, total) = row?;
        if (0..24).contains(&hour) {
            buckets[hour as usize] = total as u64;
        }
    }
    Ok(buckets)
}

/// Unique-face counts per day-of-month for the given month.
///
/// The returned vector has exactly as many entries as the month has days
/// (index 0 = day 1), leap years included.
pub fn counts_by_day(conn: &Connection, year: i32, month: u32) -> Result<Vec<u64>, StoreError> {
    let days = days_in_month(year, month).ok_or(StoreError::InvalidDate { year, month })?;

    let mut stmt = conn.prepare(
        "SELECT CAST(strftime('%d', observed_at) AS INTEGER) AS day, COUNT(*)
         FROM count_events
         WHERE CAST(strftime('%Y', observed_at) AS INTEGER) = ?1
           AND CAST(strftime('%m', observed_at) AS INTEGER) = ?2
         GROUP BY day",
    )?;
    let rows = stmt.query_map(params![year, month], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut buckets = vec![0u64; days as usize];
    for row in rows {
        let (day, total) = row?;
        if (1..=days as i64).contains(&day) {
            buckets[(day - 1) as usize] = total as u64;
        }
    }
    Ok(buckets)
}

/// Unique-face counts per month for the given year (index 0 = January).
pub fn counts_by_month(conn: &Connection, year: i32) -> Result<[u64; 12], StoreError> {
    let mut stmt = conn.prepare(
        "SELECT CAST(strftime('%m', observed_at) AS INTEGER) AS month, COUNT(*)
         FROM count_events
         WHERE CAST(strftime('%Y', observed_at) AS INTEGER) = ?1
         GROUP BY month",
    )?;
    let rows = stmt.query_map(params![year], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut buckets = [0u64; 12];
    for row in rows {
        let (month, total) = row?;
        if (1..=12).contains(&month) {
            buckets[(month - 1) as usize] = total as u64;
        }
    }
    Ok(buckets)
}

/// Number of days in a calendar month, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

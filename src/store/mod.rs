// src/store/mod.rs
//! Append-only snapshot history in SQLite.
//!
//! Tables:
//! - `_dbinfo`: one row, first and latest capture date held anywhere.
//! - `accounts`: one row per player, first and latest capture date. Names
//!   compare without regard to ASCII case.
//! - `records`: the twelve counters per (date, username).
//!
//! Dates are stored as `YYYYMMDD` integers. The store opens read-only;
//! [`SnapshotStore::writer`] hands out a [`WriteGuard`] for ingestion and
//! puts the connection back into read-only mode when dropped.

mod db;
mod query;

use chrono::{Datelike, NaiveDate};

use crate::error::StoreError;
use crate::stats::Field;

pub use db::{SnapshotStore, WriteGuard};
pub use query::{Cmp, Filter, Order, Ranked, ScanQuery};

/// First and latest sighting of one player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    pub username: String,
    pub first_date: NaiveDate,
    pub latest_date: NaiveDate,
}

/// Date range covered by the whole store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DbInfo {
    pub first_date: NaiveDate,
    pub latest_date: NaiveDate,
}

/// Result of storing one snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// First time this player was seen.
    pub new_account: bool,
    /// Counters lower than in the player's previous snapshot. The record is
    /// stored regardless.
    pub anomalies: Vec<Field>,
}

/// Result of storing one day's worth of snapshots.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub new_accounts: usize,
    /// Players whose counters went down since their previous snapshot.
    pub anomalies: Vec<(String, Vec<Field>)>,
    /// Stale, duplicate or out-of-range snapshots that were not stored.
    pub rejected: Vec<StoreError>,
}

pub fn date_to_int(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

pub fn int_to_date(value: i64) -> Result<NaiveDate, StoreError> {
    let year = i32::try_from(value / 10_000).map_err(|_| StoreError::InvalidDate(value))?;
    let month = (value / 100 % 100) as u32;
    let day = (value % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(StoreError::InvalidDate(value))
}

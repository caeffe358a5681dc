// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::stats::Field;

/// Network collaborator failures. Always fatal to the run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {code} from {url}")]
    Status { code: u16, url: String },
}

impl FetchError {
    pub fn category(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status { .. } => "http status",
        }
    }
}

/// Why one leaderboard row was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing column {index} (row has {len})")]
    MissingColumn { index: usize, len: usize },

    #[error("bad {field} value {value:?}")]
    Format { field: &'static str, value: String },
}

impl RowError {
    pub fn category(&self) -> &'static str {
        match self {
            RowError::MissingColumn { .. } => "missing column",
            RowError::Format { .. } => "format",
        }
    }
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Fetching offset {start} failed: {source}")]
    Fetch { start: u32, source: FetchError },

    #[error("Fetch worker stopped early: {0}")]
    Worker(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store is read-only; acquire a writer first")]
    ReadOnly,

    #[error("{username}: snapshot for {date} is older than latest {latest}")]
    StaleDate { username: String, date: i64, latest: i64 },

    #[error("{username}: snapshot for {date} already stored")]
    Duplicate { username: String, date: i64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{username}: {field} = {value} does not fit a database integer")]
    CounterOutOfRange { username: String, field: Field, value: u64 },

    #[error("Invalid stored date: {0}")]
    InvalidDate(i64),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Historical CSV files.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No history files in {}", .0.display())]
    NoFiles(PathBuf),

    #[error("Not a dated history file: {}", .0.display())]
    BadFileName(PathBuf),
}

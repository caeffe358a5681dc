// src/lib.rs
//! Daily leaderboard snapshots for Running With Rifles: scrape, archive,
//! derive, rank.

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod specs;
pub mod stats;

pub mod file;
pub mod progress;
pub mod report;
pub mod scrape;
pub mod store;

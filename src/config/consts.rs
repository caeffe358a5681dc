// src/config/consts.rs

// Net config
pub const HOST: &str = "rwr.runningwithrifles.com";
pub const PREFIX: &str = "/rwr_stats/";
pub const PLAYERS_PAGE: &str = "view_players.php";
pub const USER_AGENT: &str = concat!("rwrtrack/", env!("CARGO_PKG_VERSION"));
pub const TIMEOUT_SECS: u64 = 15;

// Scrape
pub const PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGES: u32 = 5;
pub const DEFAULT_SORT: &str = "rank_progression";
pub const MIN_COLUMNS: usize = 16;

// Local store
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "debug.log";
pub const DEFAULT_DB_FILE: &str = "rwrtrack_history.db";
pub const DEFAULT_HISTORY_DIR: &str = "csv_historical";
pub const ENV_DB: &str = "RWRTRACK_DB";
pub const ENV_HISTORY: &str = "RWRTRACK_HISTORY";

// Concurrency
pub const WORKERS: usize = 4;
pub const RETRIES: u32 = 2;
pub const REQUEST_PAUSE_MS: u64 = 75; // be polite
pub const JITTER_MS: u64 = 50; // extra 0..50 ms

// Approximate equatorial circumference of Earth
pub const EARTH_EQUAT_CIRC_KM: f64 = 40_075.0;

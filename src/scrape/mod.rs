// src/scrape/mod.rs
mod scrape;

pub use scrape::{collect_stats, parse_page, scrape, PageOutcome};

// src/config/options.rs
use std::path::PathBuf;

use super::consts::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Pages of `PAGE_SIZE` rows, starting at offset 0.
    pub pages: u32,
    /// Leaderboard sort key, e.g. `rank_progression` or `kills`.
    pub sort: String,
    pub workers: usize,
    /// Extra attempts per page before the run is aborted.
    pub retries: u32,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            pages: DEFAULT_PAGES,
            sort: s!(DEFAULT_SORT),
            workers: WORKERS,
            retries: RETRIES,
        }
    }
}

impl ScrapeOptions {
    /// Start offsets of every page, ascending.
    pub fn offsets(&self) -> Vec<u32> {
        (0..self.pages).map(|p| p * PAGE_SIZE).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    pub db_path: PathBuf,
    pub history_dir: PathBuf,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
        }
    }
}

impl StoreOptions {
    /// Defaults, overridden by `RWRTRACK_DB` / `RWRTRACK_HISTORY` when set.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        opts.apply_env(|k| std::env::var(k).ok());
        opts
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(p) = lookup(ENV_DB).filter(|v| !v.is_empty()) {
            self.db_path = PathBuf::from(p);
        }
        if let Some(p) = lookup(ENV_HISTORY).filter(|v| !v.is_empty()) {
            self.history_dir = PathBuf::from(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_step_by_page_size() {
        let opts = ScrapeOptions { pages: 3, ..ScrapeOptions::default() };
        assert_eq!(opts.offsets(), vec![0, 100, 200]);
        let none = ScrapeOptions { pages: 0, ..ScrapeOptions::default() };
        assert!(none.offsets().is_empty());
    }

    #[test]
    fn env_overrides_paths() {
        let mut opts = StoreOptions::default();
        opts.apply_env(|k| match k {
            ENV_DB => Some(s!("/tmp/x.db")),
            ENV_HISTORY => Some(s!()),
            _ => None,
        });
        assert_eq!(opts.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(opts.history_dir, PathBuf::from(DEFAULT_HISTORY_DIR));
    }
}

// src/log.rs
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::consts::{LOG_FILE, STORE_DIR};

/// `[HH:MM:SS.mmm]` since the logger was installed.
struct Elapsed(Instant);

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", fmt_elapsed(self.0.elapsed().as_millis()))
    }
}

fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

fn open_log_file() -> Option<File> {
    let path = PathBuf::from(STORE_DIR).join(LOG_FILE);
    fs::create_dir_all(STORE_DIR).ok()?;
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Install the global subscriber: stderr filtered by `RUST_LOG` (or by
/// `verbosity`: 0 warn, 1 info, 2+ debug), plus everything from this crate
/// at debug level appended to `.store/debug.log`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .with_filter(stderr_filter);

    let file = open_log_file().map(|f| {
        fmt::layer()
            .with_writer(Mutex::new(f))
            .with_ansi(false)
            .with_target(false)
            .with_timer(Elapsed(Instant::now()))
            .with_filter(EnvFilter::new("rwrtrack=debug"))
    });

    let _ = tracing_subscriber::registry().with(stderr).with(file).try_init();
}

// src/scrape/scrape.rs
use std::{
    thread, time::Duration,
    sync::{ mpsc, atomic::{ AtomicBool, AtomicUsize, Ordering }}
};

use tracing::{debug, error, info, warn};

use crate::{
    config::options::ScrapeOptions,
    config::consts::{ REQUEST_PAUSE_MS, JITTER_MS },
    core::{ html, net },
    error::{ FetchError, ScrapeError },
    progress::Progress,
    specs::players,
    stats::RawStats,
};

/// Records parsed out of one page, plus how many rows were dropped.
#[derive(Debug, Default)]
pub struct PageOutcome {
    pub stats: Vec<RawStats>,
    pub skipped: usize,
}

/// Parse every leaderboard row on one page. Bad rows are logged and skipped.
pub fn parse_page(doc: &str) -> PageOutcome {
    let mut out = PageOutcome::default();
    for (i, cells) in html::table_rows(doc).into_iter().enumerate() {
        match players::parse_row(&cells) {
            Ok(s) => out.stats.push(s),
            Err(e) => {
                warn!(row = i, category = e.category(), "Skipping row {cells:?}: {e}");
                out.skipped += 1;
            }
        }
    }
    out
}

/// Fetch and parse the live leaderboard.
pub fn scrape(
    opts: &ScrapeOptions,
    progress: Option<&mut dyn Progress>,
) -> Result<Vec<RawStats>, ScrapeError> {
    let client = net::client().map_err(|source| ScrapeError::Fetch { start: 0, source })?;
    collect_stats(opts, |url| net::http_get(&client, url), progress)
}

/// Fetch `opts.pages` pages with a small worker pool and parse them in offset
/// order. Any page that still fails after its retries aborts the whole run.
pub fn collect_stats<F>(
    opts: &ScrapeOptions,
    fetch: F,
    mut progress: Option<&mut dyn Progress>,
) -> Result<Vec<RawStats>, ScrapeError>
where
    F: Fn(&str) -> Result<String, FetchError> + Sync,
{
    let offsets = opts.offsets();
    info!("Retrieving {} pages of stats, sorted by {}", offsets.len(), opts.sort);

    if let Some(p) = progress.as_deref_mut() {
        p.begin(offsets.len());
        p.log(&format!("Fetching {} pages sorted by {}", offsets.len(), opts.sort));
    }

    let counter = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);
    let workers = opts.workers.min(offsets.len()).max(1);

    let mut pages: Vec<(u32, String)> = Vec::with_capacity(offsets.len());
    let mut failure: Option<ScrapeError> = None;

    thread::scope(|s| {
        let (res_tx, res_rx) = mpsc::channel::<(u32, Result<String, FetchError>)>();

        for _ in 0..workers {
            let tx = res_tx.clone();
            let (offsets, counter, stop, fetch) = (&offsets, &counter, &stop, &fetch);

            s.spawn(move || {
                loop {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    let i = counter.fetch_add(1, Ordering::Relaxed);
                    if i >= offsets.len() {
                        break;
                    }
                    let start = offsets[i];
                    let url = net::leaderboard_url(&opts.sort, start);
                    let result = fetch_with_retry(fetch, &url, opts.retries);
                    if tx.send((start, result)).is_err() {
                        break;
                    }
                    let jitter = u64::from(start / 100) % JITTER_MS;
                    thread::sleep(Duration::from_millis(REQUEST_PAUSE_MS + jitter)); // be polite
                }
            });
        }
        drop(res_tx); // main thread is sole receiver now

        for _ in 0..offsets.len() {
            match res_rx.recv() {
                Ok((start, Ok(doc))) => {
                    debug!("Page at {start}: {} bytes", doc.len());
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_done(start);
                    }
                    pages.push((start, doc));
                }
                Ok((start, Err(e))) => {
                    error!(category = e.category(), "Requesting stats at {start} failed: {e}");
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_failed(start);
                    }
                    stop.store(true, Ordering::Relaxed);
                    failure = Some(ScrapeError::Fetch { start, source: e });
                    break;
                }
                Err(_) => {
                    stop.store(true, Ordering::Relaxed);
                    failure = Some(ScrapeError::Worker(s!("result channel closed")));
                    break;
                }
            }
        }
        // dropping the receiver unblocks any worker still sending
        drop(res_rx);
    });

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    if let Some(e) = failure {
        return Err(e);
    }

    // Workers finish out of order
    pages.sort_by_key(|(start, _)| *start);

    let mut stats = Vec::new();
    let mut skipped = 0;
    for (_, doc) in &pages {
        let page = parse_page(doc);
        skipped += page.skipped;
        stats.extend(page.stats);
    }
    info!("Parsed {} players ({} rows skipped)", stats.len(), skipped);
    Ok(stats)
}

fn fetch_with_retry<F>(fetch: &F, url: &str, retries: u32) -> Result<String, FetchError>
where
    F: Fn(&str) -> Result<String, FetchError>,
{
    let mut attempt = 0;
    loop {
        match fetch(url) {
            Ok(doc) => return Ok(doc),
            Err(e) if attempt < retries => {
                attempt += 1;
                warn!(category = e.category(), "Attempt {attempt} for {url} failed: {e}; retrying");
                thread::sleep(Duration::from_millis(REQUEST_PAUSE_MS * u64::from(attempt)));
            }
            Err(e) => return Err(e),
        }
    }
}

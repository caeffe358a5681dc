// src/cli.rs
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::{debug, info, warn};

use crate::config::consts::{DEFAULT_PAGES, DEFAULT_SORT};
use crate::config::options::{ScrapeOptions, StoreOptions};
use crate::error::StoreError;
use crate::file;
use crate::progress::Progress;
use crate::report;
use crate::scrape;
use crate::stats::Metric;
use crate::store::{Cmp, Order, ScanQuery, SnapshotStore};

#[derive(Parser, Debug)]
#[command(name = "rwrtrack", about = "Running With Rifles leaderboard tracker")]
#[command(version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Snapshot database (default: $RWRTRACK_DB or rwrtrack_history.db)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Directory of dated history files (default: $RWRTRACK_HISTORY or csv_historical)
    #[arg(long, global = true, value_name = "DIR")]
    pub history: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print one player's report from the latest history file
    Lookup {
        /// Player name, any case
        name: String,
    },
    /// Fetch the leaderboard and write today's history file
    Scrape(ScrapeArgs),
    /// Load every history file into the snapshot database
    Import,
    /// Rank players by a base or derived metric
    Rank(RankArgs),
    /// Report what a player gained between two stored dates
    Progress(ProgressArgs),
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Leaderboard pages to fetch
    #[arg(long, default_value_t = DEFAULT_PAGES)]
    pub pages: u32,

    /// Leaderboard sort key
    #[arg(long, default_value = DEFAULT_SORT)]
    pub sort: String,
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// e.g. kdr, xp_per_hour, kills
    pub metric: Metric,

    /// Capture date, YYYY-MM-DD (default: latest)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Skip players with less time played than this
    #[arg(long, default_value_t = 0.0)]
    pub min_hours: f64,
}

#[derive(Args, Debug)]
pub struct ProgressArgs {
    pub name: String,

    /// Older capture date, YYYY-MM-DD
    #[arg(long)]
    pub from: NaiveDate,

    /// Newer capture date (default: the player's latest)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl Cli {
    fn store_options(&self) -> StoreOptions {
        let mut opts = StoreOptions::from_env();
        if let Some(p) = &self.db {
            opts.db_path = p.clone();
        }
        if let Some(d) = &self.history {
            opts.history_dir = d.clone();
        }
        opts
    }
}

/// Parse the process arguments and run. Returns the exit code.
pub fn run() -> Result<u8> {
    run_from(std::env::args_os())
}

pub fn run_from<I, T>(args: I) -> Result<u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also land here
            let _ = e.print();
            return Ok(if e.use_stderr() { 1 } else { 0 });
        }
    };

    crate::log::init(cli.verbose);
    let opts = cli.store_options();

    match &cli.command {
        Command::Lookup { name } => lookup(name, &opts.history_dir),
        Command::Scrape(args) => scrape_cmd(args, &opts, cli.db.is_some()),
        Command::Import => import(&opts),
        Command::Rank(args) => rank(args, &opts),
        Command::Progress(args) => progress(args, &opts),
    }
}

/* ---------------- Commands ---------------- */

fn lookup(name: &str, history_dir: &Path) -> Result<u8> {
    match lookup_report(name, history_dir)? {
        Some(text) => {
            print!("{text}");
            Ok(0)
        }
        None => {
            eprintln!("Player {} not found in the latest snapshot", name.to_uppercase());
            Ok(1)
        }
    }
}

/// Report for `name` out of the most recent history file in `history_dir`,
/// or `None` if the player is not in it.
pub fn lookup_report(name: &str, history_dir: &Path) -> Result<Option<String>> {
    let (date, path) = file::latest_history(history_dir)?;
    let stats = file::read_history(&path)
        .wrap_err_with(|| format!("Reading {}", path.display()))?;
    let wanted = name.trim().to_uppercase();
    Ok(stats
        .iter()
        .find(|s| s.username.to_uppercase() == wanted)
        .map(|s| format!("{} ({date})\n{}", s.username, report::render_stats(s))))
}

fn scrape_cmd(args: &ScrapeArgs, opts: &StoreOptions, ingest: bool) -> Result<u8> {
    let scrape_opts = ScrapeOptions {
        pages: args.pages,
        sort: args.sort.clone(),
        ..ScrapeOptions::default()
    };
    let mut sink = LogProgress::default();
    let progress: &mut dyn Progress = &mut sink;
    let stats = scrape::scrape(&scrape_opts, Some(progress)).wrap_err("Scrape aborted")?;

    let today = Local::now().date_naive();
    let path = file::write_history(&opts.history_dir, today, &stats)?;
    println!("Wrote {} players to {}", stats.len(), path.display());

    if ingest {
        let mut store = SnapshotStore::open(&opts.db_path)?;
        let out = store.writer()?.insert_snapshots(&stats, today)?;
        println!(
            "Stored {} snapshots ({} new players, {} rejected)",
            out.inserted, out.new_accounts, out.rejected.len()
        );
    }
    Ok(0)
}

fn import(opts: &StoreOptions) -> Result<u8> {
    let mut store = SnapshotStore::open(&opts.db_path)?;
    let done = store.writer()?.import_history(&opts.history_dir)?;
    if done.is_empty() {
        println!("No history files in {}", opts.history_dir.display());
    }
    for (date, out) in &done {
        println!(
            "{date}: {} stored, {} new players, {} rejected",
            out.inserted, out.new_accounts, out.rejected.len()
        );
    }
    Ok(0)
}

fn rank(args: &RankArgs, opts: &StoreOptions) -> Result<u8> {
    let store = SnapshotStore::open(&opts.db_path)?;
    let mut query = ScanQuery { date: args.date, ..ScanQuery::default() }
        .order_by(args.metric, Order::Desc)
        .limit(args.limit);
    if args.min_hours > 0.0 {
        query = query.filter(Metric::TimePlayedHours, Cmp::Ge, args.min_hours);
    }

    let rows = store.scan_all(&query)?;
    if rows.is_empty() {
        println!("No snapshots match");
        return Ok(0);
    }
    print!("{}", report::render_ranking(args.metric, &rows));
    Ok(0)
}

fn progress(args: &ProgressArgs, opts: &StoreOptions) -> Result<u8> {
    let store = SnapshotStore::open(&opts.db_path)?;
    let Some(acc) = store.account(args.name.trim())? else {
        eprintln!("Player {} not found", args.name.trim());
        return Ok(1);
    };
    let name = acc.username;
    let to = args.to.unwrap_or(acc.latest_date);
    if to <= args.from {
        return Err(eyre!("--to ({to}) must be after --from ({})", args.from));
    }

    let pair = store
        .get(&name, Some(args.from))
        .and_then(|older| Ok((older, store.get(&name, Some(to))?)));
    let (older, newer) = match pair {
        Ok(p) => p,
        Err(StoreError::NotFound(what)) => {
            eprintln!("No snapshot for {what}");
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    let decreased = newer.decreased_fields(&older);
    if !decreased.is_empty() {
        warn!("{name}: counters went down between {} and {to}: {decreased:?}", args.from);
    }
    println!("{name} ({} to {to})", args.from);
    print!("{}", report::render_stats(&newer.delta(&older)));
    Ok(0)
}

/* ---------------- Progress sink ---------------- */

#[derive(Default)]
struct LogProgress {
    total: usize,
    done: usize,
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }

    fn log(&mut self, msg: &str) {
        debug!("{msg}");
    }

    fn item_done(&mut self, start: u32) {
        self.done += 1;
        info!("Page at {start} done ({}/{})", self.done, self.total);
    }

    fn item_failed(&mut self, start: u32) {
        warn!("Page at {start} failed");
    }

    fn finish(&mut self) {
        info!("Fetched {}/{} pages", self.done, self.total);
    }
}

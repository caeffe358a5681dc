// src/file.rs
//
// Historical snapshot files: one CSV per capture date, `<dir>/<YYYY-MM-DD>.csv`.
// ISO names sort lexicographically in date order.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use tracing::{debug, info};

use crate::error::HistoryError;
use crate::stats::raw::HEADER;
use crate::stats::{Field, RawStats};

pub const DATE_FMT: &str = "%Y-%m-%d";

pub fn history_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}.csv", date.format(DATE_FMT)))
}

/// Write one day's snapshot. The header and the username column are always
/// quoted, counters never are. Returns the path written to.
pub fn write_history(dir: &Path, date: NaiveDate, stats: &[RawStats]) -> Result<PathBuf, HistoryError> {
    ensure_directory(dir)?;
    let path = history_path(dir, date);
    debug!("Writing {} rows to {}", stats.len(), path.display());

    // Quoting is done here per column; the writer emits fields as given.
    let mut w = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_path(&path)?;
    w.write_record(HEADER.iter().map(|h| quoted(h)))?;
    for s in stats {
        let counters = Field::ALL.into_iter().map(|f| s.get(f).to_string());
        w.write_record(std::iter::once(quoted(&s.username)).chain(counters))?;
    }
    w.flush()?;
    Ok(path)
}

/// `"text"`, inner quotes doubled.
fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

pub fn read_history(path: &Path) -> Result<Vec<RawStats>, HistoryError> {
    let mut r = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let rows = r.deserialize().collect::<Result<Vec<RawStats>, _>>()?;
    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Capture date from an ISO file stem, e.g. `2018-05-17.csv`.
pub fn date_from_path(path: &Path) -> Result<NaiveDate, HistoryError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FMT).ok())
        .ok_or_else(|| HistoryError::BadFileName(path.to_path_buf()))
}

/// Every dated `.csv` in `dir`, oldest first. Other files are ignored.
pub fn list_history(dir: &Path) -> Result<Vec<(NaiveDate, PathBuf)>, HistoryError> {
    let mut out = Vec::new();
    if !dir.exists() {
        return Ok(out);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() { continue; }
        if path.extension().and_then(|s| s.to_str()).unwrap_or("") != "csv" { continue; }
        if let Ok(date) = date_from_path(&path) {
            out.push((date, path));
        }
    }
    out.sort();
    Ok(out)
}

/// The most recent history file in `dir`.
pub fn latest_history(dir: &Path) -> Result<(NaiveDate, PathBuf), HistoryError> {
    let latest = list_history(dir)?
        .pop()
        .ok_or_else(|| HistoryError::NoFiles(dir.to_path_buf()))?;
    info!("Latest history file: {}", latest.1.display());
    Ok(latest)
}

pub fn ensure_directory(dir: &Path) -> Result<(), HistoryError> {
    if dir.as_os_str().is_empty() { return Ok(()); }
    if dir.exists() && !dir.is_dir() {
        return Err(std::io::Error::other(format!(
            "Path exists but is not a directory: {}",
            dir.display()
        ))
        .into());
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FMT).unwrap()
    }

    fn alice() -> RawStats {
        RawStats { username: s!("ALICE"), xp: 12, kills: 3, distance_moved: 1500, ..RawStats::default() }
    }

    #[test]
    fn quoting_is_non_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_history(dir.path(), date("2018-05-17"), &[alice()]).unwrap();
        assert!(p.ends_with("2018-05-17.csv"));
        let text = fs::read_to_string(&p).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"username\",\"xp\",\"time_played\",\"kills\",\"deaths\",\"longest_kill_streak\",\
             \"targets_destroyed\",\"vehicles_destroyed\",\"soldiers_healed\",\"team_kills\",\
             \"distance_moved\",\"shots_fired\",\"throwables_thrown\""
        );
        assert_eq!(lines.next().unwrap(), "\"ALICE\",12,0,3,0,0,0,0,0,0,1500,0,0");
    }

    #[test]
    fn numeric_looking_names_are_still_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let rows = [
            alice(),
            RawStats { username: s!("1337"), kills: 9, ..RawStats::default() },
            RawStats { username: s!("2.5"), ..RawStats::default() },
        ];
        let p = write_history(dir.path(), date("2018-05-17"), &rows).unwrap();
        let text = fs::read_to_string(&p).unwrap();
        let lines: Vec<_> = text.lines().skip(1).collect();
        assert_eq!(lines[1], "\"1337\",0,0,9,0,0,0,0,0,0,0,0,0");
        assert!(lines[2].starts_with("\"2.5\",0,"));
        assert_eq!(read_history(&p).unwrap(), rows);
    }

    #[test]
    fn empty_snapshot_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_history(dir.path(), date("2018-05-17"), &[]).unwrap();
        assert!(fs::read_to_string(&p).unwrap().starts_with("\"username\""));
        assert!(read_history(&p).unwrap().is_empty());
    }

    #[test]
    fn list_sorts_and_ignores_strays() {
        let dir = tempfile::tempdir().unwrap();
        for d in ["2018-06-01", "2018-05-17", "2019-01-02"] {
            write_history(dir.path(), date(d), &[alice()]).unwrap();
        }
        fs::write(dir.path().join("notes.csv"), "x").unwrap();
        fs::write(dir.path().join("2018-07-01.txt"), "x").unwrap();

        let dates: Vec<_> = list_history(dir.path()).unwrap().into_iter().map(|(d, _)| d).collect();
        assert_eq!(dates, vec![date("2018-05-17"), date("2018-06-01"), date("2019-01-02")]);
        assert_eq!(latest_history(dir.path()).unwrap().0, date("2019-01-02"));
    }

    #[test]
    fn missing_dir_has_no_latest() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert!(list_history(&gone).unwrap().is_empty());
        assert!(matches!(latest_history(&gone), Err(HistoryError::NoFiles(_))));
    }

    #[test]
    fn bad_file_name_is_rejected() {
        assert!(matches!(
            date_from_path(Path::new("dir/yesterday.csv")),
            Err(HistoryError::BadFileName(_))
        ));
    }
}

// src/store/db.rs
use std::ops::ControlFlow;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use tracing::{debug, error, info, warn};

use super::query::{Ranked, ScanQuery};
use super::{date_to_int, int_to_date, AccountInfo, BatchOutcome, DbInfo, InsertOutcome};
use crate::error::StoreError;
use crate::file;
use crate::stats::raw::HEADER;
use crate::stats::{derive_sum_expr, Field, Metric, RawStats};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS _dbinfo (
    id          INTEGER PRIMARY KEY,
    first_date  INTEGER NOT NULL,
    latest_date INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS accounts (
    username    TEXT PRIMARY KEY COLLATE NOCASE,
    first_date  INTEGER NOT NULL,
    latest_date INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS records (
    date                INTEGER NOT NULL,
    username            TEXT NOT NULL COLLATE NOCASE REFERENCES accounts(username),
    xp                  INTEGER NOT NULL,
    time_played         INTEGER NOT NULL,
    kills               INTEGER NOT NULL,
    deaths              INTEGER NOT NULL,
    longest_kill_streak INTEGER NOT NULL,
    targets_destroyed   INTEGER NOT NULL,
    vehicles_destroyed  INTEGER NOT NULL,
    soldiers_healed     INTEGER NOT NULL,
    team_kills          INTEGER NOT NULL,
    distance_moved      INTEGER NOT NULL,
    shots_fired         INTEGER NOT NULL,
    throwables_thrown   INTEGER NOT NULL,
    PRIMARY KEY (date, username)
);
CREATE INDEX IF NOT EXISTS records_username ON records(username, date);
";

/// SQLite-backed snapshot history.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open or create the database at `path`, read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            file::ensure_directory(parent)?;
        }
        info!("Opening snapshot store {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// In-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        let store = Self { conn };
        store.set_query_only(true)?;
        Ok(store)
    }

    fn set_query_only(&self, on: bool) -> Result<(), StoreError> {
        debug!("[Set database query_only {}]", if on { "ON" } else { "OFF" });
        let pragma = if on { "PRAGMA query_only = ON;" } else { "PRAGMA query_only = OFF;" };
        self.conn.execute_batch(pragma)?;
        Ok(())
    }

    pub fn is_read_only(&self) -> Result<bool, StoreError> {
        let on: i64 = self.conn.query_row("PRAGMA query_only", [], |r| r.get(0))?;
        Ok(on != 0)
    }

    /// Switch to write mode for the lifetime of the returned guard.
    pub fn writer(&mut self) -> Result<WriteGuard<'_>, StoreError> {
        self.set_query_only(false)?;
        Ok(WriteGuard { store: self })
    }

    /* ---------------- Lookups ---------------- */

    pub fn db_info(&self) -> Result<Option<DbInfo>, StoreError> {
        db_info_in(&self.conn)
    }

    pub fn account(&self, username: &str) -> Result<Option<AccountInfo>, StoreError> {
        account_in(&self.conn, username)
    }

    /// Every capture date held, oldest first.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT DISTINCT date FROM records ORDER BY date")?;
        let raw = stmt
            .query_map([], |r| r.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter().map(int_to_date).collect()
    }

    /// The player's snapshot on `date`, or their latest one when `date` is `None`.
    pub fn get(&self, username: &str, date: Option<NaiveDate>) -> Result<RawStats, StoreError> {
        let date = match date {
            Some(d) => d,
            None => {
                let acc = self
                    .account(username)?
                    .ok_or_else(|| StoreError::NotFound(s!(username)))?;
                acc.latest_date
            }
        };
        record_in(&self.conn, username, date_to_int(date))?
            .ok_or_else(|| StoreError::NotFound(format!("{username} on {date}")))
    }

    /// Every stored snapshot of one player, oldest first.
    pub fn history(&self, username: &str) -> Result<Vec<(NaiveDate, RawStats)>, StoreError> {
        let sql = format!("SELECT date, {} FROM records WHERE username = ?1 ORDER BY date", columns());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([username], |r| Ok((r.get::<_, i64>(0)?, stats_from_row(r, 1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(d, s)| Ok((int_to_date(d)?, s)))
            .collect()
    }

    /// Stream rows matching `query` straight off the SQLite cursor. Filtering
    /// and ordering on derived metrics happen inside SQLite. Returns the number
    /// of rows visited.
    pub fn scan<F>(&self, query: &ScanQuery, mut visit: F) -> Result<usize, StoreError>
    where
        F: FnMut(Ranked) -> ControlFlow<()>,
    {
        let date = match query.date {
            Some(d) => d,
            None => match self.db_info()? {
                Some(info) => info.latest_date,
                None => return Ok(0),
            },
        };

        let sql = query.to_sql(&columns());
        debug!("scan: {sql}");
        let mut params = vec![Value::Integer(date_to_int(date))];
        params.extend(query.filters.iter().map(|f| Value::Real(f.value)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let value_col = HEADER.len();

        let mut seen = 0;
        while let Some(row) = rows.next()? {
            let ranked = Ranked {
                stats: stats_from_row(row, 0)?,
                value: row.get::<_, Option<f64>>(value_col)?,
            };
            seen += 1;
            if visit(ranked).is_break() {
                break;
            }
        }
        Ok(seen)
    }

    /// [`scan`](Self::scan) into a vector.
    pub fn scan_all(&self, query: &ScanQuery) -> Result<Vec<Ranked>, StoreError> {
        let mut out = Vec::new();
        self.scan(query, |r| {
            out.push(r);
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    /// `metric` over the summed counters of every player on `date`.
    pub fn aggregate(&self, metric: Metric, date: NaiveDate) -> Result<f64, StoreError> {
        let sql = format!("SELECT {} FROM records WHERE date = ?1", derive_sum_expr(metric));
        Ok(self.conn.query_row(&sql, [date_to_int(date)], |r| r.get(0))?)
    }
}

/// Write access to a [`SnapshotStore`]. Dropping the guard puts the store
/// back into read-only mode, whether or not the writes succeeded.
pub struct WriteGuard<'a> {
    store: &'a mut SnapshotStore,
}

impl WriteGuard<'_> {
    /// Store one snapshot.
    ///
    /// Fails with `StaleDate` if the player already has a later snapshot, with
    /// `Duplicate` if one exists for `date` and with `CounterOutOfRange` if a
    /// counter exceeds `i64::MAX`; nothing is written then. Player names match
    /// regardless of ASCII case.
    pub fn insert_snapshot(&mut self, stats: &RawStats, date: NaiveDate) -> Result<InsertOutcome, StoreError> {
        let tx = self.store.conn.transaction().map_err(write_err)?;
        let outcome = insert_in(&tx, stats, date)?;
        touch_db_info(&tx, date)?;
        tx.commit().map_err(write_err)?;
        Ok(outcome)
    }

    /// Store one day's snapshots in a single transaction. Stale, duplicate and
    /// out-of-range rows are reported in the outcome, not fatal.
    pub fn insert_snapshots(&mut self, stats: &[RawStats], date: NaiveDate) -> Result<BatchOutcome, StoreError> {
        let tx = self.store.conn.transaction().map_err(write_err)?;
        let mut out = BatchOutcome::default();

        for s in stats {
            match insert_in(&tx, s, date) {
                Ok(o) => {
                    out.inserted += 1;
                    if o.new_account { out.new_accounts += 1; }
                    if !o.anomalies.is_empty() {
                        out.anomalies.push((s.username.clone(), o.anomalies));
                    }
                }
                Err(
                    e @ (StoreError::StaleDate { .. }
                    | StoreError::Duplicate { .. }
                    | StoreError::CounterOutOfRange { .. }),
                ) => {
                    warn!("Not storing snapshot: {e}");
                    out.rejected.push(e);
                }
                Err(e) => return Err(e),
            }
        }
        if out.inserted > 0 {
            touch_db_info(&tx, date)?;
        }
        tx.commit().map_err(write_err)?;

        info!(
            "Stored {} snapshots for {date} ({} new players, {} anomalies, {} rejected)",
            out.inserted, out.new_accounts, out.anomalies.len(), out.rejected.len()
        );
        Ok(out)
    }

    /// Ingest every history file in `dir`, oldest first.
    pub fn import_history(&mut self, dir: &Path) -> Result<Vec<(NaiveDate, BatchOutcome)>, StoreError> {
        let mut done = Vec::new();
        for (date, path) in file::list_history(dir)? {
            let stats = file::read_history(&path)?;
            done.push((date, self.insert_snapshots(&stats, date)?));
        }
        Ok(done)
    }

    /// Reads through the guard see the writes made so far.
    pub fn store(&self) -> &SnapshotStore {
        &*self.store
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.store.set_query_only(true) {
            error!("Failed to restore read-only mode: {e}");
        }
    }
}

/* ---------------- Row helpers ---------------- */

fn columns() -> String {
    HEADER.join(", ")
}

fn write_err(e: rusqlite::Error) -> StoreError {
    if e.sqlite_error_code() == Some(ErrorCode::ReadOnly) {
        StoreError::ReadOnly
    } else {
        StoreError::Database(e)
    }
}

/// SQLite integers are signed; larger counters are refused, not clamped.
fn to_int(stats: &RawStats, field: Field) -> Result<i64, StoreError> {
    let value = stats.get(field);
    i64::try_from(value).map_err(|_| StoreError::CounterOutOfRange {
        username: stats.username.clone(),
        field,
        value,
    })
}

/// Read the username and twelve counters starting at column `at`.
fn stats_from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<RawStats> {
    let mut s = RawStats { username: row.get(at)?, ..RawStats::default() };
    for (i, f) in Field::ALL.into_iter().enumerate() {
        let col = at + 1 + i;
        let v: i64 = row.get(col)?;
        let v = u64::try_from(v).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(col, v))?;
        set_field(&mut s, f, v);
    }
    Ok(s)
}

fn set_field(s: &mut RawStats, field: Field, v: u64) {
    match field {
        Field::Xp => s.xp = v,
        Field::TimePlayed => s.time_played = v,
        Field::Kills => s.kills = v,
        Field::Deaths => s.deaths = v,
        Field::LongestKillStreak => s.longest_kill_streak = v,
        Field::TargetsDestroyed => s.targets_destroyed = v,
        Field::VehiclesDestroyed => s.vehicles_destroyed = v,
        Field::SoldiersHealed => s.soldiers_healed = v,
        Field::TeamKills => s.team_kills = v,
        Field::DistanceMoved => s.distance_moved = v,
        Field::ShotsFired => s.shots_fired = v,
        Field::ThrowablesThrown => s.throwables_thrown = v,
    }
}

fn db_info_in(conn: &Connection) -> Result<Option<DbInfo>, StoreError> {
    let row = conn
        .query_row("SELECT first_date, latest_date FROM _dbinfo WHERE id = 1", [], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?))
        })
        .optional()?;
    row.map(|(f, l)| Ok(DbInfo { first_date: int_to_date(f)?, latest_date: int_to_date(l)? }))
        .transpose()
}

fn account_in(conn: &Connection, username: &str) -> Result<Option<AccountInfo>, StoreError> {
    let row = conn
        .query_row(
            "SELECT username, first_date, latest_date FROM accounts WHERE username = ?1",
            [username],
            |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?, r.get::<_, i64>(2)?)),
        )
        .optional()?;
    row.map(|(username, f, l)| {
        Ok(AccountInfo {
            username,
            first_date: int_to_date(f)?,
            latest_date: int_to_date(l)?,
        })
    })
    .transpose()
}

fn record_in(conn: &Connection, username: &str, date: i64) -> Result<Option<RawStats>, StoreError> {
    let sql = format!("SELECT {} FROM records WHERE username = ?1 AND date = ?2", columns());
    Ok(conn
        .query_row(&sql, params![username, date], |r| stats_from_row(r, 0))
        .optional()?)
}

fn insert_in(conn: &Connection, stats: &RawStats, date: NaiveDate) -> Result<InsertOutcome, StoreError> {
    let d = date_to_int(date);
    // Checked up front so a bad row writes nothing
    let counters = Field::ALL
        .into_iter()
        .map(|f| to_int(stats, f).map(Value::Integer))
        .collect::<Result<Vec<_>, _>>()?;
    let mut outcome = InsertOutcome::default();

    // Names match case-insensitively; records keep the account's spelling.
    let username = match account_in(conn, &stats.username)? {
        None => {
            conn.execute(
                "INSERT INTO accounts (username, first_date, latest_date) VALUES (?1, ?2, ?2)",
                params![stats.username, d],
            )
            .map_err(write_err)?;
            outcome.new_account = true;
            stats.username.clone()
        }
        Some(acc) => {
            let latest = date_to_int(acc.latest_date);
            if d < latest {
                return Err(StoreError::StaleDate { username: acc.username, date: d, latest });
            }
            if d == latest {
                return Err(StoreError::Duplicate { username: acc.username, date: d });
            }
            if let Some(prev) = record_in(conn, &acc.username, latest)? {
                outcome.anomalies = stats.decreased_fields(&prev);
                if !outcome.anomalies.is_empty() {
                    warn!(
                        "{}: counters decreased since {}: {:?}",
                        acc.username, acc.latest_date, outcome.anomalies
                    );
                }
            }
            conn.execute(
                "UPDATE accounts SET latest_date = ?2 WHERE username = ?1",
                params![acc.username, d],
            )
            .map_err(write_err)?;
            acc.username
        }
    };

    let mut values = vec![Value::Integer(d), Value::Text(username)];
    values.extend(counters);
    let placeholders = (1..=values.len()).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ");
    let sql = format!("INSERT INTO records (date, {}) VALUES ({placeholders})", columns());
    conn.execute(&sql, params_from_iter(values.iter())).map_err(write_err)?;

    Ok(outcome)
}

fn touch_db_info(conn: &Connection, date: NaiveDate) -> Result<(), StoreError> {
    let d = date_to_int(date);
    conn.execute(
        "INSERT INTO _dbinfo (id, first_date, latest_date) VALUES (1, ?1, ?1)
         ON CONFLICT(id) DO UPDATE SET
             first_date = MIN(first_date, excluded.first_date),
             latest_date = MAX(latest_date, excluded.latest_date)",
        [d],
    )
    .map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn player(name: &str, kills: u64) -> RawStats {
        RawStats {
            username: s!(name),
            xp: kills * 100,
            time_played: 60,
            kills,
            deaths: 2,
            ..RawStats::default()
        }
    }

    #[test]
    fn opens_read_only() {
        let store = SnapshotStore::open_in_memory().unwrap();
        assert!(store.is_read_only().unwrap());
        assert!(store.db_info().unwrap().is_none());
    }

    #[test]
    fn raw_write_while_read_only_is_rejected() {
        let store = SnapshotStore::open_in_memory().unwrap();
        let err = store
            .conn
            .execute("INSERT INTO _dbinfo (id, first_date, latest_date) VALUES (1, 1, 1)", [])
            .map_err(write_err)
            .unwrap_err();
        assert!(matches!(err, StoreError::ReadOnly), "{err}");
    }

    #[test]
    fn guard_restores_read_only() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        {
            let mut w = store.writer().unwrap();
            assert!(!w.store().is_read_only().unwrap());
            w.insert_snapshot(&player("A", 1), date(2018, 5, 1)).unwrap();
        }
        assert!(store.is_read_only().unwrap());
    }

    #[test]
    fn guard_restores_read_only_after_failure() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let result = (|| -> Result<(), StoreError> {
            let mut w = store.writer()?;
            w.insert_snapshot(&player("A", 1), date(2018, 5, 2))?;
            w.insert_snapshot(&player("A", 1), date(2018, 5, 1))?;
            Ok(())
        })();
        assert!(matches!(result, Err(StoreError::StaleDate { .. })));
        assert!(store.is_read_only().unwrap());
    }

    #[test]
    fn first_and_latest_dates_track_sightings() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut w = store.writer().unwrap();
        let o = w.insert_snapshot(&player("A", 1), date(2018, 5, 1)).unwrap();
        assert!(o.new_account);
        let o = w.insert_snapshot(&player("A", 5), date(2018, 5, 3)).unwrap();
        assert!(!o.new_account);
        assert!(o.anomalies.is_empty());
        drop(w);

        let acc = store.account("A").unwrap().unwrap();
        assert_eq!(acc.first_date, date(2018, 5, 1));
        assert_eq!(acc.latest_date, date(2018, 5, 3));
        assert_eq!(store.get("A", None).unwrap().kills, 5);
        assert_eq!(store.get("A", Some(date(2018, 5, 1))).unwrap().kills, 1);
        assert_eq!(store.dates().unwrap(), vec![date(2018, 5, 1), date(2018, 5, 3)]);
    }

    #[test]
    fn older_date_is_a_caller_error() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut w = store.writer().unwrap();
        w.insert_snapshot(&player("A", 5), date(2018, 5, 3)).unwrap();
        let err = w.insert_snapshot(&player("A", 1), date(2018, 5, 1)).unwrap_err();
        assert!(
            matches!(err, StoreError::StaleDate { date: 20180501, latest: 20180503, .. }),
            "{err}"
        );
        drop(w);

        let acc = store.account("A").unwrap().unwrap();
        assert_eq!(acc.latest_date, date(2018, 5, 3));
        assert!(matches!(store.get("A", Some(date(2018, 5, 1))), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn same_date_twice_is_duplicate() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut w = store.writer().unwrap();
        w.insert_snapshot(&player("A", 5), date(2018, 5, 3)).unwrap();
        let err = w.insert_snapshot(&player("A", 6), date(2018, 5, 3)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[test]
    fn decreased_counters_are_flagged_but_stored() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut w = store.writer().unwrap();
        w.insert_snapshot(&player("A", 9), date(2018, 5, 1)).unwrap();
        let o = w.insert_snapshot(&player("A", 4), date(2018, 5, 2)).unwrap();
        assert_eq!(o.anomalies, vec![Field::Xp, Field::Kills]);
        drop(w);
        assert_eq!(store.get("A", None).unwrap().kills, 4);
    }

    #[test]
    fn batch_reports_rejections_and_keeps_going() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut w = store.writer().unwrap();
        w.insert_snapshot(&player("B", 1), date(2018, 5, 9)).unwrap();
        let out = w
            .insert_snapshots(&[player("A", 1), player("B", 2), player("C", 3)], date(2018, 5, 2))
            .unwrap();
        assert_eq!(out.inserted, 2);
        assert_eq!(out.new_accounts, 2);
        assert_eq!(out.rejected.len(), 1);
        drop(w);

        let info = store.db_info().unwrap().unwrap();
        assert_eq!(info.first_date, date(2018, 5, 2));
        assert_eq!(info.latest_date, date(2018, 5, 9));
    }

    #[test]
    fn history_is_oldest_first() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut w = store.writer().unwrap();
        w.insert_snapshot(&player("A", 1), date(2018, 5, 1)).unwrap();
        w.insert_snapshot(&player("A", 3), date(2018, 6, 1)).unwrap();
        drop(w);
        let h = store.history("A").unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h[0].0, date(2018, 5, 1));
        assert_eq!(h[1].1.kills, 3);
        assert!(store.history("nobody").unwrap().is_empty());
    }

    #[test]
    fn names_match_regardless_of_case() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut w = store.writer().unwrap();
        assert!(w.insert_snapshot(&player("Alice", 1), date(2018, 5, 1)).unwrap().new_account);
        let o = w.insert_snapshot(&player("ALICE", 2), date(2018, 5, 2)).unwrap();
        assert!(!o.new_account);
        let err = w.insert_snapshot(&player("alice", 3), date(2018, 5, 2)).unwrap_err();
        assert!(matches!(&err, StoreError::Duplicate { username, .. } if username == "Alice"), "{err}");
        drop(w);

        let acc = store.account("aLiCe").unwrap().unwrap();
        assert_eq!(acc.username, "Alice");
        assert_eq!(acc.latest_date, date(2018, 5, 2));
        let latest = store.get("alice", None).unwrap();
        assert_eq!(latest.username, "Alice");
        assert_eq!(latest.kills, 2);
        assert_eq!(store.history("ALICE").unwrap().len(), 2);
    }

    #[test]
    fn oversized_counter_writes_nothing() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut w = store.writer().unwrap();
        let huge = RawStats { xp: u64::MAX, ..player("A", 1) };
        let err = w.insert_snapshot(&huge, date(2018, 5, 1)).unwrap_err();
        assert!(
            matches!(err, StoreError::CounterOutOfRange { field: Field::Xp, value: u64::MAX, .. }),
            "{err}"
        );
        drop(w);
        assert!(store.account("A").unwrap().is_none());
        assert!(store.db_info().unwrap().is_none());
    }

    #[test]
    fn batch_rejects_oversized_rows_only() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let mut w = store.writer().unwrap();
        let huge = RawStats { shots_fired: i64::MAX as u64 + 1, ..player("B", 2) };
        let out = w
            .insert_snapshots(&[player("A", 1), huge, player("C", 3)], date(2018, 5, 1))
            .unwrap();
        assert_eq!(out.inserted, 2);
        assert!(matches!(
            out.rejected[..],
            [StoreError::CounterOutOfRange { field: Field::ShotsFired, .. }]
        ));
        drop(w);
        assert!(store.account("B").unwrap().is_none());
        assert_eq!(store.get("C", None).unwrap().kills, 3);
    }

    #[test]
    fn negative_stored_counter_is_an_error() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        store.writer().unwrap().insert_snapshot(&player("A", 1), date(2018, 5, 1)).unwrap();
        store.set_query_only(false).unwrap();
        store.conn.execute("UPDATE records SET deaths = -1", []).unwrap();
        store.set_query_only(true).unwrap();

        let err = store.get("A", None).unwrap_err();
        assert!(
            matches!(err, StoreError::Database(rusqlite::Error::IntegralValueOutOfRange(..))),
            "{err}"
        );
    }

    #[test]
    fn aggregate_past_i64_does_not_overflow() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let big = i64::MAX as u64;
        let rows = [
            RawStats { xp: big, ..player("A", 1) },
            RawStats { xp: big, ..player("B", 1) },
        ];
        store.writer().unwrap().insert_snapshots(&rows, date(2018, 5, 1)).unwrap();

        let total = store.aggregate(Metric::Base(Field::Xp), date(2018, 5, 1)).unwrap();
        assert!((total / 2f64.powi(64) - 1.0).abs() < 1e-9, "{total}");
        let per_kill = store.aggregate(Metric::XpPerKill, date(2018, 5, 1)).unwrap();
        assert!((per_kill / 2f64.powi(63) - 1.0).abs() < 1e-9, "{per_kill}");
    }

    #[test]
    fn unknown_player_is_not_found() {
        let store = SnapshotStore::open_in_memory().unwrap();
        assert!(matches!(store.get("GHOST", None), Err(StoreError::NotFound(_))));
    }
}

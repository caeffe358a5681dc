// src/specs/players.rs
//
// Leaderboard row layout (view_players.php), by column index:
//   1 username, 2 kills, 3 deaths, 6 time played ("2h 30min"),
//   7 longest kill streak, 8 targets destroyed, 9 vehicles destroyed,
//   10 soldiers healed, 11 team kills, 12 distance moved ("1.5km"),
//   13 shots fired, 14 throwables thrown, 15 xp.
// Columns 0, 4 and 5 (rank, score, K/D) are recomputed, never read.

use crate::config::consts::MIN_COLUMNS;
use crate::core::sanitize::strip_grouping;
use crate::error::RowError;
use crate::stats::RawStats;

/// Parse one leaderboard row into a record, or say why it was skipped.
pub fn parse_row<S: AsRef<str>>(cells: &[S]) -> Result<RawStats, RowError> {
    if cells.len() < MIN_COLUMNS {
        return Err(RowError::MissingColumn { index: cells.len(), len: cells.len() });
    }
    let col = |i: usize| cells[i].as_ref().trim();

    let username = col(1);
    if username.is_empty() {
        return Err(RowError::Format { field: "username", value: s!() });
    }

    Ok(RawStats {
        username: s!(username),
        kills: parse_count("kills", col(2))?,
        deaths: parse_count("deaths", col(3))?,
        time_played: parse_time_played(col(6))?,
        longest_kill_streak: parse_count("longest_kill_streak", col(7))?,
        targets_destroyed: parse_count("targets_destroyed", col(8))?,
        vehicles_destroyed: parse_count("vehicles_destroyed", col(9))?,
        soldiers_healed: parse_count("soldiers_healed", col(10))?,
        team_kills: parse_count("team_kills", col(11))?,
        distance_moved: parse_distance_moved(col(12))?,
        shots_fired: parse_count("shots_fired", col(13))?,
        throwables_thrown: parse_count("throwables_thrown", col(14))?,
        xp: parse_count("xp", col(15))?,
    })
}

fn format_err(field: &'static str, value: &str) -> RowError {
    RowError::Format { field, value: s!(value) }
}

fn parse_count(field: &'static str, text: &str) -> Result<u64, RowError> {
    strip_grouping(text).parse().map_err(|_| format_err(field, text))
}

/// `"2h 30min"` (or `"2h 30m"`) → 150 minutes. Both parts are required; a
/// total that does not fit in `u64` minutes is a format error.
pub fn parse_time_played(text: &str) -> Result<u64, RowError> {
    let err = || format_err("time_played", text);

    let mut parts = text.split_whitespace();
    let (Some(h), Some(m), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(err());
    };
    let hours: u64 = h.strip_suffix('h').ok_or_else(err)?.parse().map_err(|_| err())?;
    let mins = m
        .strip_suffix("min")
        .or_else(|| m.strip_suffix('m'))
        .ok_or_else(err)?;
    let mins: u64 = mins.parse().map_err(|_| err())?;

    hours.checked_mul(60).and_then(|m| m.checked_add(mins)).ok_or_else(err)
}

/// `"12.34km"` → 12340 metres, truncated.
pub fn parse_distance_moved(text: &str) -> Result<u64, RowError> {
    let err = || format_err("distance_moved", text);

    let km: f64 = text
        .strip_suffix("km")
        .ok_or_else(err)?
        .trim()
        .parse()
        .map_err(|_| err())?;
    if !km.is_finite() || km < 0.0 {
        return Err(err());
    }
    Ok((km * 1000.0) as u64)
}

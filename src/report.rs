// src/report.rs
//
// Box-drawn terminal tables. Layout only; every number comes from
// `stats::DerivedView` or the record itself.

use std::fmt::Write;

use crate::stats::{DerivedView, Metric, RawStats};
use crate::store::Ranked;

const C0W: usize = 20;
const C1W: usize = 12;
const C2W: usize = 10;

/// Base stats with their per-hour rates, a break, then the ratios.
pub fn render(s: &RawStats, d: &DerivedView) -> String {
    let mut out = s!();
    rule(&mut out, ['┌', '─', '┬', '┐']);
    line(&mut out, "Statistic", "Value", "per hour");
    rule(&mut out, ['╞', '═', '╪', '╡']);

    let base = [
        ("Time played in hours", num(d.time_played_hours, 2), s!("1")),
        ("XP", int(s.xp), num(d.xp_per_hour, 2)),
        ("Kills", int(s.kills), num(d.kills_per_hour, 2)),
        ("Deaths", int(s.deaths), num(d.deaths_per_hour, 2)),
        ("Longest kill streak", int(s.longest_kill_streak), s!("-")),
        ("Targets destroyed", int(s.targets_destroyed), num(d.targets_destroyed_per_hour, 2)),
        ("Vehicles destroyed", int(s.vehicles_destroyed), num(d.vehicles_destroyed_per_hour, 2)),
        ("Soldiers healed", int(s.soldiers_healed), num(d.soldiers_healed_per_hour, 2)),
        ("Team kills", int(s.team_kills), num(d.team_kills_per_hour, 2)),
        ("Distance moved in km", num(d.distance_moved_km, 2), num(d.distance_moved_km_per_hour, 2)),
        ("Shots fired", int(s.shots_fired), num(d.shots_fired_per_hour, 2)),
        ("Throwables thrown", int(s.throwables_thrown), num(d.throwables_thrown_per_hour, 2)),
    ];
    for (label, value, per_hour) in &base {
        line(&mut out, label, value, per_hour);
    }

    rule(&mut out, ['├', '─', '┼', '┤']);

    // No per-hour meaning for these
    let ratios = [
        ("Score", num(d.score, 0)),
        ("K/D", num(d.kdr, 2)),
        ("XP per kill", num(d.xp_per_kill, 2)),
        ("XP per shot fired", num(d.xp_per_shot_fired, 2)),
        ("Shots per kill", num(d.shots_fired_per_kill, 2)),
        ("Team kills per kill", num(d.team_kills_per_kill, 5)),
        ("Kills per km moved", num(d.kills_per_km_moved, 2)),
        ("Runs around equator", num(d.runs_around_the_equator, 5)),
    ];
    for (label, value) in &ratios {
        line(&mut out, label, value, "-");
    }

    rule(&mut out, ['╘', '═', '╧', '╛']);
    out
}

fn line(out: &mut String, label: &str, value: &str, per_hour: &str) {
    let _ = writeln!(
        out,
        "│{label:>w0$}│{value:>w1$}│{per_hour:>w2$}│",
        w0 = C0W, w1 = C1W, w2 = C2W
    );
}

fn rule(out: &mut String, [l, fill, m, r]: [char; 4]) {
    let f = |w: usize| fill.to_string().repeat(w);
    let _ = writeln!(out, "{l}{}{m}{}{m}{}{r}", f(C0W), f(C1W), f(C2W));
}

/// Render one record with its derived view.
pub fn render_stats(s: &RawStats) -> String {
    render(s, &DerivedView::of(s))
}

/// Ranking table for `rwrtrack rank`.
pub fn render_ranking(metric: Metric, rows: &[Ranked]) -> String {
    let name_w = rows.iter().map(|r| r.stats.username.chars().count()).max().unwrap_or(0).max(8);
    let val_w = metric.name().len().max(C1W);
    let mut out = s!();
    let _ = writeln!(out, "{:>5}  {:<name_w$}  {:>val_w$}", "#", "Player", metric.name());
    for (i, r) in rows.iter().enumerate() {
        let v = r.value.map(|v| num(v, 2)).unwrap_or_else(|| s!("-"));
        let _ = writeln!(out, "{:>5}  {:<name_w$}  {:>val_w$}", i + 1, r.stats.username, v);
    }
    out
}

/* ---------------- Number formatting ---------------- */

fn int(v: u64) -> String {
    group(&v.to_string())
}

/// Fixed decimals with `,` thousands separators, e.g. `1,234.50`.
pub fn num(v: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, v.abs());
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text.as_str(), None),
    };
    let mut out = s!();
    // `-0.00` prints as `0.00`
    if v < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group(whole));
    if let Some(f) = frac {
        out.push('.');
        out.push_str(f);
    }
    out
}

fn group(digits: &str) -> String {
    let n = digits.len();
    let mut out = String::with_capacity(n + n / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

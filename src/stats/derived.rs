// src/stats/derived.rs
use std::fmt;
use std::str::FromStr;

use crate::config::consts::EARTH_EQUAT_CIRC_KM;

use super::raw::{Field, RawStats};

/// Arithmetic the derived formulas are written against.
///
/// Implemented once over concrete numbers ([`Scalar`]) and once over SQL
/// expressions ([`super::SqlEval`]). Every value an evaluator produces is
/// floating point; `field` must promote the integer counter before any
/// division sees it.
pub trait Evaluator {
    type Value;

    fn field(&self, field: Field) -> Self::Value;
    fn constant(&self, value: f64) -> Self::Value;
    fn sub(&self, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    /// Plain division; only used with a non-zero constant divisor.
    fn div(&self, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    /// Zero-guarded division: exactly 0 when `rhs` is 0.
    fn safe_div(&self, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
}

/// Eager evaluation over one loaded record.
pub struct Scalar<'a>(pub &'a RawStats);

impl Evaluator for Scalar<'_> {
    type Value = f64;

    fn field(&self, field: Field) -> f64 {
        self.0.get(field) as f64
    }

    fn constant(&self, value: f64) -> f64 {
        value
    }

    fn sub(&self, lhs: f64, rhs: f64) -> f64 {
        lhs - rhs
    }

    fn div(&self, lhs: f64, rhs: f64) -> f64 {
        lhs / rhs
    }

    fn safe_div(&self, lhs: f64, rhs: f64) -> f64 {
        if rhs == 0.0 { 0.0 } else { lhs / rhs }
    }
}

/// Every value the tool can rank, filter or print: the base counters and the
/// derived metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    Base(Field),
    TimePlayedHours,
    DistanceMovedKm,
    Score,
    Kdr,
    XpPerHour,
    KillsPerHour,
    DeathsPerHour,
    TargetsDestroyedPerHour,
    VehiclesDestroyedPerHour,
    SoldiersHealedPerHour,
    TeamKillsPerHour,
    ShotsFiredPerHour,
    ThrowablesThrownPerHour,
    DistanceMovedKmPerHour,
    KillsPerKmMoved,
    XpPerShotFired,
    XpPerKill,
    ShotsFiredPerKill,
    TeamKillsPerKill,
    RunsAroundTheEquator,
}

impl Metric {
    pub const DERIVED: [Metric; 20] = [
        Metric::TimePlayedHours,
        Metric::DistanceMovedKm,
        Metric::Score,
        Metric::Kdr,
        Metric::XpPerHour,
        Metric::KillsPerHour,
        Metric::DeathsPerHour,
        Metric::TargetsDestroyedPerHour,
        Metric::VehiclesDestroyedPerHour,
        Metric::SoldiersHealedPerHour,
        Metric::TeamKillsPerHour,
        Metric::ShotsFiredPerHour,
        Metric::ThrowablesThrownPerHour,
        Metric::DistanceMovedKmPerHour,
        Metric::KillsPerKmMoved,
        Metric::XpPerShotFired,
        Metric::XpPerKill,
        Metric::ShotsFiredPerKill,
        Metric::TeamKillsPerKill,
        Metric::RunsAroundTheEquator,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Base(f) => f.as_str(),
            Metric::TimePlayedHours => "time_played_hours",
            Metric::DistanceMovedKm => "distance_moved_km",
            Metric::Score => "score",
            Metric::Kdr => "kdr",
            Metric::XpPerHour => "xp_per_hour",
            Metric::KillsPerHour => "kills_per_hour",
            Metric::DeathsPerHour => "deaths_per_hour",
            Metric::TargetsDestroyedPerHour => "targets_destroyed_per_hour",
            Metric::VehiclesDestroyedPerHour => "vehicles_destroyed_per_hour",
            Metric::SoldiersHealedPerHour => "soldiers_healed_per_hour",
            Metric::TeamKillsPerHour => "team_kills_per_hour",
            Metric::ShotsFiredPerHour => "shots_fired_per_hour",
            Metric::ThrowablesThrownPerHour => "throwables_thrown_per_hour",
            Metric::DistanceMovedKmPerHour => "distance_moved_km_per_hour",
            Metric::KillsPerKmMoved => "kills_per_km_moved",
            Metric::XpPerShotFired => "xp_per_shot_fired",
            Metric::XpPerKill => "xp_per_kill",
            Metric::ShotsFiredPerKill => "shots_fired_per_kill",
            Metric::TeamKillsPerKill => "team_kills_per_kill",
            Metric::RunsAroundTheEquator => "runs_around_the_equator",
        }
    }

    /// The formula, written once for every evaluator.
    pub fn eval<E: Evaluator>(self, e: &E) -> E::Value {
        use Field::*;

        let hours = |e: &E| e.div(e.field(TimePlayed), e.constant(60.0));
        let km = |e: &E| e.div(e.field(DistanceMoved), e.constant(1000.0));
        let per_hour = |e: &E, f: Field| e.safe_div(e.field(f), hours(e));
        let ratio = |e: &E, num: Field, den: Field| e.safe_div(e.field(num), e.field(den));

        match self {
            Metric::Base(f) => e.field(f),
            Metric::TimePlayedHours => hours(e),
            Metric::DistanceMovedKm => km(e),
            Metric::Score => e.sub(e.field(Kills), e.field(Deaths)),
            Metric::Kdr => ratio(e, Kills, Deaths),
            Metric::XpPerHour => per_hour(e, Xp),
            Metric::KillsPerHour => per_hour(e, Kills),
            Metric::DeathsPerHour => per_hour(e, Deaths),
            Metric::TargetsDestroyedPerHour => per_hour(e, TargetsDestroyed),
            Metric::VehiclesDestroyedPerHour => per_hour(e, VehiclesDestroyed),
            Metric::SoldiersHealedPerHour => per_hour(e, SoldiersHealed),
            Metric::TeamKillsPerHour => per_hour(e, TeamKills),
            Metric::ShotsFiredPerHour => per_hour(e, ShotsFired),
            Metric::ThrowablesThrownPerHour => per_hour(e, ThrowablesThrown),
            Metric::DistanceMovedKmPerHour => e.safe_div(km(e), hours(e)),
            Metric::KillsPerKmMoved => e.safe_div(e.field(Kills), km(e)),
            Metric::XpPerShotFired => ratio(e, Xp, ShotsFired),
            Metric::XpPerKill => ratio(e, Xp, Kills),
            Metric::ShotsFiredPerKill => ratio(e, ShotsFired, Kills),
            Metric::TeamKillsPerKill => ratio(e, TeamKills, Kills),
            Metric::RunsAroundTheEquator => e.div(km(e), e.constant(EARTH_EQUAT_CIRC_KM)),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(f) = Field::parse(&s) {
            return Ok(Metric::Base(f));
        }
        Metric::DERIVED
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("Unknown metric: {s}"))
    }
}

/// Derived metric for one loaded record.
pub fn derive(metric: Metric, stats: &RawStats) -> f64 {
    metric.eval(&Scalar(stats))
}

/// Every derived metric of one record, computed once for display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedView {
    pub time_played_hours: f64,
    pub distance_moved_km: f64,
    pub score: f64,
    pub kdr: f64,
    pub xp_per_hour: f64,
    pub kills_per_hour: f64,
    pub deaths_per_hour: f64,
    pub targets_destroyed_per_hour: f64,
    pub vehicles_destroyed_per_hour: f64,
    pub soldiers_healed_per_hour: f64,
    pub team_kills_per_hour: f64,
    pub shots_fired_per_hour: f64,
    pub throwables_thrown_per_hour: f64,
    pub distance_moved_km_per_hour: f64,
    pub kills_per_km_moved: f64,
    pub xp_per_shot_fired: f64,
    pub xp_per_kill: f64,
    pub shots_fired_per_kill: f64,
    pub team_kills_per_kill: f64,
    pub runs_around_the_equator: f64,
}

impl DerivedView {
    pub fn of(stats: &RawStats) -> Self {
        let d = |m| derive(m, stats);
        Self {
            time_played_hours: d(Metric::TimePlayedHours),
            distance_moved_km: d(Metric::DistanceMovedKm),
            score: d(Metric::Score),
            kdr: d(Metric::Kdr),
            xp_per_hour: d(Metric::XpPerHour),
            kills_per_hour: d(Metric::KillsPerHour),
            deaths_per_hour: d(Metric::DeathsPerHour),
            targets_destroyed_per_hour: d(Metric::TargetsDestroyedPerHour),
            vehicles_destroyed_per_hour: d(Metric::VehiclesDestroyedPerHour),
            soldiers_healed_per_hour: d(Metric::SoldiersHealedPerHour),
            team_kills_per_hour: d(Metric::TeamKillsPerHour),
            shots_fired_per_hour: d(Metric::ShotsFiredPerHour),
            throwables_thrown_per_hour: d(Metric::ThrowablesThrownPerHour),
            distance_moved_km_per_hour: d(Metric::DistanceMovedKmPerHour),
            kills_per_km_moved: d(Metric::KillsPerKmMoved),
            xp_per_shot_fired: d(Metric::XpPerShotFired),
            xp_per_kill: d(Metric::XpPerKill),
            shots_fired_per_kill: d(Metric::ShotsFiredPerKill),
            team_kills_per_kill: d(Metric::TeamKillsPerKill),
            runs_around_the_equator: d(Metric::RunsAroundTheEquator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn player() -> RawStats {
        RawStats {
            username: s!("ALICE"),
            xp: 10_000,
            time_played: 150,
            kills: 150,
            deaths: 50,
            longest_kill_streak: 10,
            targets_destroyed: 20,
            vehicles_destroyed: 5,
            soldiers_healed: 30,
            team_kills: 3,
            distance_moved: 1_500,
            shots_fired: 500,
            throwables_thrown: 40,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn hand_computed_values() {
        let v = DerivedView::of(&player());
        assert!(close(v.time_played_hours, 2.5));
        assert!(close(v.distance_moved_km, 1.5));
        assert!(close(v.score, 100.0));
        assert!(close(v.kdr, 3.0));
        assert!(close(v.xp_per_hour, 4_000.0));
        assert!(close(v.kills_per_hour, 60.0));
        assert!(close(v.deaths_per_hour, 20.0));
        assert!(close(v.distance_moved_km_per_hour, 0.6));
        assert!(close(v.kills_per_km_moved, 100.0));
        assert!(close(v.xp_per_shot_fired, 20.0));
        assert!(close(v.xp_per_kill, 10_000.0 / 150.0));
        assert!(close(v.shots_fired_per_kill, 500.0 / 150.0));
        assert!(close(v.team_kills_per_kill, 0.02));
        assert!(close(v.runs_around_the_equator, 1.5 / 40_075.0));
    }

    #[test]
    fn score_goes_negative() {
        let s = RawStats { kills: 2, deaths: 7, ..player() };
        assert_eq!(derive(Metric::Score, &s), -5.0);
    }

    #[test]
    fn zero_deaths_gives_zero_kdr() {
        let s = RawStats { deaths: 0, ..player() };
        assert_eq!(derive(Metric::Kdr, &s), 0.0);
    }

    #[rstest]
    #[case(Metric::XpPerKill)]
    #[case(Metric::ShotsFiredPerKill)]
    #[case(Metric::TeamKillsPerKill)]
    fn zero_kills_gives_zero_per_kill(#[case] metric: Metric) {
        let s = RawStats { kills: 0, ..player() };
        assert_eq!(derive(metric, &s), 0.0);
    }

    #[test]
    fn zero_time_gives_zero_per_hour() {
        let s = RawStats { time_played: 0, ..player() };
        for m in Metric::DERIVED.into_iter().filter(|m| m.name().ends_with("_per_hour")) {
            assert_eq!(derive(m, &s), 0.0, "{m}");
        }
    }

    #[test]
    fn zero_distance_and_shots() {
        let s = RawStats { distance_moved: 0, shots_fired: 0, ..player() };
        assert_eq!(derive(Metric::KillsPerKmMoved, &s), 0.0);
        assert_eq!(derive(Metric::XpPerShotFired, &s), 0.0);
        assert_eq!(derive(Metric::RunsAroundTheEquator, &s), 0.0);
    }

    #[test]
    fn all_zero_record_is_finite() {
        let s = RawStats::default();
        for m in Metric::DERIVED {
            let v = derive(m, &s);
            assert!(v.is_finite(), "{m} = {v}");
            assert_eq!(v, 0.0, "{m}");
        }
    }

    #[rstest]
    #[case("kdr", Metric::Kdr)]
    #[case("XP_PER_HOUR", Metric::XpPerHour)]
    #[case("kills", Metric::Base(Field::Kills))]
    #[case(" runs_around_the_equator ", Metric::RunsAroundTheEquator)]
    fn metric_names_parse(#[case] text: &str, #[case] expected: Metric) {
        assert_eq!(text.parse::<Metric>().unwrap(), expected);
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert!("kills_per_fortnight".parse::<Metric>().is_err());
    }
}

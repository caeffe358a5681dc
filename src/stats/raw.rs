// src/stats/raw.rs
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// One player's cumulative counters as scraped at one point in time.
///
/// Field order matches the historical file header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStats {
    pub username: String,
    pub xp: u64,
    /// Minutes.
    pub time_played: u64,
    pub kills: u64,
    pub deaths: u64,
    pub longest_kill_streak: u64,
    pub targets_destroyed: u64,
    pub vehicles_destroyed: u64,
    pub soldiers_healed: u64,
    pub team_kills: u64,
    /// Metres.
    pub distance_moved: u64,
    pub shots_fired: u64,
    pub throwables_thrown: u64,
}

/// Historical file header: identity, then the counters in [`Field::ALL`] order.
pub const HEADER: [&str; 13] = [
    "username",
    "xp",
    "time_played",
    "kills",
    "deaths",
    "longest_kill_streak",
    "targets_destroyed",
    "vehicles_destroyed",
    "soldiers_healed",
    "team_kills",
    "distance_moved",
    "shots_fired",
    "throwables_thrown",
];

/// The twelve base counters, in storage column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Xp,
    TimePlayed,
    Kills,
    Deaths,
    LongestKillStreak,
    TargetsDestroyed,
    VehiclesDestroyed,
    SoldiersHealed,
    TeamKills,
    DistanceMoved,
    ShotsFired,
    ThrowablesThrown,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Xp,
        Field::TimePlayed,
        Field::Kills,
        Field::Deaths,
        Field::LongestKillStreak,
        Field::TargetsDestroyed,
        Field::VehiclesDestroyed,
        Field::SoldiersHealed,
        Field::TeamKills,
        Field::DistanceMoved,
        Field::ShotsFired,
        Field::ThrowablesThrown,
    ];

    /// Snake-case name; doubles as the column name in files and the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Xp => "xp",
            Field::TimePlayed => "time_played",
            Field::Kills => "kills",
            Field::Deaths => "deaths",
            Field::LongestKillStreak => "longest_kill_streak",
            Field::TargetsDestroyed => "targets_destroyed",
            Field::VehiclesDestroyed => "vehicles_destroyed",
            Field::SoldiersHealed => "soldiers_healed",
            Field::TeamKills => "team_kills",
            Field::DistanceMoved => "distance_moved",
            Field::ShotsFired => "shots_fired",
            Field::ThrowablesThrown => "throwables_thrown",
        }
    }

    pub fn parse(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RawStats {
    pub fn get(&self, field: Field) -> u64 {
        match field {
            Field::Xp => self.xp,
            Field::TimePlayed => self.time_played,
            Field::Kills => self.kills,
            Field::Deaths => self.deaths,
            Field::LongestKillStreak => self.longest_kill_streak,
            Field::TargetsDestroyed => self.targets_destroyed,
            Field::VehiclesDestroyed => self.vehicles_destroyed,
            Field::SoldiersHealed => self.soldiers_healed,
            Field::TeamKills => self.team_kills,
            Field::DistanceMoved => self.distance_moved,
            Field::ShotsFired => self.shots_fired,
            Field::ThrowablesThrown => self.throwables_thrown,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut u64 {
        match field {
            Field::Xp => &mut self.xp,
            Field::TimePlayed => &mut self.time_played,
            Field::Kills => &mut self.kills,
            Field::Deaths => &mut self.deaths,
            Field::LongestKillStreak => &mut self.longest_kill_streak,
            Field::TargetsDestroyed => &mut self.targets_destroyed,
            Field::VehiclesDestroyed => &mut self.vehicles_destroyed,
            Field::SoldiersHealed => &mut self.soldiers_healed,
            Field::TeamKills => &mut self.team_kills,
            Field::DistanceMoved => &mut self.distance_moved,
            Field::ShotsFired => &mut self.shots_fired,
            Field::ThrowablesThrown => &mut self.throwables_thrown,
        }
    }

    /// Counter-wise difference `self - older`, keeping `self`'s username.
    ///
    /// Counters saturate at zero; a reset leaderboard shows no progress rather
    /// than wrapping.
    pub fn delta(&self, older: &RawStats) -> RawStats {
        let mut out = RawStats { username: self.username.clone(), ..RawStats::default() };
        for f in Field::ALL {
            *out.get_mut(f) = self.get(f).saturating_sub(older.get(f));
        }
        out
    }

    /// Counters that went down since `older`. Cumulative counters should never
    /// decrease, so anything here is a reset or a data anomaly.
    pub fn decreased_fields(&self, older: &RawStats) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&f| self.get(f) < older.get(f))
            .collect()
    }

    /// Counter-wise totals over many players. The username is left empty.
    pub fn totals<'a, I: IntoIterator<Item = &'a RawStats>>(iter: I) -> RawStats {
        iter.into_iter().fold(RawStats::default(), |acc, s| &acc + s)
    }
}

impl Add<&RawStats> for &RawStats {
    type Output = RawStats;

    fn add(self, rhs: &RawStats) -> RawStats {
        let mut out = RawStats { username: self.username.clone(), ..RawStats::default() };
        for f in Field::ALL {
            *out.get_mut(f) = self.get(f).saturating_add(rhs.get(f));
        }
        out
    }
}

impl<'a> Sum<&'a RawStats> for RawStats {
    fn sum<I: Iterator<Item = &'a RawStats>>(iter: I) -> RawStats {
        RawStats::totals(iter)
    }
}

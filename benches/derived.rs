// benches/derived.rs
use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};

use rwrtrack::stats::{derive, Metric, RawStats};
use rwrtrack::store::{Order, ScanQuery, SnapshotStore};

const PLAYERS: u64 = 2_000;

/// Deterministic synthetic leaderboard, some players with zero deaths.
fn leaderboard() -> Vec<RawStats> {
    (0..PLAYERS)
        .map(|i| RawStats {
            username: format!("PLAYER{i:05}"),
            xp: 1_000 + i * 137,
            time_played: 30 + i * 7,
            kills: i * 3 % 997,
            deaths: i % 11,
            longest_kill_streak: i % 40,
            targets_destroyed: i % 23,
            vehicles_destroyed: i % 9,
            soldiers_healed: i % 51,
            team_kills: i % 5,
            distance_moved: 500 + i * 41,
            shots_fired: i * 19,
            throwables_thrown: i % 31,
        })
        .collect()
}

fn bench_rank_by_kdr(c: &mut Criterion) {
    let stats = leaderboard();
    let day = NaiveDate::from_ymd_opt(2018, 5, 17).expect("valid date");
    let mut store = SnapshotStore::open_in_memory().expect("in-memory store");
    store
        .writer()
        .expect("write mode")
        .insert_snapshots(&stats, day)
        .expect("insert leaderboard");

    c.bench_function("kdr_top50_scalar", |b| {
        b.iter(|| {
            let mut ranked: Vec<(f64, &RawStats)> =
                black_box(&stats).iter().map(|s| (derive(Metric::Kdr, s), s)).collect();
            ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
            ranked.truncate(50);
            black_box(ranked.len())
        })
    });

    let query = ScanQuery::on(day).order_by(Metric::Kdr, Order::Desc).limit(50);
    c.bench_function("kdr_top50_sqlite", |b| {
        b.iter(|| {
            let rows = store.scan_all(black_box(&query)).expect("scan");
            black_box(rows.len())
        })
    });

    c.bench_function("derive_all_metrics", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for s in &stats {
                for m in Metric::DERIVED {
                    acc += derive(m, black_box(s));
                }
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, bench_rank_by_kdr);
criterion_main!(benches);

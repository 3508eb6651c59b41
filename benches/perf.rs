use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use heatcheck_terminal::directory::{find_player, normalize_name, parse_player_directory_json};
use heatcheck_terminal::gamelog::{parse_game_log_json, tail_recent};
use heatcheck_terminal::trend::{classify, GameRecord, StatKind, TrendConfig, TrendMethod};

fn synthetic_season(len: usize) -> Vec<GameRecord> {
    (0..len)
        .map(|i| {
            let day = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap()
                + chrono::Duration::days(2 * i as i64);
            GameRecord {
                date: day,
                points: 18.0 + (i % 7) as f64,
                rebounds: 7.0 + (i % 4) as f64,
                assists: 5.0 + (i % 5) as f64,
                fg_pct: 0.45 + (i % 10) as f64 / 100.0,
            }
        })
        .collect()
}

fn bench_gamelog_parse(c: &mut Criterion) {
    c.bench_function("gamelog_parse", |b| {
        b.iter(|| {
            let games = parse_game_log_json(black_box(GAMELOG_JSON)).unwrap();
            black_box(games.len());
        })
    });
}

fn bench_directory_parse(c: &mut Criterion) {
    c.bench_function("directory_parse", |b| {
        b.iter(|| {
            let players = parse_player_directory_json(black_box(DIRECTORY_JSON)).unwrap();
            black_box(players.len());
        })
    });
}

fn bench_directory_lookup(c: &mut Criterion) {
    let players = parse_player_directory_json(DIRECTORY_JSON).unwrap();
    c.bench_function("directory_lookup", |b| {
        b.iter(|| black_box(find_player(black_box(&players), "nikola jokic")))
    });
}

fn bench_normalize_name(c: &mut Criterion) {
    c.bench_function("normalize_name", |b| {
        b.iter(|| black_box(normalize_name(black_box("  Luka   Dončić Jr. "))))
    });
}

fn bench_classify_full_season(c: &mut Criterion) {
    let season = synthetic_season(82);
    let config = TrendConfig {
        recent_games: 5,
        stats: StatKind::ALL.to_vec(),
        method: TrendMethod::StdDev,
    };
    c.bench_function("classify_full_season", |b| {
        b.iter(|| {
            let report = classify(black_box(&season), black_box(&config)).unwrap();
            black_box(report.stats.len());
        })
    });
}

fn bench_tail_recent(c: &mut Criterion) {
    let season = synthetic_season(82);
    c.bench_function("tail_recent", |b| {
        b.iter(|| {
            let window = tail_recent(black_box(season.clone()), 20);
            black_box(window.len());
        })
    });
}

criterion_group!(
    perf,
    bench_gamelog_parse,
    bench_directory_parse,
    bench_directory_lookup,
    bench_normalize_name,
    bench_classify_full_season,
    bench_tail_recent
);
criterion_main!(perf);

static GAMELOG_JSON: &str = include_str!("../tests/fixtures/playergamelog.json");
static DIRECTORY_JSON: &str = include_str!("../tests/fixtures/commonallplayers.json");

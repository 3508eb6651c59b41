use chrono::NaiveDate;

use heatcheck_terminal::trend::{
    classify, GameRecord, StatKind, TrendConfig, TrendError, TrendLabel, TrendMethod,
};

fn series(points: &[f64]) -> Vec<GameRecord> {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| GameRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, i as u32 + 1).unwrap(),
            points: p,
            rebounds: 8.0,
            assists: 6.0,
            fg_pct: 0.5,
        })
        .collect()
}

fn config(recent: usize, method: TrendMethod) -> TrendConfig {
    TrendConfig {
        recent_games: recent,
        stats: vec![StatKind::Points],
        method,
    }
}

fn points_label(points: &[f64], recent: usize, method: TrendMethod) -> TrendLabel {
    classify(&series(points), &config(recent, method)).unwrap().stats[0].label
}

#[test]
fn short_series_reports_insufficient_data() {
    let err = classify(&series(&[10.0, 12.0, 14.0]), &config(3, TrendMethod::Percent)).unwrap_err();
    assert_eq!(
        err,
        TrendError::InsufficientData {
            games: 3,
            required: 4
        }
    );
}

#[test]
fn report_covers_every_configured_stat_once_in_order() {
    let cfg = TrendConfig {
        recent_games: 2,
        stats: vec![StatKind::FgPct, StatKind::Points, StatKind::Assists],
        method: TrendMethod::Percent,
    };
    let report = classify(&series(&[10.0, 11.0, 12.0, 13.0, 14.0]), &cfg).unwrap();
    let order: Vec<StatKind> = report.stats.iter().map(|s| s.stat).collect();
    assert_eq!(order, vec![StatKind::FgPct, StatKind::Points, StatKind::Assists]);
}

#[test]
fn flat_baseline_jump_heats_under_percent() {
    // Baseline mean 10, recent mean 15: +50%, far past the 5% threshold.
    let label = points_label(&[10.0, 10.0, 10.0, 15.0, 15.0, 15.0], 3, TrendMethod::Percent);
    assert_eq!(label, TrendLabel::Heating);
}

#[test]
fn identical_windows_are_stable_under_both_methods() {
    let points = [10.0, 12.0, 8.0, 10.0, 12.0, 8.0];
    assert_eq!(points_label(&points, 3, TrendMethod::Percent), TrendLabel::Stable);
    assert_eq!(points_label(&points, 3, TrendMethod::StdDev), TrendLabel::Stable);
}

#[test]
fn percent_threshold_is_exclusive_end_to_end() {
    // Baseline mean 20; recent 21 is exactly +5%.
    assert_eq!(
        points_label(&[20.0, 20.0, 20.0, 21.0], 1, TrendMethod::Percent),
        TrendLabel::Stable
    );
    assert_eq!(
        points_label(&[20.0, 20.0, 20.0, 21.1], 1, TrendMethod::Percent),
        TrendLabel::Heating
    );
    assert_eq!(
        points_label(&[20.0, 20.0, 20.0, 18.9], 1, TrendMethod::Percent),
        TrendLabel::Cooling
    );
}

#[test]
fn stddev_separates_on_sample_deviation() {
    // Baseline [10, 12, 8]: mean 10, sample stddev 2. Recent mean 13 is
    // +3, beyond one stddev.
    assert_eq!(
        points_label(&[10.0, 12.0, 8.0, 13.0], 1, TrendMethod::StdDev),
        TrendLabel::Heating
    );
    // Recent mean 12 is exactly +1 stddev: boundary stays Stable.
    assert_eq!(
        points_label(&[10.0, 12.0, 8.0, 12.0], 1, TrendMethod::StdDev),
        TrendLabel::Stable
    );
    assert_eq!(
        points_label(&[10.0, 12.0, 8.0, 7.0], 1, TrendMethod::StdDev),
        TrendLabel::Cooling
    );
}

#[test]
fn scoreless_baseline_is_undetermined_under_percent() {
    assert_eq!(
        points_label(&[0.0, 0.0, 0.0, 9.0], 1, TrendMethod::Percent),
        TrendLabel::Undetermined
    );
}

#[test]
fn single_game_baseline_is_undetermined_under_stddev() {
    // One baseline game has no sample stddev to compare against.
    assert_eq!(
        points_label(&[10.0, 14.0, 14.0], 2, TrendMethod::StdDev),
        TrendLabel::Undetermined
    );
}

#[test]
fn constant_baseline_is_undetermined_under_stddev() {
    assert_eq!(
        points_label(&[10.0, 10.0, 10.0, 25.0], 1, TrendMethod::StdDev),
        TrendLabel::Undetermined
    );
}

#[test]
fn report_carries_window_means() {
    let report = classify(
        &series(&[10.0, 10.0, 10.0, 15.0, 15.0, 15.0]),
        &config(3, TrendMethod::Percent),
    )
    .unwrap();
    let points = &report.stats[0];
    assert!((points.baseline_mean - 10.0).abs() < 1e-12);
    assert!((points.recent_mean - 15.0).abs() < 1e-12);
}

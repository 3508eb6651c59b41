use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative change a statistic must exceed to count as a trend under
/// [`TrendMethod::Percent`].
pub const PERCENT_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Points,
    Rebounds,
    Assists,
    FgPct,
}

impl StatKind {
    pub const ALL: [StatKind; 4] = [
        StatKind::Points,
        StatKind::Rebounds,
        StatKind::Assists,
        StatKind::FgPct,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Points => "PTS",
            StatKind::Rebounds => "REB",
            StatKind::Assists => "AST",
            StatKind::FgPct => "FG%",
        }
    }
}

/// One played game for one player. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub date: NaiveDate,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub fg_pct: f64,
}

impl GameRecord {
    pub fn value(&self, stat: StatKind) -> f64 {
        match stat {
            StatKind::Points => self.points,
            StatKind::Rebounds => self.rebounds,
            StatKind::Assists => self.assists,
            StatKind::FgPct => self.fg_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendMethod {
    /// Fixed relative threshold against the baseline mean.
    Percent,
    /// One sample standard deviation of the baseline window.
    StdDev,
}

#[derive(Debug, Clone)]
pub struct TrendConfig {
    /// Number of most recent games forming the recent window. Must be >= 1
    /// and strictly less than the series length.
    pub recent_games: usize,
    pub stats: Vec<StatKind>,
    pub method: TrendMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendLabel {
    Heating,
    Cooling,
    Stable,
    /// Baseline too degenerate to support a call (zero mean under the percent
    /// method, zero or undefined stddev under the stddev method).
    Undetermined,
}

impl TrendLabel {
    pub fn label(self) -> &'static str {
        match self {
            TrendLabel::Heating => "Heating Up",
            TrendLabel::Cooling => "Cooling Down",
            TrendLabel::Stable => "Stable",
            TrendLabel::Undetermined => "Undetermined",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatTrend {
    pub stat: StatKind,
    pub label: TrendLabel,
    pub baseline_mean: f64,
    pub recent_mean: f64,
}

/// One entry per configured stat, in configured order.
#[derive(Debug, Clone, Default)]
pub struct TrendReport {
    pub stats: Vec<StatTrend>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrendError {
    #[error("only {games} games available, need at least {required} to split a baseline")]
    InsufficientData { games: usize, required: usize },
}

/// Classify each configured stat of a chronological game series as heating,
/// cooling, stable, or undetermined.
///
/// The series is split positionally: the last `recent_games` entries form the
/// recent window and everything earlier is the baseline. Splitting by position
/// rather than by date keeps the windows meaningful across irregular
/// schedules (off-days, injuries).
///
/// The caller guarantees the series is ordered oldest-to-newest with unique
/// dates and that at least one stat is configured; violations are programming
/// errors, not recoverable conditions.
pub fn classify(series: &[GameRecord], config: &TrendConfig) -> Result<TrendReport, TrendError> {
    debug_assert!(!config.stats.is_empty(), "no stats configured");
    debug_assert!(config.recent_games >= 1, "recent window must be at least 1");
    debug_assert!(
        series.windows(2).all(|w| w[0].date < w[1].date),
        "series must be chronological with unique dates"
    );

    let recent_games = config.recent_games;
    if recent_games == 0 || series.len() < recent_games + 1 {
        return Err(TrendError::InsufficientData {
            games: series.len(),
            required: recent_games + 1,
        });
    }

    let (baseline, recent) = series.split_at(series.len() - recent_games);

    let stats = config
        .stats
        .iter()
        .map(|&stat| {
            let baseline_mean = mean(baseline, stat);
            let recent_mean = mean(recent, stat);
            let label = match config.method {
                TrendMethod::Percent => classify_percent(baseline_mean, recent_mean),
                TrendMethod::StdDev => {
                    classify_stddev(baseline_mean, recent_mean, sample_stddev(baseline, stat))
                }
            };
            StatTrend {
                stat,
                label,
                baseline_mean,
                recent_mean,
            }
        })
        .collect();

    Ok(TrendReport { stats })
}

fn classify_percent(baseline_mean: f64, recent_mean: f64) -> TrendLabel {
    if baseline_mean == 0.0 {
        return TrendLabel::Undetermined;
    }
    let diff = (recent_mean - baseline_mean) / baseline_mean;
    if diff > PERCENT_THRESHOLD {
        TrendLabel::Heating
    } else if diff < -PERCENT_THRESHOLD {
        TrendLabel::Cooling
    } else {
        TrendLabel::Stable
    }
}

fn classify_stddev(baseline_mean: f64, recent_mean: f64, stddev: Option<f64>) -> TrendLabel {
    let Some(stddev) = stddev else {
        return TrendLabel::Undetermined;
    };
    if stddev == 0.0 {
        return TrendLabel::Undetermined;
    }
    let diff = recent_mean - baseline_mean;
    if diff > stddev {
        TrendLabel::Heating
    } else if diff < -stddev {
        TrendLabel::Cooling
    } else {
        TrendLabel::Stable
    }
}

fn mean(games: &[GameRecord], stat: StatKind) -> f64 {
    let sum: f64 = games.iter().map(|g| g.value(stat)).sum();
    sum / games.len() as f64
}

/// Sample standard deviation (n-1 denominator). `None` for fewer than two games.
fn sample_stddev(games: &[GameRecord], stat: StatKind) -> Option<f64> {
    if games.len() < 2 {
        return None;
    }
    let m = mean(games, stat);
    let ss: f64 = games.iter().map(|g| (g.value(stat) - m).powi(2)).sum();
    Some((ss / (games.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(day: u32, points: f64) -> GameRecord {
        GameRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            points,
            rebounds: 5.0,
            assists: 5.0,
            fg_pct: 0.5,
        }
    }

    #[test]
    fn sample_stddev_uses_n_minus_one() {
        let games: Vec<_> = [10.0, 12.0, 8.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| game(i as u32 + 1, p))
            .collect();
        let sd = sample_stddev(&games, StatKind::Points).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sample_stddev_undefined_for_single_game() {
        assert!(sample_stddev(&[game(1, 10.0)], StatKind::Points).is_none());
    }

    #[test]
    fn percent_boundary_is_exclusive() {
        // diff of exactly +5% must stay Stable.
        assert_eq!(classify_percent(100.0, 105.0), TrendLabel::Stable);
        assert_eq!(classify_percent(100.0, 105.01), TrendLabel::Heating);
        assert_eq!(classify_percent(100.0, 94.99), TrendLabel::Cooling);
    }

    #[test]
    fn stddev_boundary_is_exclusive() {
        assert_eq!(classify_stddev(10.0, 12.0, Some(2.0)), TrendLabel::Stable);
        assert_eq!(classify_stddev(10.0, 12.01, Some(2.0)), TrendLabel::Heating);
    }

    #[test]
    fn zero_baseline_mean_is_undetermined() {
        assert_eq!(classify_percent(0.0, 3.0), TrendLabel::Undetermined);
    }

    #[test]
    fn zero_stddev_is_undetermined() {
        assert_eq!(
            classify_stddev(10.0, 15.0, Some(0.0)),
            TrendLabel::Undetermined
        );
    }
}

use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use serde_json::Value;

use crate::http_cache::fetch_json_cached;
use crate::http_client::{http_client, stats_headers};
use crate::trend::GameRecord;

const GAMELOG_URL: &str = "https://stats.nba.com/stats/playergamelog";
const DEFAULT_THROTTLE_MS: u64 = 500;

static LAST_REQUEST: Mutex<Option<Instant>> = Mutex::new(None);

/// Fetch the newest `num_games` played games for a player, regular season and
/// playoffs merged, returned oldest-to-newest with unique dates.
pub fn fetch_recent_games(player_id: u32, num_games: usize) -> Result<Vec<GameRecord>> {
    let season = current_season();
    let mut games = fetch_season_type(player_id, &season, "Regular%20Season")?;
    games.extend(fetch_season_type(player_id, &season, "Playoffs")?);
    Ok(tail_recent(games, num_games))
}

fn fetch_season_type(player_id: u32, season: &str, season_type: &str) -> Result<Vec<GameRecord>> {
    throttle();
    let client = http_client()?;
    let url = format!(
        "{GAMELOG_URL}?PlayerID={player_id}&Season={season}&SeasonType={season_type}"
    );
    let body = fetch_json_cached(client, &url, &stats_headers()).context("game log request")?;
    parse_game_log_json(&body)
}

/// Parse the `playergamelog` resultSets envelope. Tolerates `null`/empty
/// bodies and rows with unparseable cells (skipped).
pub fn parse_game_log_json(raw: &str) -> Result<Vec<GameRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let root: Value = serde_json::from_str(trimmed).context("invalid playergamelog json")?;
    let Some(set) = root
        .get("resultSets")
        .and_then(Value::as_array)
        .and_then(|sets| sets.first())
    else {
        return Ok(Vec::new());
    };

    let date_col = header_index(set, "GAME_DATE").context("GAME_DATE column missing")?;
    let pts_col = header_index(set, "PTS").context("PTS column missing")?;
    let reb_col = header_index(set, "REB").context("REB column missing")?;
    let ast_col = header_index(set, "AST").context("AST column missing")?;
    let fg_col = header_index(set, "FG_PCT").context("FG_PCT column missing")?;

    let mut games = Vec::new();
    let Some(rows) = set.get("rowSet").and_then(Value::as_array) else {
        return Ok(games);
    };
    for row in rows {
        let Some(cells) = row.as_array() else { continue };
        let Some(date) = cells
            .get(date_col)
            .and_then(Value::as_str)
            .and_then(parse_game_date)
        else {
            continue;
        };
        let Some(points) = cell_f64(cells.get(pts_col)) else {
            continue;
        };
        let Some(rebounds) = cell_f64(cells.get(reb_col)) else {
            continue;
        };
        let Some(assists) = cell_f64(cells.get(ast_col)) else {
            continue;
        };
        // FG_PCT is null for games with zero attempts; treat those as 0.0
        // rather than dropping the whole game row.
        let fg_pct = cell_f64(cells.get(fg_col)).unwrap_or(0.0);

        games.push(GameRecord {
            date,
            points,
            rebounds,
            assists,
            fg_pct,
        });
    }
    Ok(games)
}

/// Sort chronologically, drop duplicate dates, keep the newest `num_games`.
pub fn tail_recent(mut games: Vec<GameRecord>, num_games: usize) -> Vec<GameRecord> {
    games.sort_by_key(|g| g.date);
    games.dedup_by_key(|g| g.date);
    if games.len() > num_games {
        games.drain(..games.len() - num_games);
    }
    games
}

/// Season label for `stats.nba.com`, e.g. `2024-25`. Seasons roll over in
/// October, so before then the prior year's season is still the current one.
pub fn current_season() -> String {
    season_for(Local::now().date_naive())
}

pub fn season_for(today: NaiveDate) -> String {
    let start_year = if today.month() < 10 {
        today.year() - 1
    } else {
        today.year()
    };
    format!("{start_year}-{:02}", (start_year + 1) % 100)
}

fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    // The endpoint formats dates like "APR 11, 2025".
    NaiveDate::parse_from_str(raw.trim(), "%b %d, %Y").ok()
}

fn cell_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn header_index(set: &Value, name: &str) -> Option<usize> {
    set.get("headers")?
        .as_array()?
        .iter()
        .position(|h| h.as_str().is_some_and(|s| s.eq_ignore_ascii_case(name)))
}

/// Space out stats.nba.com calls; the endpoint rate-limits aggressively.
fn throttle() {
    let pause = Duration::from_millis(
        std::env::var("STATS_THROTTLE_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_THROTTLE_MS),
    );
    let mut guard = LAST_REQUEST.lock().expect("throttle lock poisoned");
    if let Some(last) = *guard {
        let elapsed = last.elapsed();
        if elapsed < pause {
            std::thread::sleep(pause - elapsed);
        }
    }
    *guard = Some(Instant::now());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(date: NaiveDate, points: f64) -> GameRecord {
        GameRecord {
            date,
            points,
            rebounds: 0.0,
            assists: 0.0,
            fg_pct: 0.0,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn season_rolls_over_in_october() {
        assert_eq!(season_for(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()), "2024-25");
        assert_eq!(season_for(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()), "2025-26");
        assert_eq!(season_for(NaiveDate::from_ymd_opt(2026, 4, 11).unwrap()), "2025-26");
    }

    #[test]
    fn season_label_pads_short_years() {
        assert_eq!(season_for(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()), "1999-00");
        assert_eq!(season_for(NaiveDate::from_ymd_opt(2099, 11, 1).unwrap()), "2099-00");
    }

    #[test]
    fn tail_recent_sorts_dedups_and_truncates() {
        let games = vec![
            game(day(9), 20.0),
            game(day(3), 10.0),
            game(day(9), 21.0),
            game(day(5), 15.0),
            game(day(7), 18.0),
        ];
        let out = tail_recent(games, 3);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].date, day(5));
        assert_eq!(out[1].date, day(7));
        assert_eq!(out[2].date, day(9));
    }

    #[test]
    fn tail_recent_keeps_short_series_intact() {
        let games = vec![game(day(1), 5.0), game(day(2), 6.0)];
        let out = tail_recent(games, 10);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn game_date_format_matches_endpoint() {
        assert_eq!(parse_game_date("APR 11, 2025"), NaiveDate::from_ymd_opt(2025, 4, 11));
        assert_eq!(parse_game_date(" Jan 02, 2024 "), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert!(parse_game_date("2025-04-11").is_none());
    }
}

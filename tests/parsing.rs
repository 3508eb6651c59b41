use chrono::NaiveDate;

use heatcheck_terminal::directory::{find_player, parse_player_directory_json};
use heatcheck_terminal::gamelog::{parse_game_log_json, tail_recent};

const DIRECTORY_FIXTURE: &str = include_str!("fixtures/commonallplayers.json");
const GAMELOG_FIXTURE: &str = include_str!("fixtures/playergamelog.json");

#[test]
fn directory_fixture_yields_named_players() {
    let players = parse_player_directory_json(DIRECTORY_FIXTURE).unwrap();
    // Five rows in the fixture, one with a null id and one with a blank name.
    assert_eq!(players.len(), 3);
    assert_eq!(players[0].id, 203999);
    assert_eq!(players[0].full_name, "Nikola Jokić");
    assert_eq!(players[2].full_name, "D'Angelo Russell");
}

#[test]
fn directory_lookup_survives_accents_and_apostrophes() {
    let players = parse_player_directory_json(DIRECTORY_FIXTURE).unwrap();
    assert_eq!(
        find_player(&players, "luka doncic").map(|p| p.id),
        Some(1629029)
    );
    assert_eq!(
        find_player(&players, "DAngelo Russell").map(|p| p.id),
        Some(1626156)
    );
    assert!(find_player(&players, "Wilt Chamberlain").is_none());
}

#[test]
fn directory_tolerates_degenerate_bodies() {
    assert!(parse_player_directory_json("").unwrap().is_empty());
    assert!(parse_player_directory_json("null").unwrap().is_empty());
    assert!(parse_player_directory_json("{\"resultSets\":[]}")
        .unwrap()
        .is_empty());
    assert!(parse_player_directory_json("{not json").is_err());
}

#[test]
fn gamelog_fixture_skips_bad_rows_and_defaults_null_fg() {
    let games = parse_game_log_json(GAMELOG_FIXTURE).unwrap();
    // Six rows in the fixture, one with an unparseable date.
    assert_eq!(games.len(), 5);

    // Rows come back in fixture order (newest first); the null FG_PCT game
    // keeps its counting stats with fg_pct defaulted to zero.
    let apr5 = games
        .iter()
        .find(|g| g.date == NaiveDate::from_ymd_opt(2025, 4, 5).unwrap())
        .expect("APR 05 game present");
    assert_eq!(apr5.points, 18.0);
    assert_eq!(apr5.fg_pct, 0.0);

    let apr11 = &games[0];
    assert_eq!(apr11.date, NaiveDate::from_ymd_opt(2025, 4, 11).unwrap());
    assert_eq!(apr11.points, 31.0);
    assert_eq!(apr11.rebounds, 12.0);
    assert_eq!(apr11.assists, 9.0);
    assert!((apr11.fg_pct - 0.6).abs() < 1e-12);
}

#[test]
fn gamelog_then_tail_recent_yields_chronological_window() {
    let games = parse_game_log_json(GAMELOG_FIXTURE).unwrap();
    let window = tail_recent(games, 3);
    assert_eq!(window.len(), 3);
    assert!(window.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(
        window.last().unwrap().date,
        NaiveDate::from_ymd_opt(2025, 4, 11).unwrap()
    );
}

#[test]
fn gamelog_tolerates_degenerate_bodies() {
    assert!(parse_game_log_json("").unwrap().is_empty());
    assert!(parse_game_log_json("null").unwrap().is_empty());
    assert!(parse_game_log_json("{\"resultSets\":[]}").unwrap().is_empty());
    assert!(parse_game_log_json("[1,2,3").is_err());
}

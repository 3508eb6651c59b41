use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gamelog::current_season;
use crate::http_cache::fetch_json_cached;
use crate::http_client::{http_client, stats_headers};

const DIRECTORY_URL: &str = "https://stats.nba.com/stats/commonallplayers";
const HEADSHOT_BASE: &str = "https://cdn.nba.com/headshots/nba/latest/1040x760";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub id: u32,
    pub full_name: String,
}

pub fn fetch_player_directory() -> Result<Vec<PlayerIdentity>> {
    let client = http_client()?;
    let url = format!(
        "{DIRECTORY_URL}?IsOnlyCurrentSeason=0&LeagueID=00&Season={}",
        current_season()
    );
    let body =
        fetch_json_cached(client, &url, &stats_headers()).context("player directory request")?;
    parse_player_directory_json(&body)
}

/// Parse the `commonallplayers` resultSets envelope into identities.
pub fn parse_player_directory_json(raw: &str) -> Result<Vec<PlayerIdentity>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let root: Value = serde_json::from_str(trimmed).context("invalid commonallplayers json")?;
    let Some(set) = result_set(&root, "CommonAllPlayers") else {
        return Ok(Vec::new());
    };
    let id_col = header_index(set, "PERSON_ID").context("PERSON_ID column missing")?;
    let name_col =
        header_index(set, "DISPLAY_FIRST_LAST").context("DISPLAY_FIRST_LAST column missing")?;

    let mut players = Vec::new();
    let Some(rows) = set.get("rowSet").and_then(Value::as_array) else {
        return Ok(players);
    };
    for row in rows {
        let Some(cells) = row.as_array() else { continue };
        let Some(id) = cells.get(id_col).and_then(Value::as_u64) else {
            continue;
        };
        let Some(name) = cells.get(name_col).and_then(Value::as_str) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        players.push(PlayerIdentity {
            id: id as u32,
            full_name: name.to_string(),
        });
    }
    Ok(players)
}

/// Match a human-entered name against the directory under `normalize_name`.
pub fn find_player<'a>(directory: &'a [PlayerIdentity], name: &str) -> Option<&'a PlayerIdentity> {
    let wanted = normalize_name(name);
    if wanted.is_empty() {
        return None;
    }
    directory
        .iter()
        .find(|p| normalize_name(&p.full_name) == wanted)
}

pub fn headshot_url(player_id: u32) -> String {
    format!("{HEADSHOT_BASE}/{player_id}.png")
}

/// Canonical comparison form: trimmed, lowercased, common Latin diacritics
/// folded (Jokic matches Jokić), punctuation dropped, whitespace collapsed.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for c in name.trim().chars().flat_map(char::to_lowercase) {
        let c = fold_diacritic(c);
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else if c.is_whitespace() {
            pending_space = true;
        }
        // Everything else (periods, apostrophes, hyphens) is dropped.
    }
    out
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ă' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'ī' | 'ı' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ō' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ñ' | 'ń' | 'ņ' => 'n',
        'ç' | 'ć' | 'č' => 'c',
        'š' | 'ş' | 'ș' => 's',
        'ž' | 'ź' | 'ż' => 'z',
        'ď' | 'đ' => 'd',
        'ğ' | 'ģ' => 'g',
        'ķ' => 'k',
        'ł' => 'l',
        'ř' => 'r',
        'ț' | 'ţ' => 't',
        other => other,
    }
}

fn result_set<'a>(root: &'a Value, name: &str) -> Option<&'a Value> {
    root.get("resultSets")?.as_array()?.iter().find(|set| {
        set.get("name")
            .and_then(Value::as_str)
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    })
}

fn header_index(set: &Value, name: &str) -> Option<usize> {
    set.get("headers")?
        .as_array()?
        .iter()
        .position(|h| h.as_str().is_some_and(|s| s.eq_ignore_ascii_case(name)))
}

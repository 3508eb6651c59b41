use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::directory::PlayerIdentity;
use crate::http_cache::app_cache_dir;
use crate::state::AppState;
use crate::trend::{StatKind, TrendMethod};

const CACHE_FILE: &str = "cache.json";
const CACHE_VERSION: u32 = 1;
const DEFAULT_DIRECTORY_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    directory: Vec<PlayerIdentity>,
    #[serde(default)]
    directory_fetched_at: Option<u64>,
    #[serde(default)]
    setup: Option<SetupCache>,
}

/// Last-used controls, restored on the next launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupCache {
    pub num_games: usize,
    pub recent_games: usize,
    pub method: TrendMethod,
    pub enabled_stats: Vec<bool>,
}

/// The cached player directory, if present and still within its TTL. The
/// roster changes rarely, so a stale-but-recent copy beats a refetch.
pub fn load_directory() -> Option<Vec<PlayerIdentity>> {
    let cache = load_cache_file()?;
    if cache.directory.is_empty() {
        return None;
    }
    let fetched_at = cache.directory_fetched_at?;
    let now = system_time_to_secs(SystemTime::now())?;
    if now.saturating_sub(fetched_at) > directory_ttl_secs() {
        return None;
    }
    Some(cache.directory)
}

pub fn save_directory(directory: &[PlayerIdentity]) {
    let mut cache = load_cache_file().unwrap_or_default();
    cache.directory = directory.to_vec();
    cache.directory_fetched_at = system_time_to_secs(SystemTime::now());
    save_cache_file(&cache);
}

pub fn load_setup_into(state: &mut AppState) {
    let Some(setup) = load_cache_file().and_then(|cache| cache.setup) else {
        return;
    };
    state.num_games = setup
        .num_games
        .clamp(crate::state::MIN_TRACKED_GAMES, crate::state::MAX_TRACKED_GAMES);
    state.recent_games = setup.recent_games.clamp(1, state.num_games - 1);
    state.method = setup.method;
    for (flag, saved) in state.enabled_stats.iter_mut().zip(setup.enabled_stats) {
        *flag = saved;
    }
    if !state.enabled_stats.iter().any(|on| *on) {
        state.enabled_stats = [true; StatKind::ALL.len()];
    }
}

pub fn save_setup(state: &AppState) {
    let mut cache = load_cache_file().unwrap_or_default();
    cache.setup = Some(SetupCache {
        num_games: state.num_games,
        recent_games: state.recent_games,
        method: state.method,
        enabled_stats: state.enabled_stats.to_vec(),
    });
    save_cache_file(&cache);
}

fn load_cache_file() -> Option<CacheFile> {
    let raw = fs::read_to_string(cache_path()?).ok()?;
    let cache = serde_json::from_str::<CacheFile>(&raw).ok()?;
    if cache.version != CACHE_VERSION {
        return None;
    }
    Some(cache)
}

fn save_cache_file(cache: &CacheFile) {
    let Some(path) = cache_path() else {
        return;
    };
    let mut cache = cache.clone();
    cache.version = CACHE_VERSION;
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    if let Ok(json) = serde_json::to_string(&cache) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, &path);
        }
    }
}

fn cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn directory_ttl_secs() -> u64 {
    std::env::var("DIRECTORY_TTL_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DEFAULT_DIRECTORY_TTL_SECS)
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

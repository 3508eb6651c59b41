use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs()))
            .build()
            .context("failed to build http client")
    })
}

fn request_timeout_secs() -> u64 {
    std::env::var("STATS_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(REQUEST_TIMEOUT_SECS)
        .max(1)
}

/// Headers stats.nba.com requires before it will answer a JSON request.
pub fn stats_headers() -> [(&'static str, &'static str); 4] {
    [
        ("Referer", "https://www.nba.com/"),
        ("Origin", "https://www.nba.com"),
        ("Accept", "application/json"),
        ("x-nba-stats-origin", "stats"),
    ]
}

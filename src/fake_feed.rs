use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::directory::{self, PlayerIdentity};
use crate::state::{AnalyzeRequest, Delta, PlayerCard, ProviderCommand};
use crate::trend::{self, GameRecord, TrendError};

/// Offline provider: a seeded roster plus generated box scores, so the UI and
/// classifier can be exercised without touching stats.nba.com.
pub fn spawn_fake_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let roster = seed_roster();
        let _ = tx.send(Delta::DirectorySize(roster.len()));
        let _ = tx.send(Delta::Log(
            "[INFO] Offline mode: demo roster with generated box scores".to_string(),
        ));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Analyze(request) => {
                    let _ = tx.send(Delta::Busy(true));
                    run_fake_analysis(&tx, &roster, &request);
                    let _ = tx.send(Delta::Busy(false));
                }
            }
        }
    });
}

fn run_fake_analysis(tx: &Sender<Delta>, roster: &[PlayerIdentity], request: &AnalyzeRequest) {
    let mut rng = rand::thread_rng();

    for (slot, name) in request.names.iter().enumerate() {
        let Some(player) = directory::find_player(roster, name) else {
            let _ = tx.send(Delta::CardError {
                slot,
                message: format!("Player not found: {name}"),
            });
            continue;
        };
        let player = player.clone();

        // Even slots trend upward late, odd slots stay flat, so both label
        // families show up in a demo run.
        let games = generate_series(&mut rng, request.num_games, slot % 2 == 0);

        let (report, note) = match trend::classify(&games, &request.config) {
            Ok(report) => (Some(report), None),
            Err(TrendError::InsufficientData { games, required }) => (
                None,
                Some(format!(
                    "Not enough games to analyze trend for {} ({games} of {required})",
                    player.full_name
                )),
            ),
        };
        if let Some(note) = &note {
            let _ = tx.send(Delta::Log(format!("[WARN] {note}")));
        }

        let headshot = directory::headshot_url(player.id);
        let _ = tx.send(Delta::SetCard {
            slot,
            card: PlayerCard {
                player,
                headshot,
                games,
                trend: report,
                trend_note: note,
            },
        });
    }
}

fn generate_series(rng: &mut impl Rng, num_games: usize, hot_finish: bool) -> Vec<GameRecord> {
    let base_points: f64 = rng.gen_range(14.0..26.0);
    let base_rebounds: f64 = rng.gen_range(4.0..11.0);
    let base_assists: f64 = rng.gen_range(3.0..9.0);
    let base_fg: f64 = rng.gen_range(0.42..0.52);

    let today = Utc::now().date_naive();
    let mut games = Vec::with_capacity(num_games);
    for i in 0..num_games {
        // One game every other day, newest game yesterday.
        let offset = 2 * (num_games - i) as i64 - 1;
        let date = today - ChronoDuration::days(offset);

        let late = hot_finish && i + 2 >= num_games;
        let lift = if late { 1.30 } else { 1.0 };

        games.push(GameRecord {
            date,
            points: (base_points * lift + rng.gen_range(-3.0..3.0)).max(0.0).round(),
            rebounds: (base_rebounds * lift + rng.gen_range(-2.0..2.0)).max(0.0).round(),
            assists: (base_assists * lift + rng.gen_range(-2.0..2.0)).max(0.0).round(),
            fg_pct: (base_fg * lift + rng.gen_range(-0.06..0.06)).clamp(0.0, 1.0),
        });
    }
    games
}

fn seed_roster() -> Vec<PlayerIdentity> {
    [
        (1001, "Ava Stone"),
        (1002, "Marcus Vale"),
        (1003, "Theo Rook"),
        (1004, "Iris Holt"),
        (1005, "Dario Nox"),
        (1006, "Selma Quinn"),
    ]
    .into_iter()
    .map(|(id, name)| PlayerIdentity {
        id,
        full_name: name.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_series_is_chronological_and_sized() {
        let mut rng = rand::thread_rng();
        let games = generate_series(&mut rng, 8, true);
        assert_eq!(games.len(), 8);
        assert!(games.windows(2).all(|w| w[0].date < w[1].date));
        assert!(games.iter().all(|g| (0.0..=1.0).contains(&g.fg_pct)));
    }

    #[test]
    fn seed_roster_resolves_by_normalized_name() {
        let roster = seed_roster();
        assert!(directory::find_player(&roster, "ava stone").is_some());
        assert!(directory::find_player(&roster, "MARCUS VALE").is_some());
    }
}

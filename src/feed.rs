use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::directory::{self, PlayerIdentity};
use crate::gamelog;
use crate::persist;
use crate::state::{AnalyzeRequest, Delta, PlayerCard, ProviderCommand};
use crate::trend::{self, TrendError};

/// Background worker that owns every network call. The UI talks to it only
/// through commands and deltas.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut roster: Option<Vec<PlayerIdentity>> = None;

        if let Some(cached) = persist::load_directory() {
            let _ = tx.send(Delta::Log(format!(
                "[INFO] Player directory loaded from cache ({} players)",
                cached.len()
            )));
            let _ = tx.send(Delta::DirectorySize(cached.len()));
            roster = Some(cached);
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Analyze(request) => {
                    let _ = tx.send(Delta::Busy(true));
                    run_analysis(&tx, &mut roster, &request);
                    let _ = tx.send(Delta::Busy(false));
                }
            }
        }
        // Channel closed: UI is gone, let the thread end.
    });
}

fn run_analysis(
    tx: &Sender<Delta>,
    roster: &mut Option<Vec<PlayerIdentity>>,
    request: &AnalyzeRequest,
) {
    let directory = match ensure_directory(tx, roster) {
        Some(directory) => directory,
        None => return,
    };

    for (slot, name) in request.names.iter().enumerate() {
        let Some(player) = directory::find_player(directory, name) else {
            let _ = tx.send(Delta::CardError {
                slot,
                message: format!("Player not found: {name}"),
            });
            continue;
        };
        let player = player.clone();

        let games = match gamelog::fetch_recent_games(player.id, request.num_games) {
            Ok(games) => games,
            Err(err) => {
                let _ = tx.send(Delta::CardError {
                    slot,
                    message: format!("Game log fetch failed for {}: {err}", player.full_name),
                });
                continue;
            }
        };

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

fn ensure_directory<'a>(
    tx: &Sender<Delta>,
    roster: &'a mut Option<Vec<PlayerIdentity>>,
) -> Option<&'a Vec<PlayerIdentity>> {
    if roster.is_none() {
        match directory::fetch_player_directory() {
            Ok(players) if !players.is_empty() => {
                let _ = tx.send(Delta::Log(format!(
                    "[INFO] Player directory fetched ({} players)",
                    players.len()
                )));
                let _ = tx.send(Delta::DirectorySize(players.len()));
                persist::save_directory(&players);
                *roster = Some(players);
            }
            Ok(_) => {
                let _ = tx.send(Delta::Log(
                    "[WARN] Player directory came back empty".to_string(),
                ));
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Player directory error: {err}")));
            }
        }
    }
    roster.as_ref()
}

use std::collections::VecDeque;

use crate::directory::PlayerIdentity;
use crate::trend::{GameRecord, StatKind, TrendConfig, TrendMethod, TrendReport};

pub const MAX_TRACKED_GAMES: usize = 20;
pub const MIN_TRACKED_GAMES: usize = 2;
pub const MAX_LOG_LINES: usize = 50;
pub const PLAYER_SLOTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Board,
}

/// Focusable controls on the setup screen, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    PlayerOne,
    PlayerTwo,
    NumGames,
    RecentGames,
    Stats,
    Method,
}

impl SetupField {
    const ORDER: [SetupField; 6] = [
        SetupField::PlayerOne,
        SetupField::PlayerTwo,
        SetupField::NumGames,
        SetupField::RecentGames,
        SetupField::Stats,
        SetupField::Method,
    ];

    pub fn next(self) -> SetupField {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> SetupField {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Everything the board needs to render one analyzed player.
#[derive(Debug, Clone)]
pub struct PlayerCard {
    pub player: PlayerIdentity,
    pub headshot: String,
    pub games: Vec<GameRecord>,
    pub trend: Option<TrendReport>,
    /// Present when classification was skipped (insufficient data).
    pub trend_note: Option<String>,
}

/// The explicit request object handed to the provider; replaces any notion of
/// page-level input state.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub names: Vec<String>,
    pub num_games: usize,
    pub config: TrendConfig,
}

#[derive(Debug)]
pub enum ProviderCommand {
    Analyze(AnalyzeRequest),
}

#[derive(Debug)]
pub enum Delta {
    DirectorySize(usize),
    SetCard { slot: usize, card: PlayerCard },
    CardError { slot: usize, message: String },
    Busy(bool),
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub focus: SetupField,
    pub player_inputs: [String; PLAYER_SLOTS],
    pub num_games: usize,
    pub recent_games: usize,
    pub method: TrendMethod,
    pub enabled_stats: [bool; StatKind::ALL.len()],
    pub stat_cursor: usize,
    pub cards: [Option<PlayerCard>; PLAYER_SLOTS],
    pub card_errors: [Option<String>; PLAYER_SLOTS],
    pub busy: bool,
    pub directory_size: Option<usize>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export_status: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Setup,
            focus: SetupField::PlayerOne,
            player_inputs: [String::new(), String::new()],
            num_games: 5,
            recent_games: 3,
            method: TrendMethod::Percent,
            enabled_stats: [true; StatKind::ALL.len()],
            stat_cursor: 0,
            cards: [None, None],
            card_errors: [None, None],
            busy: false,
            directory_size: None,
            logs: VecDeque::new(),
            help_overlay: false,
            export_status: None,
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push_back(line.into());
        while self.logs.len() > MAX_LOG_LINES {
            self.logs.pop_front();
        }
    }

    pub fn selected_stats(&self) -> Vec<StatKind> {
        StatKind::ALL
            .iter()
            .zip(self.enabled_stats.iter())
            .filter_map(|(&stat, &on)| on.then_some(stat))
            .collect()
    }

    /// At least one stat must stay enabled; the classifier contract requires
    /// a non-empty set.
    pub fn toggle_stat(&mut self, idx: usize) {
        let Some(flag) = self.enabled_stats.get(idx).copied() else {
            return;
        };
        if flag && self.enabled_stats.iter().filter(|on| **on).count() == 1 {
            return;
        }
        self.enabled_stats[idx] = !flag;
    }

    pub fn adjust_num_games(&mut self, delta: i64) {
        let next = (self.num_games as i64 + delta)
            .clamp(MIN_TRACKED_GAMES as i64, MAX_TRACKED_GAMES as i64);
        self.num_games = next as usize;
        self.clamp_recent();
    }

    pub fn adjust_recent_games(&mut self, delta: i64) {
        let next = (self.recent_games as i64 + delta).max(1);
        self.recent_games = next as usize;
        self.clamp_recent();
    }

    fn clamp_recent(&mut self) {
        // The recent window must leave at least one baseline game.
        self.recent_games = self.recent_games.clamp(1, self.num_games - 1);
    }

    pub fn toggle_method(&mut self) {
        self.method = match self.method {
            TrendMethod::Percent => TrendMethod::StdDev,
            TrendMethod::StdDev => TrendMethod::Percent,
        };
    }

    pub fn trend_config(&self) -> TrendConfig {
        TrendConfig {
            recent_games: self.recent_games,
            stats: self.selected_stats(),
            method: self.method,
        }
    }

    /// Build the provider request from the current inputs, or `None` when no
    /// player name has been entered.
    pub fn analyze_request(&self) -> Option<AnalyzeRequest> {
        let names: Vec<String> = self
            .player_inputs
            .iter()
            .map(|name| name.trim().to_string())
            .take_while(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return None;
        }
        Some(AnalyzeRequest {
            names,
            num_games: self.num_games,
            config: self.trend_config(),
        })
    }

    pub fn active_cards(&self) -> Vec<&PlayerCard> {
        self.cards.iter().flatten().collect()
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::DirectorySize(count) => {
            state.directory_size = Some(count);
        }
        Delta::SetCard { slot, card } => {
            if let Some(entry) = state.cards.get_mut(slot) {
                *entry = Some(card);
                state.card_errors[slot] = None;
                state.screen = Screen::Board;
            }
        }
        Delta::CardError { slot, message } => {
            if let Some(entry) = state.card_errors.get_mut(slot) {
                *entry = Some(message.clone());
                state.cards[slot] = None;
            }
            state.push_log(format!("[WARN] {message}"));
        }
        Delta::Busy(busy) => {
            state.busy = busy;
        }
        Delta::Log(line) => {
            state.push_log(line);
        }
    }
}

pub fn method_label(method: TrendMethod) -> &'static str {
    match method {
        TrendMethod::Percent => "PCT 5%",
        TrendMethod::StdDev => "STDDEV",
    }
}

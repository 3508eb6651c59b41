use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Sparkline};

use heatcheck_terminal::state::{
    self, apply_delta, method_label, AppState, PlayerCard, ProviderCommand, Screen, SetupField,
};
use heatcheck_terminal::trend::{self, StatKind, TrendLabel};
use heatcheck_terminal::{export, fake_feed, feed, persist};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match self.state.screen {
            Screen::Setup => self.on_setup_key(key),
            Screen::Board => self.on_board_key(key),
        }
    }

    fn on_setup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Tab | KeyCode::Down => self.state.focus = self.state.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.state.focus = self.state.focus.prev(),
            KeyCode::Enter => self.request_analysis(),
            KeyCode::Backspace => {
                if let Some(input) = self.input_buffer() {
                    input.pop();
                }
            }
            KeyCode::Left => self.on_setup_adjust(-1),
            KeyCode::Right => self.on_setup_adjust(1),
            KeyCode::Char(' ') => match self.state.focus {
                SetupField::Stats => {
                    let cursor = self.state.stat_cursor;
                    self.state.toggle_stat(cursor);
                }
                SetupField::Method => self.state.toggle_method(),
                _ => self.push_input(' '),
            },
            KeyCode::Char(c) => self.push_input(c),
            _ => {}
        }
    }

    fn on_setup_adjust(&mut self, delta: i64) {
        match self.state.focus {
            SetupField::NumGames => self.state.adjust_num_games(delta),
            SetupField::RecentGames => self.state.adjust_recent_games(delta),
            SetupField::Stats => {
                let len = StatKind::ALL.len();
                let cursor = self.state.stat_cursor as i64 + delta;
                self.state.stat_cursor = cursor.rem_euclid(len as i64) as usize;
            }
            SetupField::Method => self.state.toggle_method(),
            _ => {}
        }
    }

    fn input_buffer(&mut self) -> Option<&mut String> {
        match self.state.focus {
            SetupField::PlayerOne => Some(&mut self.state.player_inputs[0]),
            SetupField::PlayerTwo => Some(&mut self.state.player_inputs[1]),
            _ => None,
        }
    }

    fn push_input(&mut self, c: char) {
        if let Some(input) = self.input_buffer() {
            if input.len() < 40 {
                input.push(c);
            }
        }
    }

    fn on_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Setup,
            KeyCode::Char('m') => {
                self.state.toggle_method();
                self.reclassify_cards();
            }
            KeyCode::Char('r') => self.request_analysis(),
            KeyCode::Char('e') => self.export_cards(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn request_analysis(&mut self) {
        let Some(request) = self.state.analyze_request() else {
            self.state
                .push_log("[INFO] Enter at least Player 1 before analyzing");
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Provider unavailable");
            return;
        };
        if tx.send(ProviderCommand::Analyze(request)).is_err() {
            self.state.push_log("[WARN] Analyze request failed");
        } else {
            self.state.push_log("[INFO] Pulling game stats...");
        }
    }

    /// Re-run the classifier over already-fetched game logs; no refetch.
    fn reclassify_cards(&mut self) {
        let config = self.state.trend_config();
        for card in self.state.cards.iter_mut().flatten() {
            match trend::classify(&card.games, &config) {
                Ok(report) => {
                    card.trend = Some(report);
                    card.trend_note = None;
                }
                Err(err) => {
                    card.trend = None;
                    card.trend_note = Some(format!(
                        "Not enough games to analyze trend for {}: {err}",
                        card.player.full_name
                    ));
                }
            }
        }
        self.state
            .push_log(format!("[INFO] Method: {}", method_label(self.state.method)));
    }

    fn export_cards(&mut self) {
        let cards = self.state.active_cards();
        if cards.is_empty() {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        }
        let path = export_path();
        match export::export_cards(&path, &cards) {
            Ok(report) => {
                let message = format!(
                    "Exported {} players, {} games, {} trend rows to {}",
                    report.players,
                    report.games,
                    report.trends,
                    path.display()
                );
                self.state.export_status = Some(message.clone());
                self.state.push_log(format!("[INFO] {message}"));
            }
            Err(err) => {
                self.state.push_log(format!("[WARN] Export failed: {err}"));
            }
        }
    }
}

fn export_path() -> PathBuf {
    PathBuf::from(format!(
        "heatcheck_{}.xlsx",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    if offline_mode() {
        fake_feed::spawn_fake_provider(tx, cmd_rx);
    } else {
        feed::spawn_provider(tx, cmd_rx);
    }

    let mut app = App::new(Some(cmd_tx));
    persist::load_setup_into(&mut app.state);
    let res = run_app(&mut terminal, &mut app, rx);
    persist::save_setup(&app.state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn offline_mode() -> bool {
    std::env::var("HEATCHECK_OFFLINE")
        .map(|val| val == "1" || val.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Setup => render_setup(frame, chunks[1], &app.state),
        Screen::Board => render_board(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let busy = if state.busy { " | FETCHING" } else { "" };
    let directory = state
        .directory_size
        .map(|n| format!(" | {n} players"))
        .unwrap_or_default();
    let title = format!(
        "HEAT CHECK | {} | last {} games, recent {}{directory}{busy}",
        method_label(state.method),
        state.num_games,
        state.recent_games
    );
    let line1 = format!("  (\\  {title}");
    let line2 = "  )))".to_string();
    let line3 = " (((".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Setup => {
            "Tab/↑↓ Field | ←/→ Adjust | Space Toggle | Enter Analyze | F1 Help | Esc Quit"
                .to_string()
        }
        Screen::Board => {
            "b/Esc Setup | r Refresh | m Method | e Export | ? Help | q Quit".to_string()
        }
    }
}

fn render_setup(frame: &mut Frame, area: Rect, state: &AppState) {
    let panel = centered_rect(70, 80, area);
    let block = Block::default()
        .title("Who is hot?")
        .borders(Borders::ALL);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    render_setup_line(
        frame,
        rows[0],
        state,
        SetupField::PlayerOne,
        "Player 1",
        &input_display(&state.player_inputs[0], "name required"),
    );
    render_setup_line(
        frame,
        rows[1],
        state,
        SetupField::PlayerTwo,
        "Player 2",
        &input_display(&state.player_inputs[1], "optional"),
    );
    render_setup_line(
        frame,
        rows[2],
        state,
        SetupField::NumGames,
        "Games to pull",
        &format!("< {} >", state.num_games),
    );
    render_setup_line(
        frame,
        rows[3],
        state,
        SetupField::RecentGames,
        "Recent window",
        &format!("< {} >", state.recent_games),
    );
    render_setup_line(
        frame,
        rows[4],
        state,
        SetupField::Stats,
        "Stats",
        &stats_display(state),
    );
    render_setup_line(
        frame,
        rows[5],
        state,
        SetupField::Method,
        "Method",
        method_label(state.method),
    );
}

fn input_display(input: &str, placeholder: &str) -> String {
    if input.is_empty() {
        format!("({placeholder})")
    } else {
        input.to_string()
    }
}

fn stats_display(state: &AppState) -> String {
    StatKind::ALL
        .iter()
        .enumerate()
        .map(|(idx, stat)| {
            let mark = if state.enabled_stats[idx] { "x" } else { " " };
            let cursor = if idx == state.stat_cursor { ">" } else { " " };
            format!("{cursor}[{mark}] {}", stat.label())
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn render_setup_line(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    field: SetupField,
    label: &str,
    value: &str,
) {
    let style = if state.focus == field {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let line = format!("{label:<15} {value}");
    frame.render_widget(Paragraph::new(line).style(style), area);
}

fn render_board(frame: &mut Frame, area: Rect, state: &AppState) {
    let slots: Vec<usize> = (0..state::PLAYER_SLOTS)
        .filter(|&slot| state.cards[slot].is_some() || state.card_errors[slot].is_some())
        .collect();

    if slots.is_empty() {
        let empty = Paragraph::new("No players analyzed yet - press b for setup")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let columns = if slots.len() == 1 {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
    };

    for (col, slot) in slots.into_iter().enumerate() {
        match (&state.cards[slot], &state.card_errors[slot]) {
            (Some(card), _) => render_card(frame, columns[col], state, card),
            (None, Some(message)) => {
                let error = Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::Red))
                    .block(Block::default().title("Lookup").borders(Borders::ALL));
                frame.render_widget(error, columns[col]);
            }
            (None, None) => {}
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, state: &AppState, card: &PlayerCard) {
    let stats = state.selected_stats();
    let trend_height = stats.len() as u16 + 2;
    let spark_height = if stats.contains(&StatKind::FgPct) { 4 } else { 0 };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(card.games.len() as u16 + 3),
            Constraint::Length(trend_height),
            Constraint::Min(8),
            Constraint::Length(spark_height),
        ])
        .split(area);

    let profile = Paragraph::new(profile_text(card)).block(
        Block::default()
            .title(card.player.full_name.as_str())
            .borders(Borders::ALL),
    );
    frame.render_widget(profile, rows[0]);

    let table = Paragraph::new(games_table_text(card)).block(
        Block::default()
            .title(format!("Last {} Games", card.games.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, rows[1]);

    let trend = Paragraph::new(trend_lines(card)).block(
        Block::default()
            .title("Trend Analysis")
            .borders(Borders::ALL),
    );
    frame.render_widget(trend, rows[2]);

    render_stat_chart(frame, rows[3], &stats, card);

    if spark_height > 0 {
        render_fg_sparkline(frame, rows[4], card);
    }
}

fn profile_text(card: &PlayerCard) -> String {
    format!(
        "ID: {}\nHeadshot: {}",
        card.player.id, card.headshot
    )
}

fn games_table_text(card: &PlayerCard) -> String {
    let mut lines = vec![format!(
        "{:<13} {:>5} {:>5} {:>5} {:>6}",
        "Date", "PTS", "REB", "AST", "FG%"
    )];
    for game in &card.games {
        lines.push(format!(
            "{:<13} {:>5.0} {:>5.0} {:>5.0} {:>5.1}%",
            game.date.format("%b %d, %Y"),
            game.points,
            game.rebounds,
            game.assists,
            game.fg_pct * 100.0
        ));
    }
    lines.join("\n")
}

fn trend_lines(card: &PlayerCard) -> Vec<Line<'static>> {
    if let Some(note) = &card.trend_note {
        return vec![Line::styled(
            note.clone(),
            Style::default().fg(Color::Yellow),
        )];
    }
    let Some(report) = &card.trend else {
        return vec![Line::raw("No trend computed")];
    };
    report
        .stats
        .iter()
        .map(|stat| {
            let style = Style::default().fg(trend_color(stat.label));
            let is_pct = stat.stat == StatKind::FgPct;
            let (baseline, recent) = if is_pct {
                (stat.baseline_mean * 100.0, stat.recent_mean * 100.0)
            } else {
                (stat.baseline_mean, stat.recent_mean)
            };
            let suffix = if is_pct { "%" } else { "" };
            Line::from(vec![
                Span::raw(format!("{:<5}", stat.stat.label())),
                Span::styled(format!("{:<13}", stat.label.label()), style),
                Span::raw(format!("{baseline:.1}{suffix} -> {recent:.1}{suffix}")),
            ])
        })
        .collect()
}

fn trend_color(label: TrendLabel) -> Color {
    match label {
        TrendLabel::Heating => Color::Red,
        TrendLabel::Cooling => Color::Cyan,
        TrendLabel::Stable => Color::Green,
        TrendLabel::Undetermined => Color::DarkGray,
    }
}

fn stat_color(stat: StatKind) -> Color {
    match stat {
        StatKind::Points => Color::Yellow,
        StatKind::Rebounds => Color::Green,
        StatKind::Assists => Color::Cyan,
        StatKind::FgPct => Color::Magenta,
    }
}

/// Grouped bar chart, one group per game, one bar per enabled stat.
/// FG% is scaled to 0-100 so it shares an axis with counting stats.
fn render_stat_chart(frame: &mut Frame, area: Rect, stats: &[StatKind], card: &PlayerCard) {
    let mut chart = BarChart::default()
        .block(
            Block::default()
                .title("Per-Game Stats")
                .borders(Borders::ALL),
        )
        .bar_width(2)
        .bar_gap(0)
        .group_gap(1);

    for game in &card.games {
        let bars: Vec<Bar> = stats
            .iter()
            .map(|&stat| {
                let value = match stat {
                    StatKind::FgPct => (game.value(stat) * 100.0).round() as u64,
                    _ => game.value(stat).round() as u64,
                };
                Bar::default()
                    .value(value)
                    .text_value(String::new())
                    .style(Style::default().fg(stat_color(stat)))
            })
            .collect();
        let label = game.date.format("%m/%d").to_string();
        chart = chart.data(BarGroup::default().label(label.into()).bars(&bars));
    }

    frame.render_widget(chart, area);
}

fn render_fg_sparkline(frame: &mut Frame, area: Rect, card: &PlayerCard) {
    let data: Vec<u64> = card
        .games
        .iter()
        .map(|g| (g.fg_pct * 100.0).round() as u64)
        .collect();
    let spark = Sparkline::default()
        .block(Block::default().title("FG% Trend").borders(Borders::ALL))
        .style(Style::default().fg(Color::Magenta))
        .max(100)
        .data(&data);
    frame.render_widget(spark, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No activity yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Heat Check - Help",
        "",
        "Setup:",
        "  Tab / ↑↓      Move between fields",
        "  ← / →         Adjust numbers, move stat cursor",
        "  Space         Toggle stat or method",
        "  Enter         Analyze",
        "  Esc           Quit",
        "",
        "Board:",
        "  b / Esc       Back to setup",
        "  r             Refetch and reanalyze",
        "  m             Switch percent/stddev method",
        "  e             Export to xlsx",
        "  q             Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

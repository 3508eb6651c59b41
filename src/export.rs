use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::state::PlayerCard;

pub struct ExportReport {
    pub players: usize,
    pub games: usize,
    pub trends: usize,
}

/// Write one worksheet of game rows per player plus a trend summary sheet.
pub fn export_cards(path: &Path, cards: &[&PlayerCard]) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let mut games = 0usize;
    let mut trends = 0usize;

    for (idx, card) in cards.iter().enumerate() {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(sheet_name(idx, &card.player.full_name))
            .context("worksheet name")?;
        write_game_rows(sheet, card, &bold)?;
        games += card.games.len();
    }

    let summary = workbook.add_worksheet();
    summary.set_name("Trends").context("worksheet name")?;
    for (col, title) in ["Player", "Stat", "Baseline Avg", "Recent Avg", "Verdict"]
        .iter()
        .enumerate()
    {
        summary.write_string_with_format(0, col as u16, *title, &bold)?;
    }
    let mut row = 1u32;
    for card in cards {
        let Some(report) = &card.trend else { continue };
        for stat in &report.stats {
            summary.write_string(row, 0, &card.player.full_name)?;
            summary.write_string(row, 1, stat.stat.label())?;
            summary.write_number(row, 2, stat.baseline_mean)?;
            summary.write_number(row, 3, stat.recent_mean)?;
            summary.write_string(row, 4, stat.label.label())?;
            row += 1;
            trends += 1;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        players: cards.len(),
        games,
        trends,
    })
}

fn write_game_rows(sheet: &mut Worksheet, card: &PlayerCard, bold: &Format) -> Result<()> {
    for (col, title) in ["Date", "PTS", "REB", "AST", "FG%"].iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, bold)?;
    }
    for (i, game) in card.games.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, game.date.format("%b %d, %Y").to_string())?;
        sheet.write_number(row, 1, game.points)?;
        sheet.write_number(row, 2, game.rebounds)?;
        sheet.write_number(row, 3, game.assists)?;
        sheet.write_number(row, 4, game.fg_pct)?;
    }
    Ok(())
}

/// Excel limits sheet names to 31 chars and bans a handful of characters.
fn sheet_name(slot: usize, full_name: &str) -> String {
    let cleaned: String = full_name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let name = format!("P{} {}", slot + 1, cleaned.trim());
    name.chars().take(31).collect()
}

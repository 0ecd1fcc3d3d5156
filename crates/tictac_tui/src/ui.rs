//! Frame layout: title, player panels, board, status and key help.

mod board;

use crate::app::{App, PlayerPanel};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
};
use tictac_core::{Settings, SettingsStore, Symbol};

const HELP: &str = "arrows move | enter/space or 1-9 place | u undo | h hint | n vs human | c vs computer | s settings | q quit";

const SETTINGS_HELP: &str = "a audio | t timer | +/- seconds | s/enter/esc save";

/// Draws the whole frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Players
            Constraint::Min(12),   // Board
            Constraint::Length(3), // Status
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let title = Paragraph::new("Tictac")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_panels(frame, chunks[1], app.panels());
    board::render_board(frame, chunks[2], app);

    let status = Paragraph::new(app.status_message())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[3]);

    let help_text = if app.settings_open() { SETTINGS_HELP } else { HELP };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);

    if let Some(text) = app.banner() {
        draw_banner(frame, chunks[2], text);
    }
    if let Some(settings) = app.settings_draft() {
        draw_settings(frame, chunks[2], settings);
    }
}

fn draw_settings(frame: &mut Frame, area: Rect, settings: &Settings) {
    let on_off = |flag: bool| if flag { "on" } else { "off" };
    let lines = vec![
        Line::from(format!("Audio:        {}", on_off(settings.audio_enabled()))),
        Line::from(format!("Turn timer:   {}", on_off(*settings.timer_enabled()))),
        Line::from(format!("Seconds/turn: {}", settings.timer_seconds())),
    ];
    let rect = board::center_rect(area, 30, 5);
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("Settings"),
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(panel, rect);
}

fn draw_panels(frame: &mut Frame, area: Rect, panels: &[PlayerPanel]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (panel, col) in panels.iter().zip(cols.iter()) {
        let mut border = Style::default().fg(Color::DarkGray);
        if panel.on_turn {
            border = symbol_style(*panel.player.symbol());
        }
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(panel.player.to_string()),
            )
            .gauge_style(symbol_style(*panel.player.symbol()))
            .ratio(f64::from(panel.fraction.clamp(0.0, 1.0)))
            .label("");
        frame.render_widget(gauge, *col);
    }
}

fn draw_banner(frame: &mut Frame, area: Rect, text: &str) {
    let width = u16::try_from(text.len()).unwrap_or(u16::MAX).saturating_add(8);
    let rect = board::center_rect(area, width, 3);
    let banner = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(Clear, rect);
    frame.render_widget(banner, rect);
}

/// Color of a player's symbol.
fn symbol_style(symbol: Symbol) -> Style {
    match symbol {
        Symbol::X => Style::default().fg(Color::Blue),
        Symbol::O => Style::default().fg(Color::Red),
    }
}

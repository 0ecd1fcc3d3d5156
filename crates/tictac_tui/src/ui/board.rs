//! Tic-tac-toe board rendering.

use super::symbol_style;
use crate::app::App;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tictac_core::{BOARD_SIZE, Position};

/// Renders the board with cursor, hint and winning-line styling.
pub fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let board_area = center_rect(area, 40, 11);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(board_area);

    for row in 0..BOARD_SIZE {
        render_row(f, rows[row * 2], app, row);
        if row + 1 < BOARD_SIZE {
            render_separator(f, rows[row * 2 + 1]);
        }
    }
}

fn render_row(f: &mut Frame, area: Rect, app: &App, row: usize) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Length(1),
            Constraint::Percentage(33),
            Constraint::Length(1),
            Constraint::Percentage(34),
        ])
        .split(area);

    for col in 0..BOARD_SIZE {
        if let Ok(position) = Position::new(row, col) {
            render_square(f, cols[col * 2], app, position);
        }
        if col + 1 < BOARD_SIZE {
            render_vertical_sep(f, cols[col * 2 + 1]);
        }
    }
}

fn render_square(f: &mut Frame, area: Rect, app: &App, position: Position) {
    let cell = app.cell(position);
    let (text, mut style) = match cell.symbol {
        Some(symbol) => (
            symbol.to_string(),
            symbol_style(symbol).add_modifier(Modifier::BOLD),
        ),
        None => (
            format!("{}", position.index() + 1),
            Style::default().fg(Color::DarkGray),
        ),
    };
    if cell.winning {
        style = style
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK);
    } else if cell.highlighted {
        style = style.bg(Color::Yellow).fg(Color::Black);
    }
    if position == app.cursor() && cell.interactable {
        style = style.bg(Color::White).fg(Color::Black);
    } else if position == app.cursor() {
        style = style.add_modifier(Modifier::UNDERLINED);
    }

    // Vertically center within the three-line row.
    let lines = vec![
        Line::default(),
        Line::from(Span::styled(format!(" {text} "), style)),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_separator(f: &mut Frame, area: Rect) {
    let sep = Paragraph::new("─".repeat(area.width as usize))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(sep, area);
}

fn render_vertical_sep(f: &mut Frame, area: Rect) {
    let sep = Paragraph::new(vec![Line::from("│"), Line::from("│"), Line::from("│")])
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(sep, area);
}

/// Centers a `width` x `height` rectangle inside `area`.
pub fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(horizontal[1])[1]
}

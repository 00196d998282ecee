//! Stateless rendering of the series screen.

use super::app::{App, series_message};
use crate::games::tictactoe::{Board, Mark, Position, Square};
use crate::remote::MoveProvider;
use crate::series::{Phase, RoundOutcome, Session, Side};
use crate::storage::{Storage, Theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const HELP: &str =
    "arrows/enter or 1-9: play  n: next round  r: reset  d: difficulty  t: theme  x: dismiss  q: quit";

/// Colors for one theme.
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    player: Color,
    opponent: Color,
    accent: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::White,
                text: Color::Black,
                muted: Color::Gray,
                player: Color::Blue,
                opponent: Color::Red,
                accent: Color::Magenta,
            },
            Theme::Dark => Self {
                background: Color::Black,
                text: Color::White,
                muted: Color::DarkGray,
                player: Color::Cyan,
                opponent: Color::LightRed,
                accent: Color::Yellow,
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }
}

/// Renders the whole screen.
pub fn draw<P: MoveProvider, S: Storage>(frame: &mut Frame, app: &App<P, S>) {
    let driver = app.driver();
    let session = driver.session();
    let palette = Palette::for_theme(driver.theme());
    let area = frame.area();

    frame.render_widget(Block::default().style(palette.base()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(12),   // Board and scores
            Constraint::Length(3), // Notice
            Constraint::Length(3), // Status
            Constraint::Length(1), // Help
        ])
        .split(area);

    let title = Paragraph::new(format!(
        "Gato - best of {} (first to {})",
        session.config().max_rounds(),
        session.config().wins_to_take()
    ))
    .style(palette.base().fg(palette.accent).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(30)])
        .split(chunks[1]);
    draw_board(frame, body[0], session.state().board(), app.cursor(), &palette);
    draw_scoreboard(frame, body[1], session, driver.provider_name(), &palette);

    let notice = session.notice().map(|n| n.message()).unwrap_or("");
    let notice = Paragraph::new(notice)
        .style(palette.base().fg(palette.accent))
        .alignment(Alignment::Center)
        .block(Block::default().title("Notice").borders(Borders::ALL));
    frame.render_widget(notice, chunks[2]);

    let status = Paragraph::new(app.status_message())
        .style(palette.base())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[3]);

    let help = Paragraph::new(HELP)
        .style(palette.base().fg(palette.muted))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);

    if session.phase() == Phase::SeriesOver
        && let Some(outcome) = session.outcome()
    {
        draw_final_popup(frame, area, &series_message(outcome), &palette);
    }
}

fn draw_board(frame: &mut Frame, area: Rect, board: &Board, cursor: Position, palette: &Palette) {
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

    for (row, line) in Position::ALL.chunks(3).enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12),
                Constraint::Length(1),
                Constraint::Length(12),
                Constraint::Length(1),
                Constraint::Length(12),
            ])
            .split(rows[row * 2]);
        for (i, pos) in line.iter().enumerate() {
            draw_cell(frame, cols[i * 2], board, cursor, *pos, palette);
            if i < 2 {
                let sep = Paragraph::new("│").style(palette.base().fg(palette.muted));
                frame.render_widget(sep, cols[i * 2 + 1]);
            }
        }
        if row < 2 {
            let sep = Paragraph::new("─".repeat(38)).style(palette.base().fg(palette.muted));
            frame.render_widget(sep, rows[row * 2 + 1]);
        }
    }
}

fn draw_cell(
    frame: &mut Frame,
    area: Rect,
    board: &Board,
    cursor: Position,
    pos: Position,
    palette: &Palette,
) {
    let (symbol, style) = match board.get(pos) {
        Square::Empty => (
            format!(" {} ", pos.to_index() + 1),
            palette.base().fg(palette.muted),
        ),
        Square::Occupied(Mark::X) => (
            " X ".to_string(),
            palette.base().fg(palette.player).add_modifier(Modifier::BOLD),
        ),
        Square::Occupied(Mark::O) => (
            " O ".to_string(),
            palette.base().fg(palette.opponent).add_modifier(Modifier::BOLD),
        ),
    };
    let style = if pos == cursor {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(symbol, style))).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn draw_scoreboard(
    frame: &mut Frame,
    area: Rect,
    session: &Session,
    provider: &str,
    palette: &Palette,
) {
    let state = session.state();
    let scores = state.scores();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("You (X)  ", palette.base().fg(palette.player)),
            Span::raw(scores.get(Side::Player).to_string()),
        ]),
        Line::from(vec![
            Span::styled("CPU (O)  ", palette.base().fg(palette.opponent)),
            Span::raw(scores.get(Side::Opponent).to_string()),
        ]),
        Line::from(""),
        Line::from(format!(
            "Round {} of {}",
            state.round(),
            session.config().max_rounds()
        )),
        Line::from(format!("Difficulty: {}", session.difficulty())),
        Line::from(format!("CPU: {}", provider)),
        Line::from(format!("Phase: {}", session.phase())),
        Line::from(""),
        Line::from(Span::styled("History", palette.base().add_modifier(Modifier::BOLD))),
    ];
    lines.extend(state.history().iter().map(|entry| {
        let (text, color) = match entry.result {
            RoundOutcome::Player => ("you", palette.player),
            RoundOutcome::Opponent => ("cpu", palette.opponent),
            RoundOutcome::Draw => ("draw", palette.muted),
        };
        Line::from(vec![
            Span::raw(format!("  {}. ", entry.round)),
            Span::styled(text, palette.base().fg(color)),
        ])
    }));

    let panel = Paragraph::new(lines)
        .style(palette.base())
        .block(Block::default().title("Series").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn draw_final_popup(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let popup = center_rect(area, 36, 5);
    frame.render_widget(Clear, popup);
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            message.to_string(),
            palette.base().fg(palette.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from("Press 'r' to play again."),
    ])
    .style(palette.base())
    .alignment(Alignment::Center)
    .block(Block::default().title("Series over").borders(Borders::ALL));
    frame.render_widget(text, popup);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vert[1])[1]
}

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget},
};

use super::{bold, dim, legend, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::app::App;
use crate::session::Phase;

const DIGIT_ROWS: usize = 5;

/// 3x5 block glyphs for the countdown
fn glyph(digit: char) -> [&'static str; DIGIT_ROWS] {
    match digit {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => [" █ ", "██ ", " █ ", " █ ", "███"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        _ => ["   "; DIGIT_ROWS],
    }
}

pub fn big_number(n: u32) -> Vec<String> {
    let digits = n.to_string();
    (0..DIGIT_ROWS)
        .map(|row| digits.chars().map(|d| glyph(d)[row]).join(" "))
        .collect()
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(seq) = app.sequencer() else {
        return;
    };
    let state = seq.state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(3),    // stage
            Constraint::Length(1), // legend
            Constraint::Length(1), // overall progress
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Woord {} van {}", seq.word_number(), seq.total()),
            bold().fg(Color::Gray),
        ),
    ]))
    .render(chunks[0], buf);

    let stage = chunks[1];
    match state.phase {
        Phase::Countdown => render_countdown(state.remaining_seconds, stage, buf),
        Phase::Display => render_word(
            seq.current_word(),
            state.remaining_seconds,
            seq.config().display_duration().seconds(),
            stage,
            buf,
        ),
        Phase::Waiting => render_waiting(stage, buf),
    }

    let hint = match state.phase {
        Phase::Waiting => "(spatie/enter/→) volgend woord / (esc) stoppen",
        _ => "(esc) stoppen",
    };
    Paragraph::new(Span::styled(hint, legend()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
        .ratio(seq.progress().clamp(0.0, 1.0))
        .label("")
        .render(chunks[3], buf);
}

fn centered(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}

fn render_countdown(remaining: u32, area: Rect, buf: &mut Buffer) {
    let style = bold().fg(Color::Yellow);
    let mut lines: Vec<Line> = big_number(remaining)
        .into_iter()
        .map(|row| Line::styled(row, style))
        .collect();
    lines.push(Line::default());
    lines.push(Line::styled("KLAAR...", dim()));

    let height = lines.len() as u16;
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(centered(area, height), buf);
}

fn render_word(word: &str, remaining: u32, duration: u32, area: Rect, buf: &mut Buffer) {
    let block = centered(area, 5);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // seconds left
            Constraint::Length(1), // shrinking bar
            Constraint::Length(1),
            Constraint::Length(1), // the word
            Constraint::Length(1),
        ])
        .split(block);

    Paragraph::new(Span::styled(remaining.to_string(), dim().add_modifier(Modifier::BOLD)))
        .alignment(Alignment::Center)
        .render(rows[0], buf);

    let bar_width = rows[1].width.min(32);
    let bar = Rect {
        x: rows[1].x + (rows[1].width - bar_width) / 2,
        width: bar_width,
        ..rows[1]
    };
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Indexed(63)).bg(Color::DarkGray))
        .ratio(f64::from(remaining) / f64::from(duration.max(1)))
        .label("")
        .render(bar, buf);

    Paragraph::new(Span::styled(
        word.chars().join(" "),
        bold().fg(Color::White),
    ))
    .alignment(Alignment::Center)
    .render(rows[3], buf);
}

fn render_waiting(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::styled("Het woord is verdwenen.", Style::default().fg(Color::Gray)),
        Line::default(),
        Line::styled(
            "[ Volgend Woord → ]",
            bold().fg(Color::Black).bg(Color::Green),
        ),
        Line::default(),
        Line::styled("Druk op Spatie om verder te gaan", dim()),
    ];
    let height = lines.len() as u16;
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(centered(area, height), buf);
}

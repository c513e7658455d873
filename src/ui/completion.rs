use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::{bold, dim, legend, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::app::App;
use crate::review::{HighlightColor, ReviewState};

pub fn render_summary(app: &App, area: Rect, buf: &mut Buffer) {
    let count = app.word_config().map(|c| c.len()).unwrap_or(0);

    let lines = vec![
        Line::styled("★", bold().fg(Color::Yellow)),
        Line::default(),
        Line::styled("Goed gedaan!", bold()),
        Line::default(),
        Line::from(vec![
            Span::raw("Jullie hebben alle "),
            Span::styled(count.to_string(), bold().fg(Color::Indexed(63))),
            Span::raw(" woorden geflitst."),
        ]),
        Line::default(),
        Line::default(),
        Line::styled(
            "(v) woorden nakijken / (r) opnieuw flitsen / (n) nieuwe lijst / (esc) afsluiten",
            legend(),
        ),
    ];

    let height = (lines.len() as u16).min(area.height);
    let inner = Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    };
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

fn palette(review: &ReviewState) -> Line<'static> {
    let mut spans = vec![Span::styled("Kleur: ", bold())];
    for (idx, color) in HighlightColor::ALL.iter().enumerate() {
        let active = *color == review.active_color;
        let mut style = Style::default().fg(Color::Black).bg(color.background());
        if active {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        let label = if active {
            format!("[{} {}]", idx + 1, color)
        } else {
            format!(" {} {} ", idx + 1, color)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Spans for one word with highlights and the cursor applied
fn word_spans(word: &str, word_idx: usize, review: &ReviewState) -> Vec<Span<'static>> {
    word.chars()
        .enumerate()
        .map(|(ch_idx, c)| {
            let mut style = bold();
            if let Some(color) = review.annotations.get(word_idx, ch_idx) {
                style = style.fg(Color::Black).bg(color.background());
            }
            if review.word == word_idx && review.ch == ch_idx {
                style = style.add_modifier(Modifier::UNDERLINED | Modifier::REVERSED);
            }
            Span::styled(c.to_string(), style)
        })
        .collect()
}

/// Column width in cells and column count for the review grid
fn grid_cells(words: &[String], width: u16) -> (usize, usize) {
    let cell_width = words.iter().map(|w| w.width()).max().unwrap_or(1) + 4;
    let columns = (usize::from(width) / cell_width).max(1);
    (cell_width, columns)
}

pub fn render_review(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(config) = app.word_config() else {
        return;
    };
    let words = config.words();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // palette
            Constraint::Length(1),
            Constraint::Min(1), // words
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled("Nakijken", bold()),
        Span::styled(
            format!("  ({} gemarkeerd)", app.review.annotations.count()),
            dim(),
        ),
    ]))
    .render(chunks[0], buf);

    palette(&app.review).render(chunks[1], buf);

    let (cell_width, columns) = grid_cells(words, chunks[3].width);

    let lines: Vec<Line> = words
        .chunks(columns)
        .enumerate()
        .map(|(row, row_words)| {
            let mut spans = Vec::new();
            for (col, word) in row_words.iter().enumerate() {
                let idx = row * columns + col;
                let pad = cell_width.saturating_sub(word.width());
                spans.extend(word_spans(word, idx, &app.review));
                spans.push(Span::raw(" ".repeat(pad)));
            }
            Line::from(spans)
        })
        .collect();

    // keep the cursor row on screen
    let cursor_row = u16::try_from(app.review.word / columns).unwrap_or(u16::MAX);
    let scroll = cursor_row.saturating_sub(chunks[3].height.saturating_sub(1));
    Paragraph::new(lines)
        .scroll((scroll, 0))
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "(←/→/↑/↓) letter kiezen / (1-4) kleur / (spatie) markeren / (b) terug",
        legend(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

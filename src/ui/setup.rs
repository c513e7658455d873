use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::{bold, dim, legend, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::app::App;
use crate::setup::{Notice, SetupField, SetupState};

fn field_style(setup: &SetupState, field: SetupField) -> Style {
    if setup.focus == field {
        bold().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn selector<'a>(label: &'a str, value: String, focused: bool, style: Style) -> Line<'a> {
    let (open, close) = if focused { ("< ", " >") } else { ("  ", "  ") };
    Line::from(vec![
        Span::styled(label, style),
        Span::styled(open, dim()),
        Span::styled(value, style),
        Span::styled(close, dim()),
    ])
}

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let setup = &app.setup;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(1), // group
            Constraint::Length(1), // block
            Constraint::Min(4),    // word editor
            Constraint::Length(1), // speed
            Constraint::Length(1), // topic
            Constraint::Length(1), // start
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(vec![
        Line::styled("Flits", bold().fg(Color::Indexed(63))),
        Line::styled("Oefen de woorden van de week met je klas.", dim()),
    ])
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let group = setup
        .selected_group()
        .map(|g| g.to_string())
        .unwrap_or_else(|| "Selecteer groep...".into());
    selector(
        "1. Groep: ",
        group,
        setup.focus == SetupField::Group,
        field_style(setup, SetupField::Group),
    )
    .render(chunks[1], buf);

    let block = match (setup.selected_group(), setup.selected_block()) {
        (None, _) => "Kies eerst een groep".to_string(),
        (Some(_), None) => "Selecteer blok...".to_string(),
        (Some(_), Some(chapter)) => chapter.title(),
    };
    selector(
        "2. Blok:  ",
        block,
        setup.focus == SetupField::Block,
        field_style(setup, SetupField::Block),
    )
    .render(chunks[2], buf);

    let editing = setup.focus == SetupField::Words;
    let mut text = setup.text.clone();
    if editing {
        text.push('▏');
    }
    let placeholder = text.is_empty();
    Paragraph::new(if placeholder {
        Span::styled(
            "Kies een groep en blok of typ woorden (komma of nieuwe regel)...",
            dim(),
        )
    } else {
        Span::raw(text)
    })
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(field_style(setup, SetupField::Words))
            .title("Woordenlijst voor deze sessie"),
    )
    .render(chunks[3], buf);

    selector(
        "Snelheid: ",
        setup.duration.to_string(),
        setup.focus == SetupField::Speed,
        field_style(setup, SetupField::Speed),
    )
    .render(chunks[4], buf);

    let mut topic = setup.topic.clone();
    if setup.focus == SetupField::Topic {
        topic.push('▏');
    }
    let topic_suffix = if setup.generating { "  (bezig...)" } else { "" };
    Line::from(vec![
        Span::styled("Thema:    ", field_style(setup, SetupField::Topic)),
        Span::raw(topic),
        Span::styled(topic_suffix, dim()),
    ])
    .render(chunks[5], buf);

    let start_style = if setup.focus == SetupField::Start {
        bold().fg(Color::Black).bg(Color::Indexed(63))
    } else {
        bold().fg(Color::Indexed(63))
    };
    Paragraph::new(Span::styled("[ Flitsen! ]", start_style))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    if let Some(notice) = &setup.notice {
        let (text, style) = match notice {
            Notice::Error(msg) => (msg.as_str(), bold().fg(Color::Red)),
            Notice::Info(msg) => (msg.as_str(), Style::default().fg(Color::Cyan)),
        };
        Paragraph::new(Span::styled(text, style))
            .alignment(Alignment::Center)
            .render(chunks[7], buf);
    }

    Paragraph::new(Span::styled(
        "(tab) volgend veld / (←/→) kiezen / (enter) thema genereren / (f5) flitsen / (esc) afsluiten",
        legend().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[8], buf);
}

#[cfg(test)]
mod tests {
    use crate::ui::render_to_string;
    use crate::{
        app::App, config::Config, setup::Notice, suggest::FallbackSuggester,
        word_source::{GroupId, WordBank},
    };
    use std::sync::{mpsc, Arc};

    fn app() -> App {
        let (tx, _rx) = mpsc::channel();
        App::new(
            WordBank::embedded().unwrap(),
            &Config::default(),
            Arc::new(FallbackSuggester),
            tx,
        )
    }

    #[test]
    fn empty_form_shows_placeholders() {
        let screen = render_to_string(&app(), 100, 24);
        assert!(screen.contains("Selecteer groep..."));
        assert!(screen.contains("Kies eerst een groep"));
        assert!(screen.contains("3 sec"));
    }

    #[test]
    fn selected_block_fills_editor() {
        let mut app = app();
        let bank = app.bank.clone();
        app.setup.select_group(&bank, GroupId(4));
        app.setup.select_block(302);

        let screen = render_to_string(&app, 100, 24);
        assert!(screen.contains("Groep 4"));
        assert!(screen.contains("Langermaakwoorden"));
        assert!(screen.contains("hond"));
    }

    #[test]
    fn notice_is_rendered() {
        let mut app = app();
        app.setup.notice = Some(Notice::Error("Geen woorden gevonden.".into()));
        assert!(render_to_string(&app, 100, 24).contains("Geen woorden gevonden."));
    }
}

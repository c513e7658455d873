use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::Config;
use crate::runtime::{DeadlineScheduler, FlitsEvent};
use crate::review::{HighlightColor, ReviewState};
use crate::sequencer::{Sequencer, Step};
use crate::session::WordConfig;
use crate::setup::{Notice, SetupField, SetupState};
use crate::suggest::{spawn_suggestion, WordSuggester};
use crate::word_source::WordBank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Setup,
    Session,
    Finished,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    pub bank: WordBank,
    pub setup: SetupState,
    pub state: AppState,
    pub review: ReviewState,
    config: Option<WordConfig>,
    sequencer: Option<Sequencer<DeadlineScheduler>>,
    suggester: Arc<dyn WordSuggester>,
    suggestion_count: usize,
    events: Sender<FlitsEvent>,
}

impl App {
    pub fn new(
        bank: WordBank,
        settings: &Config,
        suggester: Arc<dyn WordSuggester>,
        events: Sender<FlitsEvent>,
    ) -> Self {
        let setup = SetupState::new(&bank, settings.display_duration);
        Self {
            bank,
            setup,
            state: AppState::Setup,
            review: ReviewState::new(),
            config: None,
            sequencer: None,
            suggester,
            suggestion_count: settings.suggestion_count,
            events,
        }
    }

    pub fn sequencer(&self) -> Option<&Sequencer<DeadlineScheduler>> {
        self.sequencer.as_ref()
    }

    /// Config of the last started session
    pub fn word_config(&self) -> Option<&WordConfig> {
        self.config.as_ref()
    }

    /// Commit the setup form and start flashing
    pub fn start_session(&mut self) -> bool {
        match self.setup.build() {
            Ok(config) => {
                self.setup.notice = None;
                self.launch(config);
                true
            }
            Err(err) => {
                tracing::info!("refusing to start: {err}");
                self.setup.notice = Some(Notice::Error(err.to_string()));
                false
            }
        }
    }

    /// Run the last config again
    pub fn restart(&mut self) {
        if let Some(config) = self.config.clone() {
            self.launch(config);
        }
    }

    fn launch(&mut self, config: WordConfig) {
        tracing::info!(
            words = config.len(),
            duration = config.display_duration().seconds(),
            "starting flash session"
        );
        if let Some(old) = self.sequencer.as_mut() {
            old.exit();
        }
        self.review = ReviewState::new();
        self.sequencer = Some(Sequencer::start(config.clone(), DeadlineScheduler::new()));
        self.config = Some(config);
        self.state = AppState::Session;
    }

    pub fn exit_session(&mut self) {
        if let Some(seq) = self.sequencer.as_mut() {
            seq.exit();
        }
        self.sequencer = None;
        self.state = AppState::Setup;
    }

    pub fn advance(&mut self) -> Step {
        let Some(seq) = self.sequencer.as_mut() else {
            return Step::Ignored;
        };
        let step = seq.advance();
        if step == Step::Completed {
            self.sequencer = None;
            self.state = AppState::Finished;
        }
        step
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.sequencer.as_ref().and_then(|s| s.next_deadline())
    }

    /// Feed due ticks into the running session
    pub fn poll_timers(&mut self, now: Instant) -> Vec<Step> {
        match self.sequencer.as_mut() {
            Some(seq) => seq.poll_due(now),
            None => Vec::new(),
        }
    }

    pub fn request_suggestions(&mut self) {
        let topic = self.setup.topic.trim().to_string();
        if topic.is_empty() {
            self.setup.notice = Some(Notice::Error("Vul eerst een thema in.".into()));
            return;
        }
        if self.setup.generating {
            return;
        }
        self.setup.generating = true;
        self.setup.notice = Some(Notice::Info(format!("Woorden over \"{topic}\" genereren...")));
        spawn_suggestion(
            Arc::clone(&self.suggester),
            topic,
            self.suggestion_count,
            self.events.clone(),
        );
    }

    pub fn handle_event(&mut self, event: FlitsEvent) -> Control {
        match event {
            FlitsEvent::Key(key) => self.on_key(key),
            FlitsEvent::Suggestions(result) => {
                self.setup.generating = false;
                if self.state != AppState::Setup {
                    tracing::info!("dropping word suggestions that arrived after setup was left");
                    self.setup.notice = None;
                    return Control::Continue;
                }
                match result {
                    Ok(words) if !words.is_empty() => self.setup.apply_suggestions(&words),
                    Ok(_) => {
                        self.setup.notice = Some(Notice::Error(
                            "Geen woorden ontvangen. Probeer een ander thema.".into(),
                        ))
                    }
                    Err(err) => self.setup.notice = Some(Notice::Error(err.user_message().into())),
                }
                Control::Continue
            }
            FlitsEvent::Tick | FlitsEvent::Resize => Control::Continue,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.exit_session();
            return Control::Quit;
        }

        match self.state {
            AppState::Setup => return self.on_setup_key(key),
            AppState::Session => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Right => {
                    self.advance();
                }
                KeyCode::Esc | KeyCode::Char('q') => self.exit_session(),
                _ => {}
            },
            AppState::Finished => match key.code {
                KeyCode::Char('v') => self.state = AppState::Review,
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('n') => self.state = AppState::Setup,
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
            AppState::Review => self.on_review_key(key),
        }
        Control::Continue
    }

    fn on_setup_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Tab => self.setup.focus_next(),
            KeyCode::BackTab => self.setup.focus_prev(),
            KeyCode::F(5) => {
                self.start_session();
            }
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                match self.setup.focus {
                    SetupField::Group => self.setup.cycle_group(&self.bank, forward),
                    SetupField::Block => self.setup.cycle_block(forward),
                    SetupField::Speed => {
                        self.setup.duration = if forward {
                            self.setup.duration.slower()
                        } else {
                            self.setup.duration.faster()
                        }
                    }
                    _ => {}
                }
            }
            KeyCode::Up if !self.setup.focus.is_text() => self.setup.focus_prev(),
            KeyCode::Down if !self.setup.focus.is_text() => self.setup.focus_next(),
            KeyCode::Enter => match self.setup.focus {
                SetupField::Words => self.setup.insert_char('\n'),
                SetupField::Topic => self.request_suggestions(),
                SetupField::Start => {
                    self.start_session();
                }
                _ => self.setup.focus_next(),
            },
            KeyCode::Backspace => self.setup.backspace(),
            KeyCode::Char(c) => self.setup.insert_char(c),
            _ => {}
        }
        Control::Continue
    }

    fn on_review_key(&mut self, key: KeyEvent) {
        let Some(config) = self.config.as_ref() else {
            self.state = AppState::Finished;
            return;
        };
        let words = config.words();

        match key.code {
            KeyCode::Right => self.review.next_char(words),
            KeyCode::Left => self.review.prev_char(words),
            KeyCode::Down => self.review.next_word(words),
            KeyCode::Up => self.review.prev_word(words),
            KeyCode::Char(' ') | KeyCode::Enter => self.review.toggle_at_cursor(),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(color) = HighlightColor::from_digit(c) {
                    self.review.active_color = color;
                }
            }
            KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Esc => {
                self.state = AppState::Finished;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DisplayDuration, Phase};
    use crate::suggest::FallbackSuggester;
    use crate::word_source::GroupId;
    use std::sync::mpsc;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (App, mpsc::Receiver<FlitsEvent>) {
        let (tx, rx) = mpsc::channel();
        let app = App::new(
            WordBank::embedded().unwrap(),
            &Config::default(),
            Arc::new(FallbackSuggester),
            tx,
        );
        (app, rx)
    }

    /// Push the running word through Countdown and Display
    fn run_to_waiting(app: &mut App) {
        while app.sequencer().unwrap().state().phase != Phase::Waiting {
            let deadline = app.next_deadline().unwrap();
            app.poll_timers(deadline);
        }
    }

    #[test]
    fn start_with_empty_text_shows_notice() {
        let (mut app, _rx) = app();
        assert!(!app.start_session());
        assert_eq!(app.state, AppState::Setup);
        assert!(matches!(app.setup.notice, Some(Notice::Error(_))));
    }

    #[test]
    fn session_runs_to_finished() {
        let (mut app, _rx) = app();
        app.setup.set_text("vis\naap");
        assert!(app.start_session());

        run_to_waiting(&mut app);
        assert_eq!(app.advance(), Step::Entered(Phase::Countdown));
        run_to_waiting(&mut app);
        assert_eq!(app.advance(), Step::Completed);

        assert_eq!(app.state, AppState::Finished);
        assert!(app.sequencer().is_none());
        assert_eq!(app.next_deadline(), None);
    }

    #[test]
    fn advance_keys_ignored_outside_waiting() {
        let (mut app, _rx) = app();
        app.setup.set_text("vis");
        app.start_session();

        app.on_key(key(KeyCode::Char(' ')));
        assert_eq!(app.state, AppState::Session);
        assert_eq!(app.sequencer().unwrap().state().phase, Phase::Countdown);
    }

    #[test]
    fn escape_during_session_returns_to_setup() {
        let (mut app, _rx) = app();
        app.setup.set_text("vis\naap");
        app.start_session();
        let deadline = app.next_deadline().unwrap();

        assert_eq!(app.on_key(key(KeyCode::Esc)), Control::Continue);
        assert_eq!(app.state, AppState::Setup);
        assert!(app.poll_timers(deadline + Duration::from_secs(10)).is_empty());
        // editor text survives for another try
        assert_eq!(app.setup.text, "vis\naap");
    }

    #[test]
    fn finished_screen_actions() {
        let (mut app, _rx) = app();
        app.setup.set_text("noot");
        app.start_session();
        run_to_waiting(&mut app);
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Finished);

        app.on_key(key(KeyCode::Char('v')));
        assert_eq!(app.state, AppState::Review);
        app.on_key(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Finished);

        app.on_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Session);
        assert_eq!(app.word_config().unwrap().words(), ["noot"]);
    }

    #[test]
    fn review_keys_toggle_highlights() {
        let (mut app, _rx) = app();
        app.setup.set_text("vis");
        app.start_session();
        run_to_waiting(&mut app);
        app.advance();
        app.on_key(key(KeyCode::Char('v')));

        app.on_key(key(KeyCode::Right));
        app.on_key(key(KeyCode::Char('3')));
        app.on_key(key(KeyCode::Char(' ')));
        assert_eq!(app.review.annotations.get(0, 1), Some(HighlightColor::Pink));

        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.review.annotations.get(0, 1), None);
    }

    #[test]
    fn restart_clears_review_marks() {
        let (mut app, _rx) = app();
        app.setup.set_text("vis");
        app.start_session();
        run_to_waiting(&mut app);
        app.advance();
        app.review.toggle_at_cursor();

        app.restart();
        assert_eq!(app.review.annotations.count(), 0);
    }

    #[test]
    fn setup_keys_pick_block_and_speed() {
        let (mut app, _rx) = app();
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.setup.selected_group(), Some(GroupId(3)));

        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.setup.text, "ik\nmaan\nvis\nroos\nsok");

        app.setup.focus = SetupField::Speed;
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.setup.duration, DisplayDuration::Five);

        app.on_key(key(KeyCode::F(5)));
        assert_eq!(app.state, AppState::Session);
        assert_eq!(app.word_config().unwrap().len(), 5);
    }

    #[test]
    fn ctrl_c_quits_from_session() {
        let (mut app, _rx) = app();
        app.setup.set_text("vis");
        app.start_session();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(app.on_key(ctrl_c), Control::Quit);
        assert!(app.sequencer().is_none());
    }

    #[test]
    fn suggestions_round_trip_through_events() {
        let (mut app, rx) = app();
        app.setup.focus = SetupField::Topic;
        for c in "dieren".chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
        app.on_key(key(KeyCode::Enter));
        assert!(app.setup.generating);

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.handle_event(event);
        assert!(!app.setup.generating);
        assert_eq!(app.setup.text, "vis\naap\nnoot\nmies\nvuur");
    }

    #[test]
    fn suggestion_failure_keeps_text() {
        let (mut app, _rx) = app();
        app.setup.set_text("hond");
        app.handle_event(FlitsEvent::Suggestions(Err(
            crate::error::SuggestError::Status(500),
        )));

        assert_eq!(app.setup.text, "hond");
        assert!(matches!(
            app.setup.notice,
            Some(Notice::Error(ref msg)) if msg.starts_with("Kon geen woorden")
        ));
    }

    #[test]
    fn late_suggestions_do_not_replace_started_list() {
        let (mut app, rx) = app();
        app.setup.focus = SetupField::Topic;
        for c in "dieren".chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
        app.on_key(key(KeyCode::Enter));
        app.setup.set_text("hond\nkat");
        assert!(app.start_session());

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.handle_event(event);
        app.exit_session();

        assert_eq!(app.state, AppState::Setup);
        assert_eq!(app.setup.text, "hond\nkat");
        assert!(!app.setup.generating);
        assert_eq!(app.setup.notice, None);
    }

    #[test]
    fn empty_topic_is_refused() {
        let (mut app, _rx) = app();
        app.request_suggestions();
        assert!(!app.setup.generating);
        assert!(matches!(app.setup.notice, Some(Notice::Error(_))));
    }
}

// Per-word phase sequencing for a flash session.
//
// Every word runs Countdown -> Display -> Waiting. The first two phases
// count down in one-second ticks and move on by themselves; Waiting only
// ends on an explicit advance. At most one tick is pending at any time and
// every phase change cancels it first, so a stale tick can never touch the
// next word or a torn-down session.

use std::time::{Duration, Instant};

use crate::runtime::{DeadlineScheduler, Scheduler, TimerId};
use crate::session::{Phase, SessionState, WordConfig, COUNTDOWN_SECONDS};

const TICK: Duration = Duration::from_secs(1);

/// Outcome of feeding a timer expiry or an advance into the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Stale timer, wrong phase, or finished sequencer
    Ignored,
    /// Counter decremented and still above zero
    Counted(u32),
    /// A new phase was entered (counter reset to its start value)
    Entered(Phase),
    /// Last word advanced; reported exactly once
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Completed,
    Exited,
}

#[derive(Debug)]
pub struct Sequencer<S: Scheduler> {
    config: WordConfig,
    state: SessionState,
    status: Status,
    pending: Option<TimerId>,
    scheduler: S,
}

impl<S: Scheduler> Sequencer<S> {
    /// Enter Countdown for the first word and arm its first tick
    pub fn start(config: WordConfig, scheduler: S) -> Self {
        let mut sequencer = Self {
            config,
            state: SessionState::default(),
            status: Status::Running,
            pending: None,
            scheduler,
        };
        sequencer.enter(Phase::Countdown);
        sequencer
    }

    pub fn on_timer(&mut self, id: TimerId) -> Step {
        if self.status != Status::Running || self.pending != Some(id) {
            return Step::Ignored;
        }
        self.pending = None;

        let next = match self.state.phase {
            Phase::Countdown => Phase::Display,
            Phase::Display => Phase::Waiting,
            Phase::Waiting => return Step::Ignored,
        };

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            self.enter(next);
            Step::Entered(next)
        } else {
            self.arm();
            Step::Counted(self.state.remaining_seconds)
        }
    }

    /// Move on to the next word. Only honored while waiting.
    pub fn advance(&mut self) -> Step {
        if self.status != Status::Running || self.state.phase != Phase::Waiting {
            return Step::Ignored;
        }

        if self.state.current_word_index + 1 >= self.config.len() {
            self.disarm();
            self.status = Status::Completed;
            tracing::info!(words = self.config.len(), "flash session completed");
            return Step::Completed;
        }

        self.state.current_word_index += 1;
        self.enter(Phase::Countdown);
        Step::Entered(Phase::Countdown)
    }

    /// Abort from any state. Never reports completion.
    pub fn exit(&mut self) {
        if self.status != Status::Running {
            return;
        }
        self.disarm();
        self.status = Status::Exited;
        tracing::info!(
            word = self.state.current_word_index + 1,
            total = self.config.len(),
            "flash session exited"
        );
    }

    /// Fraction of words fully started before the current one
    pub fn progress(&self) -> f64 {
        match self.status {
            Status::Completed => 1.0,
            _ => self.state.current_word_index as f64 / self.config.len() as f64,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != Status::Running
    }

    pub fn config(&self) -> &WordConfig {
        &self.config
    }

    pub fn current_word(&self) -> &str {
        &self.config.words()[self.state.current_word_index]
    }

    /// 1-based position for display
    pub fn word_number(&self) -> usize {
        self.state.current_word_index + 1
    }

    pub fn total(&self) -> usize {
        self.config.len()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending
    }

    fn enter(&mut self, phase: Phase) {
        self.disarm();
        self.state.phase = phase;
        match phase {
            Phase::Countdown => {
                self.state.remaining_seconds = COUNTDOWN_SECONDS;
                self.arm();
            }
            Phase::Display => {
                self.state.remaining_seconds = self.config.display_duration().seconds();
                self.arm();
            }
            Phase::Waiting => {}
        }
        tracing::debug!(
            word = self.state.current_word_index,
            phase = %phase,
            remaining = self.state.remaining_seconds,
            "entered phase"
        );
    }

    fn arm(&mut self) {
        self.disarm();
        self.pending = Some(self.scheduler.schedule(TICK));
    }

    fn disarm(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl Sequencer<DeadlineScheduler> {
    /// Deliver every timer due at `now`
    pub fn poll_due(&mut self, now: Instant) -> Vec<Step> {
        self.scheduler
            .take_due(now)
            .into_iter()
            .map(|id| self.on_timer(id))
            .filter(|step| *step != Step::Ignored)
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DisplayDuration;
    use assert_matches::assert_matches;

    fn config(words: &[&str], duration: DisplayDuration) -> WordConfig {
        WordConfig::new(words.iter().map(|w| w.to_string()).collect(), duration).unwrap()
    }

    fn fire(seq: &mut Sequencer<DeadlineScheduler>) -> Step {
        let id = seq.pending_timer().expect("a tick should be pending");
        seq.on_timer(id)
    }

    #[test]
    fn start_arms_single_countdown_tick() {
        let seq = Sequencer::start(config(&["vis"], DisplayDuration::Two), DeadlineScheduler::new());

        assert_eq!(seq.state().phase, Phase::Countdown);
        assert_eq!(seq.state().remaining_seconds, COUNTDOWN_SECONDS);
        assert_eq!(seq.scheduler().pending_count(), 1);
        assert_eq!(seq.progress(), 0.0);
    }

    #[test]
    fn countdown_reaching_zero_enters_display_at_duration() {
        let mut seq =
            Sequencer::start(config(&["vis"], DisplayDuration::Five), DeadlineScheduler::new());

        assert_eq!(fire(&mut seq), Step::Counted(2));
        assert_eq!(fire(&mut seq), Step::Counted(1));
        assert_eq!(fire(&mut seq), Step::Entered(Phase::Display));
        assert_eq!(seq.state().remaining_seconds, 5);
        assert_eq!(seq.scheduler().pending_count(), 1);
    }

    #[test]
    fn waiting_has_no_pending_tick() {
        let mut seq =
            Sequencer::start(config(&["vis"], DisplayDuration::One), DeadlineScheduler::new());
        for _ in 0..3 {
            fire(&mut seq);
        }
        assert_eq!(fire(&mut seq), Step::Entered(Phase::Waiting));
        assert_eq!(seq.pending_timer(), None);
        assert_eq!(seq.scheduler().pending_count(), 0);
    }

    #[test]
    fn advance_outside_waiting_is_ignored() {
        let mut seq = Sequencer::start(
            config(&["vis", "aap"], DisplayDuration::One),
            DeadlineScheduler::new(),
        );
        assert_eq!(seq.advance(), Step::Ignored);
        for _ in 0..3 {
            fire(&mut seq);
        }
        assert_eq!(seq.state().phase, Phase::Display);
        assert_eq!(seq.advance(), Step::Ignored);
        assert_eq!(seq.state().current_word_index, 0);
    }

    #[test]
    fn stale_timer_id_is_ignored() {
        let mut seq =
            Sequencer::start(config(&["vis"], DisplayDuration::One), DeadlineScheduler::new());
        let first = seq.pending_timer().unwrap();
        assert_eq!(seq.on_timer(first), Step::Counted(2));

        // the same id again must not count twice
        assert_eq!(seq.on_timer(first), Step::Ignored);
        assert_eq!(seq.state().remaining_seconds, 2);
    }

    #[test]
    fn exit_cancels_pending_tick() {
        let mut seq =
            Sequencer::start(config(&["vis"], DisplayDuration::Three), DeadlineScheduler::new());
        let pending = seq.pending_timer().unwrap();
        seq.exit();

        assert_eq!(seq.status(), Status::Exited);
        assert_eq!(seq.scheduler().pending_count(), 0);
        assert_eq!(seq.on_timer(pending), Step::Ignored);
        assert_eq!(seq.advance(), Step::Ignored);
    }

    #[test]
    fn completion_reported_once() {
        let mut seq =
            Sequencer::start(config(&["noot"], DisplayDuration::One), DeadlineScheduler::new());
        for _ in 0..4 {
            fire(&mut seq);
        }
        assert_matches!(seq.advance(), Step::Completed);
        assert_eq!(seq.progress(), 1.0);
        assert_eq!(seq.advance(), Step::Ignored);

        // exit after completion keeps the completed status
        seq.exit();
        assert_eq!(seq.status(), Status::Completed);
    }

    #[test]
    fn poll_due_delivers_elapsed_tick() {
        let mut seq =
            Sequencer::start(config(&["vis"], DisplayDuration::One), DeadlineScheduler::new());
        let deadline = seq.next_deadline().unwrap();

        assert!(seq.poll_due(deadline - Duration::from_millis(500)).is_empty());
        assert_eq!(seq.poll_due(deadline), vec![Step::Counted(2)]);
        // the next tick is a fresh second away
        assert!(seq.next_deadline().unwrap() > deadline);
    }

    #[test]
    fn word_number_is_one_based() {
        let seq = Sequencer::start(
            config(&["vis", "aap"], DisplayDuration::One),
            DeadlineScheduler::new(),
        );
        assert_eq!(seq.word_number(), 1);
        assert_eq!(seq.total(), 2);
        assert_eq!(seq.current_word(), "vis");
    }
}

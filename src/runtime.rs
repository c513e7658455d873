use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::error::SuggestError;

/// Unified event type consumed by the app runner
#[derive(Debug)]
pub enum FlitsEvent {
    Key(KeyEvent),
    Resize,
    /// Redraw tick; carries no session semantics
    Tick,
    /// Result of a background word suggestion request
    Suggestions(Result<Vec<String>, SuggestError>),
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait FlitsEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<FlitsEvent, RecvTimeoutError>;

    /// Sender for producers other than the terminal (background workers)
    fn sender(&self) -> Sender<FlitsEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<FlitsEvent>,
    rx: Receiver<FlitsEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if reader_tx.send(FlitsEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if reader_tx.send(FlitsEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!("terminal event reader stopped: {err}");
                    break;
                }
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FlitsEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<FlitsEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<FlitsEvent> {
        self.tx.clone()
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    tx: Sender<FlitsEvent>,
    rx: Receiver<FlitsEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FlitsEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<FlitsEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<FlitsEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Schedule a wake-up after a delay, cancelable by id
pub trait Scheduler {
    fn schedule(&mut self, after: Duration) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}

/// Deadline bookkeeping polled by the runner loop
#[derive(Debug, Default)]
pub struct DeadlineScheduler {
    next_id: u64,
    pending: Vec<(TimerId, Instant)>,
}

impl DeadlineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, deadline: Instant) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push((id, deadline));
        id
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, at)| *at).min()
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due: Vec<(TimerId, Instant)> = Vec::new();
        self.pending.retain(|&(id, at)| {
            if at <= now {
                due.push((id, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(id, at)| (at, id));
        due.into_iter().map(|(id, _)| id).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for DeadlineScheduler {
    fn schedule(&mut self, after: Duration) -> TimerId {
        self.schedule_at(Instant::now() + after)
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(pending, _)| *pending != id);
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: FlitsEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: FlitsEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn sender(&self) -> Sender<FlitsEvent> {
        self.event_source.sender()
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> FlitsEvent {
        self.step_until(None)
    }

    /// Like `step`, but wakes no later than `deadline` so due timers are not late
    pub fn step_until(&self, deadline: Option<Instant>) -> FlitsEvent {
        let mut timeout = self.ticker.interval();
        if let Some(deadline) = deadline {
            timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
        }

        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => FlitsEvent::Tick,
        }
    }
}

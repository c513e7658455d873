// Library surface for headless/integration tests and the binary.
pub mod app;
pub mod app_dirs;
pub mod builder;
pub mod config;
pub mod error;
pub mod logging;
pub mod review;
pub mod runtime;
pub mod sequencer;
pub mod session;
pub mod setup;
pub mod suggest;
pub mod ui;
pub mod word_source;

/// Redraw cadence of the event loop; session ticks are scheduled separately
pub const TICK_RATE_MS: u64 = 100;

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "FLITS_LOG";
const DEFAULT_FILTER: &str = "flits=info";

pub fn env_filter() -> EnvFilter {
    EnvFilter::new(std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.into()))
}

/// Log to a file; the terminal belongs to the TUI.
/// Returns false when the file could not be opened and logging stays off.
pub fn init_file_logging(path: &Path) -> bool {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .is_ok()
}

/// Plain stderr logging for the non-interactive modes
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

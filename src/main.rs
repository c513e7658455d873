use std::{
    fs,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{bail, Context};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use flits::{
    app::{App, Control},
    app_dirs::AppDirs,
    builder::build_config,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, FlitsEventSource, Runner, Ticker},
    session::DisplayDuration,
    suggest::suggester_from_config,
    word_source::{GroupId, WordBank, WordSource},
    TICK_RATE_MS,
};

/// classroom flash-card tui
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Show a list of words one at a time to a class. Each word gets a short countdown, stays visible for a fixed time and then waits for a key press before the next one."
)]
pub struct Cli {
    /// words to flash, separated by commas or newlines
    #[clap(short = 'w', long)]
    words: Option<String>,

    /// read the word list from a file
    #[clap(short = 'f', long, conflicts_with = "words")]
    file: Option<PathBuf>,

    /// seconds each word stays visible
    #[clap(short = 'd', long, value_enum)]
    duration: Option<DisplayDuration>,

    /// preselect a word bank group (school year)
    #[clap(short = 'g', long)]
    group: Option<u8>,

    /// preselect a block of the group by id (see --list)
    #[clap(short = 'b', long, requires = "group")]
    block: Option<u32>,

    /// skip the setup screen and start flashing right away
    #[clap(long)]
    start: bool,

    /// print the built-in word bank and exit
    #[clap(long)]
    list: bool,

    /// write the default config file if there is none and print its path
    #[clap(long)]
    init_config: bool,
}

/// Setup values resolved from the command line before the terminal is taken over
#[derive(Debug, Clone, PartialEq)]
struct Prefill {
    duration: DisplayDuration,
    group: Option<GroupId>,
    block: Option<u32>,
    text: Option<String>,
    start: bool,
}

fn prefill(cli: &Cli, bank: &WordBank, settings: &Config) -> anyhow::Result<Prefill> {
    let duration = cli.duration.unwrap_or(settings.display_duration);

    let group = cli.group.map(GroupId);
    if let Some(group) = group {
        if !bank.list_groups().contains(&group) {
            bail!("unknown group {}; see --list", group.0);
        }
    }

    if let (Some(group), Some(block)) = (group, cli.block) {
        if bank.find_block(group, block).is_none() {
            bail!("unknown block {block} in {group}; see --list");
        }
    }

    let text = match (&cli.words, &cli.file) {
        (Some(words), _) => Some(words.clone()),
        (None, Some(path)) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("unable to read word list {}", path.display()))?,
        ),
        (None, None) => None,
    };

    if cli.start {
        let words = match (&text, group, cli.block) {
            (Some(text), _, _) => text.clone(),
            (None, Some(group), Some(block)) => bank
                .find_block(group, block)
                .map(|b| b.words.join("\n"))
                .unwrap_or_default(),
            _ => String::new(),
        };
        build_config(&words, duration).context("--start needs words")?;
    }

    Ok(Prefill {
        duration,
        group,
        block: cli.block,
        text,
        start: cli.start,
    })
}

fn apply_prefill(app: &mut App, prefill: &Prefill) {
    app.setup.duration = prefill.duration;
    if let Some(group) = prefill.group {
        app.setup.select_group(&app.bank, group);
        if let Some(block) = prefill.block {
            app.setup.select_block(block);
        }
    }
    if let Some(text) = &prefill.text {
        app.setup.set_text(text.clone());
    }
    if prefill.start {
        app.start_session();
    }
}

fn init_config(store: &FileConfigStore) -> anyhow::Result<()> {
    if !store.path().exists() {
        store
            .save(&Config::default())
            .with_context(|| format!("unable to write {}", store.path().display()))?;
        tracing::info!(path = %store.path().display(), "wrote default config");
    }
    println!("{}", store.path().display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = FileConfigStore::new();

    if cli.list || cli.init_config {
        logging::init_stderr_logging();
        if cli.init_config {
            init_config(&store)?;
        }
        if cli.list {
            println!("{}", WordBank::embedded()?.render_listing());
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        logging::init_file_logging(&path);
    }

    let settings = store.load();
    let bank = WordBank::embedded()?;
    let prefill = prefill(&cli, &bank, &settings)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut app = App::new(
        bank,
        &settings,
        suggester_from_config(&settings.gemini),
        runner.sender(),
    );
    apply_prefill(&mut app, &prefill);

    let result = start_tui(&mut terminal, &runner, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: FlitsEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    runner: &Runner<E, T>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step_until(app.next_deadline());
        if app.handle_event(event) == Control::Quit {
            break;
        }
        app.poll_timers(Instant::now());
    }

    Ok(())
}

use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::{Config, LevelFilter, WriteLogger};

use snake::config::GameConfig;
use snake::input::InputHandler;
use snake::session::Session;
use snake::store::{HighScore, JsonFileStore, KeyValueStore, MemoryStore};
use snake::term::{TermManager, TermPresenter};

/// Longest the loop sleeps waiting for input when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "snake")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// JSON file overriding canvas size, cell size or speed
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the high score is kept
    #[arg(long, default_value = "snake_store.json")]
    store: PathBuf,

    /// Log file; the terminal itself is busy drawing the game
    #[arg(long, default_value = "snake.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    /// Seed for food placement, for reproducible rounds
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        cli.log_level.into(),
        Config::default(),
        File::create(&cli.log_file).with_context(|| format!("Failed to create log file {:?}", cli.log_file))?,
    )
    .context("Failed to initialize logger")?;

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    log::info!("Starting snake with {:?}", config);

    let store: Box<dyn KeyValueStore> = match JsonFileStore::open(&cli.store) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::error!("Error loading high score store, scores won't be kept: {}", e);
            Box::new(MemoryStore::new())
        }
    };
    let high_score = HighScore::load(store);

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut presenter =
        TermPresenter::new(TermManager::new()?, config.grid_width(), config.grid_height(), config.grid_size)?;
    presenter.term_mut().setup()?;

    let mut session = Session::new(config, high_score, rng, presenter);
    let result = run(&mut session);

    // Hand the terminal back whether or not the loop failed
    let restored = session.presenter_mut().term_mut().restore();
    log::info!("Exiting");
    result.and(restored)
}

fn run(session: &mut Session<TermPresenter>) -> Result<()> {
    let mut input = InputHandler::new();

    loop {
        input.set_buttons(session.presenter().buttons().to_vec());

        let now = Instant::now();
        let wait = session.ticker().time_until_next(now).map_or(IDLE_POLL, |d| d.min(IDLE_POLL));

        for event in session.presenter().term().read_events(wait)? {
            let command = input.handle_event(&event);
            if !session.handle(command, Instant::now()) {
                return Ok(());
            }
        }

        session.update(Instant::now());

        if let Some(e) = session.presenter_mut().take_error() {
            return Err(e).context("Error drawing to terminal");
        }
    }
}

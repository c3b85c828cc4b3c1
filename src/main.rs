pub mod ui;

use chrono::prelude::*;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use directories::ProjectDirs;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin, Write},
    path::PathBuf,
    time::{Duration, Instant},
};
use watr::{
    config::{ConfigStore, FileConfigStore},
    planner,
    runner::{CueEvent, Phase, SessionRunner, TickReport},
    runtime::{AppEvent, CrosstermEventSource, EventPump},
    store::{StoreError, WordStore},
};

const TICK_RATE_MS: u64 = 16;

/// fullscreen word association trainer with timed sessions
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Presents one word at a time on a fullscreen countdown, remembers which words \
                  have already been shown across runs, and cycles back to the start once the \
                  whole set is spent."
)]
pub struct Cli {
    /// path to the word table (defaults to the app state directory)
    #[clap(short = 'c', long)]
    csv: Option<PathBuf>,

    /// seconds each word stays on screen
    #[clap(short = 'd', long)]
    duration: Option<u64>,

    /// maximum number of words per session
    #[clap(short = 'n', long = "session-size")]
    session_size: Option<usize>,

    /// clear every shown flag and exit
    #[clap(long)]
    reset: bool,

    /// overwrite the word table with the built-in default set and exit
    #[clap(long)]
    reseed: bool,

    /// print shown/total progress and exit
    #[clap(long)]
    progress: bool,
}

/// Which full-screen view the presentation layer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Word,
    Complete,
    NoWords,
}

/// What the control loop should do after one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Redraw,
    Idle,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub store: WordStore,
    pub runner: SessionRunner,
    pub now: Instant,
    pub status: Option<String>,
}

impl App {
    pub fn new(
        mut store: WordStore,
        session_size: usize,
        word_duration: Duration,
    ) -> Result<Self, StoreError> {
        let queue = planner::build_session(&mut store, session_size)?;
        let runner = SessionRunner::new(queue, word_duration, session_size);
        let status = match store.skipped_rows() {
            0 => None,
            n => Some(format!(
                "skipped {n} malformed row(s) in {}",
                store.path().display()
            )),
        };
        Ok(Self {
            store,
            runner,
            now: Instant::now(),
            status,
        })
    }

    pub fn screen(&self) -> Screen {
        match self.runner.phase() {
            Phase::Running | Phase::Paused => Screen::Word,
            Phase::Idle => {
                if self.runner.last_completed().is_some() {
                    Screen::Complete
                } else if self.runner.queue().is_empty() {
                    Screen::NoWords
                } else {
                    Screen::Welcome
                }
            }
        }
    }

    /// Applies one pumped event at `now` and says whether to redraw or quit.
    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> EventOutcome {
        self.now = now;
        match event {
            AppEvent::Tick => {
                let report = self.runner.tick(now, &mut self.store);
                let had_cues = !report.cues.is_empty();
                self.absorb(report);

                // Redraw every tick while the countdown is visible, and once
                // more when a transition just fired.
                if had_cues || self.runner.phase() == Phase::Running {
                    EventOutcome::Redraw
                } else {
                    EventOutcome::Idle
                }
            }
            AppEvent::Resize => EventOutcome::Redraw,
            AppEvent::Key(key) => {
                match key.code {
                    KeyCode::Esc => return EventOutcome::Quit,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return EventOutcome::Quit
                    }
                    KeyCode::Enter => {
                        if self.runner.start(now).is_some() {
                            ring_bell();
                        }
                    }
                    KeyCode::Char(' ') => {
                        if self.runner.toggle_suspend(now).is_some() {
                            ring_bell();
                        }
                    }
                    _ => {}
                }
                EventOutcome::Redraw
            }
        }
    }

    /// Folds a tick outcome into the app: cues become audible, persistence
    /// failures become a status line, never a crash. A cue that persisted
    /// cleanly retires whatever notice was on screen, so a transient write
    /// failure doesn't outlive the word it happened on.
    fn absorb(&mut self, report: TickReport) {
        if !report.cues.is_empty() && report.persist_error.is_none() {
            self.status = None;
        }
        for cue in &report.cues {
            ring_bell();
            if *cue == CueEvent::SessionCompleted {
                if let Err(e) = self.log_completion() {
                    self.status = Some(format!("could not write session log: {e}"));
                }
            }
        }
        if let Some(err) = report.persist_error {
            self.status = Some(format!("progress not saved: {err}"));
        }
    }

    fn log_completion(&self) -> io::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "watr") {
            let config_dir = proj_dirs.config_dir();
            let log_path = config_dir.join("log.csv");

            fs::create_dir_all(config_dir)?;

            // If the log file doesn't exist, we need to emit a header
            let needs_header = !log_path.exists();

            let mut log_file = fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(log_path)?;

            if needs_header {
                writeln!(
                    log_file,
                    "date,words_completed,word_duration_secs,shown,total"
                )?;
            }

            writeln!(
                log_file,
                "{},{},{},{},{}",
                Local::now().format("%c"),
                self.runner.last_completed().unwrap_or(0),
                self.runner.word_duration().as_secs(),
                self.store.count_shown(),
                self.store.count_total(),
            )?;
        }

        Ok(())
    }
}

/// Single audible cue for every transition, the terminal analogue of the
/// original bell.
fn ring_bell() {
    print!("\x07");
    let _ = io::stdout().flush();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = FileConfigStore::new().load();
    let word_duration = Duration::from_secs(cli.duration.unwrap_or(config.word_duration_secs));
    let session_size = cli.session_size.unwrap_or(config.max_words_per_session);
    let table_path = cli
        .csv
        .clone()
        .or_else(watr::app_dirs::AppDirs::table_path)
        .unwrap_or_else(|| PathBuf::from("wat.csv"));

    if cli.reseed {
        let store = WordStore::initialize_default(&table_path)?;
        println!(
            "seeded {} words into {}",
            store.count_total(),
            table_path.display()
        );
        return Ok(());
    }

    let mut store = WordStore::open_or_seed(&table_path)?;

    if cli.reset {
        store.reset_all()?;
        println!("cleared shown flags for {} words", store.count_total());
        return Ok(());
    }

    if cli.progress {
        println!("{}/{} words shown", store.count_shown(), store.count_total());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, session_size, word_duration)?;
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let pump = EventPump::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match app.handle_event(pump.step(), Instant::now()) {
            EventOutcome::Quit => break,
            EventOutcome::Redraw => {
                terminal.draw(|f| ui(app, f))?;
            }
            EventOutcome::Idle => {}
        }
    }

    // Every store mutation was flushed synchronously, so there is nothing
    // left to persist on the way out.
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}

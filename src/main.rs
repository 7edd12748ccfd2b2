pub mod ui;

use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use chrono::Local;
use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use cogtrack::{
    app_dirs::AppDirs,
    catalog::SubTest,
    config::{Config, ConfigStore, FileConfigStore},
    export::export_csv,
    factors::Factors,
    grouping::GroupMode,
    insights::generate_insights,
    logging::init_tracing,
    report::{self, trends_report, TrendsReport},
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    session::{SessionCandidate, SessionRecord},
    store::{LoadOutcome, SessionStore, SqliteKvStore},
};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 250;
const PAGE_SIZE: usize = 10;

/// cognitive test tracker with stress and fatigue trend analysis
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Record cognitive mini-test sessions with self-reported stress and fatigue, then explore how those factors line up with reaction time, accuracy and errors."
)]
pub struct Cli {
    /// factor to group trends by
    #[clap(short = 'g', long, value_enum, global = true)]
    group_by: Option<GroupMode>,

    /// only analyze sessions of this test
    #[clap(short = 't', long = "test", value_enum, global = true)]
    sub_test: Option<SubTest>,

    /// directory holding the session database
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    /// log filter, e.g. "debug" (RUST_LOG takes precedence)
    #[clap(long, global = true)]
    log_level: Option<String>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// interactive trends view (default)
    Trends,
    /// record a completed session and show its summary
    Record(RecordArgs),
    /// list recorded sessions, newest first
    History,
    /// print the trends analysis as text
    Analyze,
    /// export session history as CSV
    Export {
        /// destination file
        path: PathBuf,
    },
    /// delete all session history
    Clear {
        /// confirm the deletion
        #[clap(long)]
        yes: bool,
    },
    /// list the available tests
    Tests,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RecordArgs {
    /// test that was run
    #[clap(value_enum)]
    sub_test: SubTest,

    /// number of trials presented
    #[clap(long)]
    total: u32,

    /// number of correct responses
    #[clap(long)]
    correct: u32,

    /// points scored (defaults to correct responses)
    #[clap(long)]
    score: Option<u32>,

    /// errors made (defaults to total minus correct)
    #[clap(long)]
    errors: Option<u32>,

    /// reaction times in milliseconds, comma separated
    #[clap(long = "rt", value_delimiter = ',')]
    reaction_times: Vec<u32>,

    /// self-reported stress, 0-100
    #[clap(long, allow_hyphen_values = true)]
    stress: Option<i64>,

    /// self-reported fatigue, 0-100
    #[clap(long, allow_hyphen_values = true)]
    fatigue: Option<i64>,

    /// age in years
    #[clap(long, allow_hyphen_values = true)]
    age: Option<i64>,
}

impl RecordArgs {
    fn candidate(&self) -> SessionCandidate {
        SessionCandidate {
            score: self.score.unwrap_or(self.correct),
            reaction_times: self.reaction_times.clone(),
            errors: self
                .errors
                .unwrap_or_else(|| self.total.saturating_sub(self.correct)),
            total_trials: self.total,
            correct_responses: self.correct,
        }
    }
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(mode) = self.group_by {
            cfg.group_by = mode;
        }
        if self.sub_test.is_some() {
            cfg.sub_test = self.sub_test;
        }
        if let Some(dir) = &self.data_dir {
            cfg.data_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            cfg.log_level = level.clone();
        }
        cfg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Trends,
    History,
    ConfirmClear,
}

#[derive(Debug, Default)]
pub struct HistoryState {
    pub scroll_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub store: SessionStore<SqliteKvStore>,
    pub state: AppState,
    /// Screen to return to when the clear dialog closes
    pub previous_state: AppState,
    pub group_by: GroupMode,
    pub filter: Option<SubTest>,
    pub report: TrendsReport,
    pub history_state: HistoryState,
    pub status: Option<String>,
}

impl App {
    pub fn new(store: SessionStore<SqliteKvStore>, group_by: GroupMode, filter: Option<SubTest>) -> Self {
        let status = match store.load_outcome() {
            LoadOutcome::Corrupt { reason } => {
                Some(format!("Stored history could not be read ({reason}); starting empty"))
            }
            LoadOutcome::Unreadable { reason } => Some(format!(
                "Stored history is unavailable ({reason}); press r to retry before saving"
            )),
            _ => None,
        };
        let report = trends_report(store.sessions(), group_by, filter);
        Self {
            store,
            state: AppState::Trends,
            previous_state: AppState::Trends,
            group_by,
            filter,
            report,
            history_state: HistoryState::default(),
            status,
        }
    }

    pub fn refresh(&mut self) {
        self.report = trends_report(self.store.sessions(), self.group_by, self.filter);
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Trends => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Char('g') => {
                    self.group_by = self.group_by.next();
                    self.refresh();
                }
                KeyCode::Char('t') => {
                    self.filter = SubTest::cycle(self.filter);
                    self.refresh();
                }
                KeyCode::Char('r') => {
                    self.store.load_all();
                    self.refresh();
                    self.status = Some(format!("Reloaded {} sessions", self.store.len()));
                }
                KeyCode::Char('h') => {
                    self.history_state = HistoryState::default();
                    self.state = AppState::History;
                }
                KeyCode::Char('c') => self.open_clear_dialog(),
                _ => {}
            },
            AppState::History => match key.code {
                KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                    self.state = AppState::Trends;
                }
                KeyCode::Up => {
                    self.history_state.scroll_offset =
                        self.history_state.scroll_offset.saturating_sub(1);
                }
                KeyCode::Down => {
                    // Clamped against the visible height while rendering
                    self.history_state.scroll_offset += 1;
                }
                KeyCode::PageUp => {
                    self.history_state.scroll_offset =
                        self.history_state.scroll_offset.saturating_sub(PAGE_SIZE);
                }
                KeyCode::PageDown => {
                    self.history_state.scroll_offset += PAGE_SIZE;
                }
                KeyCode::Home => {
                    self.history_state.scroll_offset = 0;
                }
                KeyCode::Char('c') => self.open_clear_dialog(),
                _ => {}
            },
            AppState::ConfirmClear => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.status = Some(match self.store.clear_all() {
                        Ok(()) => "All session history deleted".to_string(),
                        Err(e) => {
                            warn!(error = %e, "failed to persist cleared history");
                            format!("Failed to clear history: {e}")
                        }
                    });
                    self.history_state = HistoryState::default();
                    self.refresh();
                    self.state = self.previous_state;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.state = self.previous_state;
                }
                _ => {}
            },
        }
        Flow::Continue
    }

    fn open_clear_dialog(&mut self) {
        if self.store.is_empty() {
            self.status = Some("Nothing to clear".to_string());
            return;
        }
        self.previous_state = self.state;
        self.state = AppState::ConfirmClear;
    }
}

fn open_store(cfg: &Config) -> Result<SessionStore<SqliteKvStore>, Box<dyn Error>> {
    let path = cfg
        .db_path()
        .ok_or("could not determine a directory for the session database")?;
    let store = SessionStore::open(SqliteKvStore::open(&path)?);
    info!(path = %path.display(), sessions = store.len(), "opened session store");
    Ok(store)
}

fn warn_if_corrupt(store: &SessionStore<SqliteKvStore>) {
    match store.load_outcome() {
        LoadOutcome::Corrupt { reason } => {
            eprintln!("warning: stored history could not be read ({reason}); treating it as empty");
        }
        LoadOutcome::Unreadable { reason } => {
            eprintln!("warning: stored history is unavailable ({reason}); nothing will be saved");
        }
        _ => {}
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config_store = FileConfigStore::new();
    let cfg = cli.apply_to(config_store.load());
    let log_dir = AppDirs::log_dir();
    let _log_guard = init_tracing(&cfg.log_level, log_dir.as_deref());

    match cli.command.clone().unwrap_or(Command::Trends) {
        Command::Trends => run_tui(&cli, cfg, &config_store),
        Command::Record(args) => {
            let factors = Factors::new(args.stress, args.fatigue, args.age)?;
            let candidate = args.candidate();
            candidate.validate()?;

            let mut store = open_store(&cfg)?;
            warn_if_corrupt(&store);
            let record = SessionRecord::new(
                candidate,
                args.sub_test,
                factors,
                Local::now().naive_local(),
            );
            let insights = generate_insights(&record, store.sessions());
            let summary = report::render_session_summary(&record, &insights);
            store.append(record)?;
            println!("{summary}");
            Ok(())
        }
        Command::History => {
            let store = open_store(&cfg)?;
            warn_if_corrupt(&store);
            println!("{}", report::render_history(&store.history()));
            Ok(())
        }
        Command::Analyze => {
            let store = open_store(&cfg)?;
            warn_if_corrupt(&store);
            let trends = trends_report(store.sessions(), cfg.group_by, cfg.sub_test);
            println!("{}", report::render_analysis(&trends));
            Ok(())
        }
        Command::Export { path } => {
            let store = open_store(&cfg)?;
            warn_if_corrupt(&store);
            let rows = export_csv(&path, store.sessions())?;
            println!("Exported {rows} sessions to {}", path.display());
            Ok(())
        }
        Command::Clear { yes } => {
            if !yes {
                let mut cmd = Cli::command();
                cmd.error(
                    ErrorKind::MissingRequiredArgument,
                    "refusing to delete all session history without --yes",
                )
                .exit();
            }
            let mut store = open_store(&cfg)?;
            let count = store.len();
            store.clear_all()?;
            println!("Deleted {count} sessions");
            Ok(())
        }
        Command::Tests => {
            println!("{}", report::render_catalog());
            Ok(())
        }
    }
}

fn run_tui(
    cli: &Cli,
    mut cfg: Config,
    config_store: &impl ConfigStore,
) -> Result<(), Box<dyn Error>> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = open_store(&cfg)?;
    let mut app = App::new(store, cfg.group_by, cfg.sub_test);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Only remember the view settings that did not come from flags
    if cli.group_by.is_none() {
        cfg.group_by = app.group_by;
    }
    if cli.sub_test.is_none() {
        cfg.sub_test = app.filter;
    }
    if let Err(e) = config_store.save(&cfg) {
        warn!(error = %e, "failed to save config");
    }

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => continue,
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

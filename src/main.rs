mod ui;

use std::{
    error::Error,
    fs::{File, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use windsong::{
    app_dirs::AppDirs,
    clock::{TrackClock, WallClock, MUSIC_ENTER_TIME_MS},
    config::{Config, ConfigStore, FileConfigStore, KeyLayout},
    display::{DisplaySmoother, DisplayValues},
    events::GameEvent,
    headless::{simulate, DEFAULT_TICK_MS},
    hit_object::{SoundKind, GRID_CELLS},
    input_log::{load_attempts, HitAttempt},
    judgment::Tier,
    map::{self, Beatmap},
    runtime::{CrosstermEventSource, FixedTicker, PlayEvent, Runner},
    scheduler::{ObjectSource, SpawnScheduler},
    session::{Session, SessionConfig, SessionSummary},
    training::TrainingGenerator,
};

use crate::ui::screen::current_screen;

/// How long a judgment stays on its cell, in ms of track time.
pub const FLASH_MS: i64 = 300;

/// rhythm game on a 3x3 grid, played from the keyboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal rhythm game: targets appear on a 3x3 grid and must be struck on the beat with the numpad or the qwe/asd/zxc block."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// calibration offset added to the track position, in ms
    #[clap(short = 'o', long, global = true, allow_hyphen_values = true)]
    offset: Option<i64>,

    /// keep playing when health runs out
    #[clap(long, global = true)]
    no_fail: bool,

    /// keys used for the grid
    #[clap(short = 'k', long, global = true, value_enum)]
    layout: Option<KeyLayout>,

    /// write the given options back to the config file
    #[clap(long, global = true)]
    save: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// play a map file (or a map name from the maps directory)
    Play { map: PathBuf },
    /// endless practice on random cells
    Train,
    /// replay a recorded `time_ms,position` CSV against a map and print the result
    Simulate {
        map: PathBuf,
        inputs: PathBuf,
        /// print the summary as JSON
        #[clap(long)]
        json: bool,
        /// simulation frame length in ms
        #[clap(long, default_value_t = DEFAULT_TICK_MS)]
        tick_ms: i64,
    },
}

impl Cli {
    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(offset) = self.offset {
            config.music_offset_ms = offset;
        }
        if self.no_fail {
            config.no_fail = true;
        }
        if let Some(layout) = self.layout {
            config.key_layout = layout;
        }
        config.clamped()
    }

    fn uses_terminal(&self) -> bool {
        !matches!(self.command, Command::Simulate { .. })
    }
}

#[derive(Debug, Clone)]
pub enum Mode {
    Play(Beatmap),
    Train,
}

impl Mode {
    fn source(&self) -> Box<dyn ObjectSource> {
        match self {
            Mode::Play(map) => Box::new(SpawnScheduler::new(map.objects.clone())),
            Mode::Train => Box::new(TrainingGenerator::new()),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Mode::Play(map) => format!("{map} ({})", map.difficulty_label()),
            Mode::Train => "Training".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Playing,
    Results,
}

pub struct App {
    pub mode: Mode,
    pub config: Config,
    pub session: Session<Box<dyn ObjectSource>>,
    pub clock: WallClock,
    pub smoother: DisplaySmoother,
    pub display: DisplayValues,
    pub state: AppState,
    flashes: [Option<(Tier, i64)>; GRID_CELLS],
    last_frame: Option<Instant>,
}

impl App {
    pub fn new(mode: Mode, config: Config) -> Self {
        // training never fails
        let no_fail = config.no_fail || matches!(mode, Mode::Train);
        let session = Session::new(mode.source(), SessionConfig { no_fail });
        let smoother = DisplaySmoother::new();

        Self {
            clock: WallClock::new(MUSIC_ENTER_TIME_MS, config.music_offset_ms),
            display: smoother.values(),
            smoother,
            session,
            mode,
            config,
            state: AppState::Playing,
            flashes: [None; GRID_CELLS],
            last_frame: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.mode.clone(), self.config.clone());
    }

    pub fn start(&mut self) {
        self.clock.start();
        self.last_frame = Some(Instant::now());
    }

    pub fn has_started(&self) -> bool {
        self.last_frame.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.state == AppState::Playing && self.clock.is_paused()
    }

    pub fn toggle_pause(&mut self) {
        if self.clock.is_paused() {
            self.start();
        } else {
            self.clock.pause();
            log::debug!("paused at {}ms", self.track_ms());
        }
    }

    pub fn track_ms(&self) -> i64 {
        self.clock.position_ms()
    }

    /// Stamps a grid hit with the track time of its key press.
    pub fn on_hit(&mut self, position: usize, at: Instant) {
        if self.is_paused() || self.state != AppState::Playing {
            return;
        }
        let time_ms = self.clock.position_at(at);
        self.session.queue_hit(HitAttempt::new(time_ms, position));
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self.is_paused() || self.state != AppState::Playing {
            return;
        }
        let delta_ms = self.last_frame.map_or(0, |last| {
            now.saturating_duration_since(last).as_millis() as i64
        });
        self.last_frame = Some(now);
        let track_ms = self.clock.position_at(now);

        self.session.tick(delta_ms, track_ms);
        for event in self.session.drain_events() {
            match event {
                GameEvent::Judged { position, tier, .. } => {
                    if let Some(flash) = self.flashes.get_mut(position) {
                        *flash = Some((tier, track_ms));
                    }
                }
                GameEvent::PlayHitSound(SoundKind::None) => {}
                GameEvent::PlayHitSound(sound) => log::trace!("{sound} hit sound"),
                GameEvent::EmptyHit { position } => log::trace!("empty hit on cell {position}"),
                GameEvent::Cue { position } => log::trace!("cue on cell {position}"),
                GameEvent::ComboBreak { combo } => log::debug!("combo of {combo} broken"),
                GameEvent::Failed | GameEvent::Cleared => {
                    log::info!("{}: {event:?} at {track_ms}ms", self.mode.title())
                }
            }
        }
        self.display = self.smoother.update(self.session.state(), delta_ms);

        if self.session.is_over() {
            self.finish();
        }
    }

    /// Leaves play for the results screen; training only ends this way.
    pub fn finish(&mut self) {
        self.clock.pause();
        self.state = AppState::Results;
    }

    /// Judgment to show on `position` at `track_ms`, if one is still fresh.
    pub fn flash_at(&self, position: usize, track_ms: i64) -> Option<Tier> {
        self.flashes
            .get(position)
            .copied()
            .flatten()
            .filter(|&(_, at)| track_ms - at < FLASH_MS)
            .map(|(tier, _)| tier)
    }
}

fn open_log(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn init_logging(to_file: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"));
    // stderr would draw over the game screen
    if to_file {
        if let Some(file) = AppDirs::log_path().as_deref().and_then(open_log) {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    let _ = builder.try_init();
    // Startup default until the config is read; RUST_LOG wins when set.
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(log::LevelFilter::Warn);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.uses_terminal());

    let store = FileConfigStore::new();
    let config = cli.apply_overrides(store.load());
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(config.level_filter());
    }
    if cli.save {
        store.save(&config)?;
        log::info!("saved config to {}", store.path().display());
    }

    match &cli.command {
        Command::Simulate {
            map,
            inputs,
            json,
            tick_ms,
        } => {
            let beatmap = Beatmap::load(map)?;
            let attempts = load_attempts(inputs)?;
            let summary = simulate(
                &beatmap,
                &attempts,
                SessionConfig {
                    no_fail: config.no_fail,
                },
                *tick_ms,
            );
            if *json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", format_summary(&summary));
            }
            Ok(())
        }
        Command::Play { map } => {
            let path = map::resolve_path(map, AppDirs::maps_dir().as_deref());
            let beatmap = Beatmap::load(path)?;
            run_tui(App::new(Mode::Play(beatmap), config))
        }
        Command::Train => run_tui(App::new(Mode::Train, config)),
    }
}

fn run_tui(mut app: App) -> Result<(), Box<dyn Error>> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result?;
    if app.state == AppState::Results && app.session.state().judged() > 0 {
        println!("{}", format_summary(&app.session.summary()));
    }
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(app.config.key_layout),
        FixedTicker::new(Duration::from_millis(app.config.tick_rate_ms)),
    );
    app.start();

    loop {
        match runner.step() {
            PlayEvent::Hit { position, at } => app.on_hit(position, at),
            PlayEvent::Key(key) => match (key.code, app.state) {
                // ctrl+c to quit
                (KeyCode::Char('c'), _) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    break;
                }
                (KeyCode::Esc, AppState::Playing) => app.finish(),
                (KeyCode::Esc, AppState::Results) => break,
                (KeyCode::Char(' '), AppState::Playing) => app.toggle_pause(),
                (KeyCode::Char('r'), AppState::Results) => {
                    app.reset();
                    app.start();
                }
                _ => {}
            },
            PlayEvent::Resize | PlayEvent::Tick => {}
        }

        app.on_tick(Instant::now());
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn format_summary(summary: &SessionSummary) -> String {
    let mut lines = vec![
        format!(
            "{}  grade {}  {:.2}%",
            summary.status, summary.grade, summary.accuracy
        ),
        format!("score {}  max combo {}", summary.score, summary.combo_max),
        format!(
            "perfect {}  good {}  okay {}  miss {}",
            summary.perfect, summary.good, summary.okay, summary.miss
        ),
    ];
    if summary.skipped > 0 {
        lines.push(format!("{} objects skipped", summary.skipped));
    }
    if let Some(offsets) = summary.offsets {
        lines.push(format!(
            "offset {:+.1}ms avg  {:.1}ms sd",
            offsets.mean_ms, offsets.std_dev_ms
        ));
    }
    lines.join("\n")
}

fn ui(app: &mut App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}

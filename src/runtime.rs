use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::KeyLayout;

/// Unified event type consumed by the play loop
#[derive(Clone, Debug)]
pub enum PlayEvent {
    /// A grid key went down. `at` is stamped on the input thread so the hit keeps
    /// its timing even if the render loop is behind.
    Hit { position: usize, at: Instant },
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of play events (grid hits, other keys, resize)
pub trait PlayEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<PlayEvent, RecvTimeoutError>;
}

/// Translates a key press into a play event under `layout`.
pub fn classify_key(layout: KeyLayout, key: KeyEvent, at: Instant) -> Option<PlayEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            match layout.position_for(c) {
                // Repeats would double-hit a cell.
                Some(_) if key.kind == KeyEventKind::Repeat => None,
                Some(position) => Some(PlayEvent::Hit { position, at }),
                None => Some(PlayEvent::Key(key)),
            }
        }
        _ => Some(PlayEvent::Key(key)),
    }
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<PlayEvent>,
}

impl CrosstermEventSource {
    pub fn new(layout: KeyLayout) -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => classify_key(layout, key, Instant::now()),
                Ok(CtEvent::Resize(_, _)) => Some(PlayEvent::Resize),
                Ok(_) => None,
                Err(e) => {
                    log::error!("terminal input closed: {e}");
                    break;
                }
            };
            if let Some(ev) = ev {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new(KeyLayout::default())
    }
}

impl PlayEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PlayEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
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

/// Channel-fed event source for tests
pub struct TestEventSource {
    rx: Receiver<PlayEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PlayEvent>) -> Self {
        Self { rx }
    }
}

impl PlayEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PlayEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: PlayEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: PlayEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> PlayEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => PlayEvent::Tick,
        }
    }
}

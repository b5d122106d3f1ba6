use std::time::{Duration, Instant};

/// Delay between entering a session and the music starting, in ms.
pub const MUSIC_ENTER_TIME_MS: i64 = 1000;

/// The authoritative timing source for a session: elapsed track time in ms.
pub trait TrackClock {
    fn position_ms(&self) -> i64;
}

/// Clock whose position is set explicitly; drives headless sessions and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    position_ms: i64,
}

impl ManualClock {
    pub fn new(position_ms: i64) -> Self {
        Self { position_ms }
    }

    pub fn set(&mut self, position_ms: i64) {
        self.position_ms = position_ms;
    }

    pub fn advance(&mut self, delta_ms: i64) {
        self.position_ms += delta_ms;
    }
}

impl TrackClock for ManualClock {
    fn position_ms(&self) -> i64 {
        self.position_ms
    }
}

/// Wall-clock stand-in for a playing music track. Position starts at
/// `-lead_in_ms`, freezes while paused, and has the calibration offset added.
#[derive(Debug, Clone)]
pub struct WallClock {
    lead_in_ms: i64,
    offset_ms: i64,
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl WallClock {
    pub fn new(lead_in_ms: i64, offset_ms: i64) -> Self {
        Self {
            lead_in_ms,
            offset_ms,
            accumulated: Duration::ZERO,
            running_since: None,
        }
    }

    pub fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.running_since.is_none()
    }

    fn elapsed_at(&self, at: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + at.saturating_duration_since(since),
            None => self.accumulated,
        }
    }

    /// Track position at an earlier or later instant, e.g. when a key was read.
    pub fn position_at(&self, at: Instant) -> i64 {
        self.elapsed_at(at).as_millis() as i64 - self.lead_in_ms + self.offset_ms
    }
}

impl TrackClock for WallClock {
    fn position_ms(&self) -> i64 {
        self.position_at(Instant::now())
    }
}

use crate::scoring::SessionState;

/// Lag factor (ms) for score and percent: each tick closes `delta / K` of the gap.
pub const SCORE_LAG_MS: f32 = 50.0;
pub const HEALTH_LAG_MS: f32 = 50.0;

const SCORE_STEP: i64 = 1;
const PERCENT_STEP: f32 = 0.01;
const HEALTH_STEP: f32 = 0.1;

/// Cosmetic values that trail the authoritative [`SessionState`].
///
/// The smoother only ever borrows the state immutably; nothing it computes flows
/// back into gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplaySmoother {
    score: i64,
    percent: f32,
    health: f32,
}

/// One tick's worth of smoothed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayValues {
    pub score: i64,
    pub percent: f32,
    pub health: f32,
}

fn chase(current: f32, target: f32, delta_ms: i64, lag_ms: f32, step: f32) -> f32 {
    if current == target {
        return current;
    }
    let shift = (target - current).abs() * delta_ms as f32 / lag_ms + step;
    if current < target {
        (current + shift).min(target)
    } else {
        (current - shift).max(target)
    }
}

impl DisplaySmoother {
    /// Starts from zero so the bars fill in at the beginning of a session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn smoothed_score(&mut self, state: &SessionState, delta_ms: i64) -> i64 {
        let target = state.score;
        if self.score < target {
            self.score += (target - self.score) * delta_ms.max(0) / SCORE_LAG_MS as i64 + SCORE_STEP;
            self.score = self.score.min(target);
        } else if self.score > target {
            self.score = target;
        }
        self.score
    }

    pub fn smoothed_percent(&mut self, state: &SessionState, delta_ms: i64) -> f32 {
        self.percent = chase(
            self.percent,
            state.accuracy(),
            delta_ms.max(0),
            SCORE_LAG_MS,
            PERCENT_STEP,
        );
        self.percent
    }

    pub fn smoothed_health(&mut self, state: &SessionState, delta_ms: i64) -> f32 {
        self.health = chase(
            self.health,
            state.health,
            delta_ms.max(0),
            HEALTH_LAG_MS,
            HEALTH_STEP,
        );
        self.health
    }

    pub fn update(&mut self, state: &SessionState, delta_ms: i64) -> DisplayValues {
        DisplayValues {
            score: self.smoothed_score(state, delta_ms),
            percent: self.smoothed_percent(state, delta_ms),
            health: self.smoothed_health(state, delta_ms),
        }
    }

    pub fn values(&self) -> DisplayValues {
        DisplayValues {
            score: self.score,
            percent: self.percent,
            health: self.health,
        }
    }
}

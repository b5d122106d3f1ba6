use serde::Serialize;

use crate::events::GameEvent;
use crate::grade::{accuracy_percent, Grade};
use crate::hit_object::SoundKind;
use crate::judgment::{Judgment, Tier};

pub const MAX_HEALTH: f32 = 100.0;

/// Health below this ends the session unless no-fail is on.
pub const FAIL_HEALTH: f32 = 1.0;

/// Losing a combo at least this long requests the combo-break sound.
pub const COMBO_BREAK_THRESHOLD: u32 = 20;

/// Passive drain while objects are armed: one health point per this many ms.
pub const DRAIN_MS_PER_POINT: f32 = 250.0;

/// Authoritative per-session score data. Only [`Scoring`] mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub score: i64,
    pub combo: u32,
    pub combo_max: u32,
    pub health: f32,
    pub perfect: u32,
    pub good: u32,
    pub okay: u32,
    pub miss: u32,
    /// Objects that reached the active window.
    pub total_armed: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 0,
            combo_max: 0,
            health: MAX_HEALTH,
            perfect: 0,
            good: 0,
            okay: 0,
            miss: 0,
            total_armed: 0,
        }
    }
}

impl SessionState {
    pub fn judged(&self) -> u32 {
        self.perfect + self.good + self.okay + self.miss
    }

    pub fn accuracy(&self) -> f32 {
        accuracy_percent(self.perfect, self.good, self.okay, self.miss)
    }

    pub fn grade(&self) -> Grade {
        Grade::from_accuracy(self.accuracy(), self.miss)
    }

    pub fn count(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Perfect => self.perfect,
            Tier::Good => self.good,
            Tier::Okay => self.okay,
            Tier::Miss => self.miss,
        }
    }
}

/// Applies judgments, miss batches and drain to a [`SessionState`] and queues the
/// resulting sound requests. Knows nothing about rendering.
#[derive(Debug, Clone, Default)]
pub struct Scoring {
    state: SessionState,
    events: Vec<GameEvent>,
}

impl Scoring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn change_health(&mut self, delta: f32) {
        self.state.health = (self.state.health + delta).clamp(0.0, MAX_HEALTH);
    }

    pub fn note_armed(&mut self) {
        self.state.total_armed += 1;
    }

    /// Credits a judged hit. A Miss-tier judgment counts as a single miss.
    pub fn apply_hit(&mut self, judgment: &Judgment, sound: SoundKind) {
        let counter = match judgment.tier {
            Tier::Perfect => &mut self.state.perfect,
            Tier::Good => &mut self.state.good,
            Tier::Okay => &mut self.state.okay,
            Tier::Miss => {
                self.apply_miss(1);
                return;
            }
        };
        *counter += 1;

        self.state.score += judgment.points;
        self.state.combo += 1;
        self.state.combo_max = self.state.combo_max.max(self.state.combo);
        self.change_health(judgment.health_delta);
        self.events.push(GameEvent::PlayHitSound(sound));
    }

    /// Records `count` misses at once. The combo breaks once for the whole batch;
    /// the miss counter and health penalty apply per object.
    pub fn apply_miss(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        self.state.miss += count;
        if self.state.combo >= COMBO_BREAK_THRESHOLD {
            self.events.push(GameEvent::ComboBreak {
                combo: self.state.combo,
            });
        }
        self.state.combo = 0;
        self.change_health(Tier::Miss.health_delta() * count as f32);
    }

    /// Passive drain; rest periods with nothing armed do not drain.
    pub fn tick(&mut self, delta_ms: i64, armed: usize) {
        if armed == 0 || delta_ms <= 0 {
            return;
        }
        self.change_health(-(delta_ms as f32) / DRAIN_MS_PER_POINT);
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.health < FAIL_HEALTH
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::hit_object::{HitObject, SoundKind, GRID_CELLS};
use crate::scheduler::{ObjectSource, LEAD_TIME_MS};

/// Gap between generated targets, in ms.
pub const EVENT_INTERVAL_MS: i64 = 2000;

/// Endless practice source: one clap target on a random cell every
/// [`EVENT_INTERVAL_MS`], due [`LEAD_TIME_MS`] after it appears.
#[derive(Debug, Clone)]
pub struct TrainingGenerator<R: Rng = StdRng> {
    rng: R,
    cells: usize,
    next_spawn_ms: i64,
}

impl TrainingGenerator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for TrainingGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TrainingGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            cells: GRID_CELLS,
            next_spawn_ms: EVENT_INTERVAL_MS,
        }
    }
}

impl<R: Rng> ObjectSource for TrainingGenerator<R> {
    fn advance(&mut self, track_ms: i64) -> Vec<HitObject> {
        let mut spawned = Vec::new();
        while track_ms >= self.next_spawn_ms {
            let position = self.rng.gen_range(0..self.cells);
            spawned.push(HitObject::new(
                self.next_spawn_ms + LEAD_TIME_MS,
                position,
                SoundKind::Clap,
            ));
            self.next_spawn_ms += EVENT_INTERVAL_MS;
        }
        spawned
    }

    fn is_exhausted(&self) -> bool {
        false
    }

    fn end_time(&self) -> Option<i64> {
        None
    }

    fn cues_arrival(&self) -> bool {
        true
    }
}

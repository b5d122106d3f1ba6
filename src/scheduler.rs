use std::sync::Arc;

use crate::hit_object::HitObject;

/// How long before its scheduled time an object becomes hittable (its fade-in).
pub const LEAD_TIME_MS: i64 = 750;

/// Supplies objects to arm as the track advances.
pub trait ObjectSource {
    /// Objects that became due since the last call, in scheduled order.
    fn advance(&mut self, track_ms: i64) -> Vec<HitObject>;

    /// True once no further objects will ever be produced.
    fn is_exhausted(&self) -> bool;

    /// Scheduled time of the final object, if the source is finite.
    fn end_time(&self) -> Option<i64>;

    /// Whether an audible cue should mark each object reaching its hit time.
    fn cues_arrival(&self) -> bool {
        false
    }
}

impl<S: ObjectSource + ?Sized> ObjectSource for Box<S> {
    fn advance(&mut self, track_ms: i64) -> Vec<HitObject> {
        (**self).advance(track_ms)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }

    fn end_time(&self) -> Option<i64> {
        (**self).end_time()
    }

    fn cues_arrival(&self) -> bool {
        (**self).cues_arrival()
    }
}

/// Walks a time-sorted map with a cursor that only moves forward.
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    objects: Arc<[HitObject]>,
    cursor: usize,
    last_track_ms: Option<i64>,
}

impl SpawnScheduler {
    pub fn new(objects: Arc<[HitObject]>) -> Self {
        Self {
            objects,
            cursor: 0,
            last_track_ms: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.objects.len() - self.cursor
    }
}

impl ObjectSource for SpawnScheduler {
    fn advance(&mut self, track_ms: i64) -> Vec<HitObject> {
        if let Some(last) = self.last_track_ms {
            if track_ms < last {
                // Already-armed or expired objects are not re-armed on seek-back.
                log::debug!("track moved backward from {last}ms to {track_ms}ms");
            }
        }
        self.last_track_ms = Some(track_ms);

        let start = self.cursor;
        while let Some(next) = self.objects.get(self.cursor) {
            if next.time_ms - track_ms > LEAD_TIME_MS {
                break;
            }
            self.cursor += 1;
        }
        self.objects[start..self.cursor].to_vec()
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.objects.len()
    }

    fn end_time(&self) -> Option<i64> {
        self.objects.last().map(|h| h.time_ms)
    }
}

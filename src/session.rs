use std::collections::VecDeque;

use serde::Serialize;

use crate::events::GameEvent;
use crate::grade::Grade;
use crate::hit_object::HitObject;
use crate::input_log::HitAttempt;
use crate::judgment::Tier;
use crate::map::Beatmap;
use crate::scheduler::{ObjectSource, SpawnScheduler};
use crate::scoring::{Scoring, SessionState};
use crate::time_series::{Sampler, TimeSeriesPoint};
use crate::training::TrainingGenerator;
use crate::util::{offset_stats, OffsetStats};
use crate::window::{ActiveWindow, Resolution};

/// Time after the last object before a finished map counts as cleared, in ms.
pub const END_DELAY_MS: i64 = 2000;

const HEALTH_SAMPLE_MS: i64 = 250;

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub no_fail: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum SessionStatus {
    Playing,
    Cleared,
    Failed,
}

/// End-of-session read-out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub status: SessionStatus,
    pub grade: Grade,
    pub accuracy: f32,
    pub score: i64,
    pub combo_max: u32,
    pub perfect: u32,
    pub good: u32,
    pub okay: u32,
    pub miss: u32,
    pub total_armed: u32,
    /// Objects dropped because their cell was still occupied.
    pub skipped: u32,
    pub offsets: Option<OffsetStats>,
}

/// Drives one play session, one tick at a time.
///
/// Each tick runs in a fixed order: arm newly due objects, resolve queued hit
/// attempts, expire overdue objects, drain health, then check for failure or
/// clear. The window removes an object on its first resolution, so a hit and an
/// expiry in the same tick can never both count it.
#[derive(Debug)]
pub struct Session<S: ObjectSource = SpawnScheduler> {
    config: SessionConfig,
    source: S,
    window: ActiveWindow,
    scoring: Scoring,
    pending: VecDeque<HitAttempt>,
    status: SessionStatus,
    skipped: u32,
    offsets: Vec<i64>,
    cues: VecDeque<HitObject>,
    health_samples: Sampler,
}

impl Session<SpawnScheduler> {
    pub fn for_map(map: &Beatmap, config: SessionConfig) -> Self {
        Self::new(SpawnScheduler::new(map.objects.clone()), config)
    }
}

impl Session<TrainingGenerator> {
    /// Endless practice. Health still drains but never ends the session.
    pub fn training(generator: TrainingGenerator) -> Self {
        Self::new(generator, SessionConfig { no_fail: true })
    }
}

impl<S: ObjectSource> Session<S> {
    pub fn new(source: S, config: SessionConfig) -> Self {
        Self {
            config,
            source,
            window: ActiveWindow::default(),
            scoring: Scoring::new(),
            pending: VecDeque::new(),
            status: SessionStatus::Playing,
            skipped: 0,
            offsets: Vec::new(),
            cues: VecDeque::new(),
            health_samples: Sampler::new(HEALTH_SAMPLE_MS),
        }
    }

    pub fn state(&self) -> &SessionState {
        self.scoring.state()
    }

    pub fn window(&self) -> &ActiveWindow {
        &self.window
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != SessionStatus::Playing
    }

    /// Health over track time. Endless sources are not sampled.
    pub fn health_timeline(&self) -> &[TimeSeriesPoint] {
        self.health_samples.points()
    }

    /// Queues an attempt for the next tick. Ignored once the session is over.
    pub fn queue_hit(&mut self, attempt: HitAttempt) {
        if self.is_over() {
            return;
        }
        self.pending.push_back(attempt);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.scoring.drain_events()
    }

    fn objects_remain(&self) -> bool {
        !self.source.is_exhausted() || !self.window.is_empty()
    }

    fn arm_due(&mut self, track_ms: i64) {
        for object in self.source.advance(track_ms) {
            match self.window.arm(object) {
                Ok(()) => {
                    self.scoring.note_armed();
                    if self.source.cues_arrival() {
                        self.cues.push_back(object);
                    }
                }
                Err(e) => {
                    self.skipped += 1;
                    log::warn!("{e}");
                }
            }
        }
    }

    fn sound_cues(&mut self, track_ms: i64) {
        while let Some(object) = self.cues.front().copied() {
            if object.time_ms > track_ms {
                break;
            }
            self.cues.pop_front();
            self.scoring.push_event(GameEvent::Cue {
                position: object.position,
            });
        }
    }

    fn resolve(&mut self, attempt: HitAttempt) {
        match self.window.try_resolve_hit(attempt.position, attempt.time_ms) {
            Ok(Resolution::Judged { object, judgment }) => {
                self.scoring.push_event(GameEvent::Judged {
                    position: object.position,
                    tier: judgment.tier,
                    offset_ms: Some(judgment.offset_ms),
                });
                if judgment.tier.is_hit() {
                    self.offsets.push(judgment.offset_ms);
                }
                self.scoring.apply_hit(&judgment, object.sound);
            }
            Ok(Resolution::NotFound) => {
                self.scoring.push_event(GameEvent::EmptyHit {
                    position: attempt.position,
                });
            }
            Err(e) => log::warn!("hit rejected: {e}"),
        }
    }

    fn expire(&mut self, track_ms: i64) {
        let expired = self.window.expire_older_than(track_ms);
        if expired.is_empty() {
            return;
        }
        for object in &expired {
            self.scoring.push_event(GameEvent::Judged {
                position: object.position,
                tier: Tier::Miss,
                offset_ms: None,
            });
        }
        self.scoring.apply_miss(expired.len() as u32);
    }

    /// Advances the session to `track_ms`; `delta_ms` is the frame time since the
    /// previous tick.
    pub fn tick(&mut self, delta_ms: i64, track_ms: i64) -> SessionStatus {
        if self.is_over() {
            return self.status;
        }

        self.arm_due(track_ms);
        self.sound_cues(track_ms);
        while let Some(attempt) = self.pending.pop_front() {
            self.resolve(attempt);
        }
        self.expire(track_ms);
        self.scoring.tick(delta_ms, self.window.len());
        if self.source.end_time().is_some() {
            self.health_samples
                .record(track_ms, f64::from(self.state().health));
        }

        if self.scoring.is_exhausted() && self.objects_remain() && !self.config.no_fail {
            log::info!("health exhausted at {track_ms}ms");
            self.status = SessionStatus::Failed;
            self.pending.clear();
            self.scoring.push_event(GameEvent::Failed);
        } else if let Some(end) = self.source.end_time() {
            if !self.objects_remain() && track_ms >= end + END_DELAY_MS {
                self.status = SessionStatus::Cleared;
                self.scoring.push_event(GameEvent::Cleared);
            }
        }
        self.status
    }

    pub fn summary(&self) -> SessionSummary {
        let st = self.state();
        SessionSummary {
            status: self.status,
            grade: st.grade(),
            accuracy: st.accuracy(),
            score: st.score,
            combo_max: st.combo_max,
            perfect: st.perfect,
            good: st.good,
            okay: st.okay,
            miss: st.miss,
            total_armed: st.total_armed,
            skipped: self.skipped,
            offsets: offset_stats(&self.offsets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_object::SoundKind;
    use crate::scoring::FAIL_HEALTH;
    use std::sync::Arc;

    fn session(objects: &[(i64, usize)]) -> Session {
        let objects: Arc<[HitObject]> = objects
            .iter()
            .map(|&(t, p)| HitObject::new(t, p, SoundKind::Normal))
            .collect();
        Session::new(SpawnScheduler::new(objects), SessionConfig::default())
    }

    #[test]
    fn arms_hits_and_scores() {
        let mut s = session(&[(1000, 4)]);
        s.tick(16, 300);
        assert_eq!(s.window().len(), 1);
        assert_eq!(s.state().total_armed, 1);

        s.queue_hit(HitAttempt::new(1010, 4));
        s.tick(16, 1010);
        assert_eq!(s.state().score, 50);
        assert_eq!(s.state().perfect, 1);
        assert!(s.window().is_empty());

        let events = s.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::Judged {
                    position: 4,
                    tier: Tier::Perfect,
                    offset_ms: Some(10)
                },
                GameEvent::PlayHitSound(SoundKind::Normal),
            ]
        );
    }

    #[test]
    fn empty_cell_hit_changes_nothing() {
        let mut s = session(&[(1000, 1)]);
        s.tick(16, 500);
        let before = s.state().clone();
        s.queue_hit(HitAttempt::new(1000, 5));
        s.tick(0, 1000);
        assert_eq!(s.state(), &before);
        assert_eq!(s.drain_events(), vec![GameEvent::EmptyHit { position: 5 }]);
    }

    #[test]
    fn out_of_range_hit_is_rejected_and_play_continues() {
        let mut s = session(&[(1000, 1)]);
        s.queue_hit(HitAttempt::new(1000, 99));
        assert_eq!(s.tick(0, 500), SessionStatus::Playing);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn unanswered_objects_expire_as_one_batch() {
        let mut s = session(&[(1000, 0), (1000, 1), (1000, 2)]);
        s.tick(0, 400);
        s.tick(0, 1376);
        let st = s.state();
        assert_eq!(st.miss, 3);
        assert_eq!(st.health, 94.0);
        let judged = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Judged { tier: Tier::Miss, offset_ms: None, .. }))
            .count();
        assert_eq!(judged, 3);
    }

    #[test]
    fn hit_and_expiry_in_same_tick_count_once() {
        let mut s = session(&[(1000, 7)]);
        s.tick(0, 300);
        s.queue_hit(HitAttempt::new(1370, 7));
        s.tick(0, 1400);
        let st = s.state();
        assert_eq!(st.okay, 1);
        assert_eq!(st.miss, 0);
        assert_eq!(st.judged(), 1);
    }

    #[test]
    fn duplicate_positions_are_skipped_and_counted() {
        let mut s = session(&[(1000, 3), (1100, 3)]);
        s.tick(0, 500);
        assert_eq!(s.window().len(), 1);
        assert_eq!(s.summary().skipped, 1);
        assert_eq!(s.state().total_armed, 1);
    }

    #[test]
    fn clears_after_end_delay() {
        let mut s = session(&[(1000, 0)]);
        s.tick(0, 300);
        s.queue_hit(HitAttempt::new(1000, 0));
        s.tick(0, 1000);
        assert_eq!(s.tick(0, 2999), SessionStatus::Playing);
        assert_eq!(s.tick(0, 3000), SessionStatus::Cleared);
        assert!(s.drain_events().contains(&GameEvent::Cleared));

        let summary = s.summary();
        assert_eq!(summary.grade, Grade::S);
        assert_eq!(summary.accuracy, 100.0);
    }

    #[test]
    fn drains_to_failure_while_objects_remain() {
        let objects: Vec<(i64, usize)> = (0..200).map(|i| (1000 + i * 100, (i % 9) as usize)).collect();
        let mut s = session(&objects);
        let mut t = 0;
        while s.status() == SessionStatus::Playing && t < 60_000 {
            t += 100;
            s.tick(100, t);
        }
        assert_eq!(s.status(), SessionStatus::Failed);
        assert!(s.state().health < FAIL_HEALTH);
        assert!(s.drain_events().contains(&GameEvent::Failed));

        // terminal: further ticks and hits are ignored
        let before = s.state().clone();
        s.queue_hit(HitAttempt::new(t, 1));
        assert_eq!(s.tick(100, t + 100), SessionStatus::Failed);
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn no_fail_keeps_playing() {
        let objects: Arc<[HitObject]> = (0..60)
            .map(|i| HitObject::new(1000 + i * 100, (i % 9) as usize, SoundKind::Normal))
            .collect();
        let mut s = Session::new(
            SpawnScheduler::new(objects),
            SessionConfig { no_fail: true },
        );
        let mut t = 0;
        while t < 10_000 {
            t += 100;
            s.tick(100, t);
        }
        assert_eq!(s.status(), SessionStatus::Cleared);
        assert_eq!(s.state().health, 0.0);
        assert_eq!(s.summary().grade, Grade::F);
    }

    #[test]
    fn health_timeline_is_sampled() {
        let mut s = session(&[(5000, 0)]);
        for t in (0..2000).step_by(50) {
            s.tick(50, t);
        }
        assert_eq!(s.health_timeline().len(), 8);
    }

    #[test]
    fn attempt_before_fade_in_is_an_empty_hit() {
        let mut s = session(&[(1000, 3)]);
        s.tick(16, 240);
        assert!(s.window().is_empty());

        s.queue_hit(HitAttempt::new(245, 3));
        s.tick(16, 256);
        let st = s.state();
        assert_eq!(st.miss, 0);
        assert_eq!(st.combo, 0);
        assert_eq!(s.window().len(), 1);
        assert_eq!(s.drain_events(), vec![GameEvent::EmptyHit { position: 3 }]);

        s.queue_hit(HitAttempt::new(1000, 3));
        s.tick(0, 1000);
        assert_eq!(s.state().perfect, 1);
    }

    #[test]
    fn training_cues_each_target_on_its_hit_time() {
        let mut s = Session::training(TrainingGenerator::seeded(3));
        s.tick(0, 2000);
        let position = s.window().iter().next().map(|a| a.object.position).unwrap();
        assert!(!s
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Cue { .. })));

        s.tick(0, 2749);
        assert!(s.drain_events().is_empty());
        s.tick(0, 2750);
        assert_eq!(s.drain_events(), vec![GameEvent::Cue { position }]);
    }

    #[test]
    fn map_sessions_do_not_cue() {
        let mut s = session(&[(1000, 0)]);
        s.tick(0, 300);
        s.tick(0, 1000);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn endless_sessions_keep_no_health_timeline() {
        let mut s = Session::training(TrainingGenerator::seeded(9));
        for t in (0..20_000).step_by(50) {
            s.tick(50, t);
        }
        assert!(s.health_timeline().is_empty());
    }
}

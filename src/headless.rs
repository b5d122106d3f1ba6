use crate::clock::{ManualClock, TrackClock};
use crate::input_log::HitAttempt;
use crate::map::Beatmap;
use crate::session::{Session, SessionConfig, SessionSummary, END_DELAY_MS};

/// Default simulation frame length, in ms.
pub const DEFAULT_TICK_MS: i64 = 16;

/// Replays a recorded input log against a map with a manual clock and returns the
/// final summary. Each attempt is delivered on the first tick at or after its time.
pub fn simulate(
    map: &Beatmap,
    attempts: &[HitAttempt],
    config: SessionConfig,
    tick_ms: i64,
) -> SessionSummary {
    let tick_ms = tick_ms.max(1);
    let mut session = Session::for_map(map, config);
    let mut clock = ManualClock::new(0);
    let mut pending = attempts.iter().peekable();
    // Bounded by the map length so a misbehaving source cannot spin forever.
    let deadline = map.end_time() + END_DELAY_MS + tick_ms;

    while !session.is_over() && clock.position_ms() <= deadline {
        clock.advance(tick_ms);
        let now = clock.position_ms();
        while let Some(attempt) = pending.next_if(|a| a.time_ms <= now) {
            session.queue_hit(*attempt);
        }
        session.tick(tick_ms, now);
        for event in session.drain_events() {
            log::trace!("{now}ms: {event:?}");
        }
    }

    let summary = session.summary();
    log::info!(
        "simulated {map}: {} {} ({:.2}%)",
        summary.status,
        summary.grade,
        summary.accuracy
    );
    summary
}

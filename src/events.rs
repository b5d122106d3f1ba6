use serde::Serialize;

use crate::hit_object::SoundKind;
use crate::judgment::Tier;

/// Requests and notifications produced by a session for the presentation and audio
/// layers. Drained once per tick; nothing here is read back into gameplay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    /// An armed object was resolved, either by a hit attempt or by expiring.
    Judged {
        position: usize,
        tier: Tier,
        /// `None` for expiries, which have no attempt to measure.
        offset_ms: Option<i64>,
    },
    /// An attempt landed on a cell with nothing armed.
    EmptyHit { position: usize },
    PlayHitSound(SoundKind),
    /// A practice target reached its hit time on `position`.
    Cue { position: usize },
    /// A combo of at least the break threshold was lost.
    ComboBreak { combo: u32 },
    Failed,
    Cleared,
}

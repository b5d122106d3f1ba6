use thiserror::Error;

use crate::hit_object::{HitObject, GRID_CELLS};
use crate::judgment::{classify, Judgment, OKAY_WINDOW_MS};
use crate::scheduler::LEAD_TIME_MS;

/// A hit object that is currently eligible for judging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmedObject {
    pub object: HitObject,
    /// Arming order within the session; lower was armed earlier.
    pub seq: u64,
}

/// Result of a hit attempt against the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution {
    Judged { object: HitObject, judgment: Judgment },
    /// Nothing armed at that cell, or nothing was armed yet when the attempt was made.
    NotFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("grid position {position} outside 0..{cells}")]
    OutOfRange { position: usize, cells: usize },
    #[error("object at {time_ms}ms skipped: position {position} already armed")]
    DuplicatePosition { position: usize, time_ms: i64 },
}

/// Armed, unresolved hit objects. One slot per grid cell, each holding at most one
/// live entry, so resolving by position never scans or mutates a shared list.
#[derive(Debug, Clone)]
pub struct ActiveWindow {
    slots: Vec<Option<ArmedObject>>,
    next_seq: u64,
    armed: usize,
}

impl Default for ActiveWindow {
    fn default() -> Self {
        Self::new(GRID_CELLS)
    }
}

impl ActiveWindow {
    pub fn new(cells: usize) -> Self {
        Self {
            slots: vec![None; cells],
            next_seq: 0,
            armed: 0,
        }
    }

    pub fn cells(&self) -> usize {
        self.slots.len()
    }

    fn check_bounds(&self, position: usize) -> Result<(), WindowError> {
        if position >= self.slots.len() {
            return Err(WindowError::OutOfRange {
                position,
                cells: self.slots.len(),
            });
        }
        Ok(())
    }

    /// Makes `object` eligible for judging. An occupied cell is left untouched.
    pub fn arm(&mut self, object: HitObject) -> Result<(), WindowError> {
        self.check_bounds(object.position)?;
        let slot = &mut self.slots[object.position];
        if slot.is_some() {
            return Err(WindowError::DuplicatePosition {
                position: object.position,
                time_ms: object.time_ms,
            });
        }
        *slot = Some(ArmedObject {
            object,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.armed += 1;
        Ok(())
    }

    /// Removes the object armed at `position` and judges the attempt against it.
    ///
    /// An attempt made before the object's fade-in began finds nothing, and the object
    /// stays armed.
    pub fn try_resolve_hit(
        &mut self,
        position: usize,
        attempt_ms: i64,
    ) -> Result<Resolution, WindowError> {
        self.check_bounds(position)?;
        let slot = &mut self.slots[position];
        if matches!(slot, Some(a) if attempt_ms < a.object.time_ms - LEAD_TIME_MS) {
            return Ok(Resolution::NotFound);
        }
        match slot.take() {
            Some(armed) => {
                self.armed -= 1;
                Ok(Resolution::Judged {
                    object: armed.object,
                    judgment: classify(attempt_ms, armed.object.time_ms),
                })
            }
            None => Ok(Resolution::NotFound),
        }
    }

    /// Removes and returns, in arming order, every object that can no longer be hit.
    pub fn expire_older_than(&mut self, track_ms: i64) -> Vec<HitObject> {
        let mut expired: Vec<ArmedObject> = Vec::new();
        for slot in self.slots.iter_mut() {
            let overdue = matches!(slot, Some(a) if a.object.time_ms - track_ms < -OKAY_WINDOW_MS);
            if overdue {
                if let Some(armed) = slot.take() {
                    expired.push(armed);
                }
            }
        }
        self.armed -= expired.len();
        expired.sort_by_key(|a| a.seq);
        expired.into_iter().map(|a| a.object).collect()
    }

    pub fn get(&self, position: usize) -> Option<&ArmedObject> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    /// Armed objects in arming order.
    pub fn iter(&self) -> impl Iterator<Item = &ArmedObject> {
        let mut armed: Vec<&ArmedObject> = self.slots.iter().flatten().collect();
        armed.sort_by_key(|a| a.seq);
        armed.into_iter()
    }

    pub fn len(&self) -> usize {
        self.armed
    }

    pub fn is_empty(&self) -> bool {
        self.armed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_object::SoundKind;
    use crate::judgment::Tier;
    use assert_matches::assert_matches;

    fn obj(time_ms: i64, position: usize) -> HitObject {
        HitObject::new(time_ms, position, SoundKind::Normal)
    }

    #[test]
    fn arm_and_hit() {
        let mut w = ActiveWindow::default();
        w.arm(obj(1000, 4)).unwrap();
        assert_eq!(w.len(), 1);

        let r = w.try_resolve_hit(4, 1020).unwrap();
        assert_matches!(r, Resolution::Judged { judgment, .. } if judgment.tier == Tier::Perfect);
        assert!(w.is_empty());
    }

    #[test]
    fn empty_cell_is_not_found() {
        let mut w = ActiveWindow::default();
        w.arm(obj(1000, 1)).unwrap();
        assert_eq!(w.try_resolve_hit(5, 1000), Ok(Resolution::NotFound));
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn duplicate_position_is_rejected_without_replacing() {
        let mut w = ActiveWindow::default();
        w.arm(obj(1000, 2)).unwrap();
        let err = w.arm(obj(1100, 2)).unwrap_err();
        assert_eq!(
            err,
            WindowError::DuplicatePosition {
                position: 2,
                time_ms: 1100
            }
        );
        assert_eq!(w.get(2).map(|a| a.object.time_ms), Some(1000));
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let mut w = ActiveWindow::default();
        assert_matches!(
            w.arm(obj(0, 9)),
            Err(WindowError::OutOfRange { position: 9, cells: 9 })
        );
        assert_matches!(
            w.try_resolve_hit(42, 0),
            Err(WindowError::OutOfRange { position: 42, .. })
        );
    }

    #[test]
    fn expiry_is_strictly_past_okay_window() {
        let mut w = ActiveWindow::default();
        w.arm(obj(1000, 0)).unwrap();

        assert!(w.expire_older_than(1374).is_empty());
        assert!(w.expire_older_than(1375).is_empty());
        assert_eq!(w.expire_older_than(1376), vec![obj(1000, 0)]);
        assert!(w.is_empty());
    }

    #[test]
    fn expiry_returns_arming_order() {
        let mut w = ActiveWindow::default();
        w.arm(obj(1000, 8)).unwrap();
        w.arm(obj(1010, 0)).unwrap();
        w.arm(obj(1020, 4)).unwrap();
        w.arm(obj(5000, 5)).unwrap();

        let expired = w.expire_older_than(3000);
        let positions: Vec<usize> = expired.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![8, 0, 4]);
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn resolved_object_never_resolves_again() {
        let mut w = ActiveWindow::default();
        w.arm(obj(1000, 3)).unwrap();
        assert_matches!(w.try_resolve_hit(3, 1000), Ok(Resolution::Judged { .. }));
        assert_eq!(w.try_resolve_hit(3, 1000), Ok(Resolution::NotFound));
        assert!(w.expire_older_than(10_000).is_empty());
    }

    #[test]
    fn cell_frees_after_resolution_for_next_object() {
        let mut w = ActiveWindow::default();
        w.arm(obj(1000, 3)).unwrap();
        w.try_resolve_hit(3, 1000).unwrap();
        w.arm(obj(1200, 3)).unwrap();
        let seqs: Vec<u64> = w.iter().map(|a| a.seq).collect();
        assert_eq!(seqs, vec![1]);
    }

    #[test]
    fn attempt_before_fade_in_leaves_object_armed() {
        let mut w = ActiveWindow::default();
        w.arm(obj(1000, 3)).unwrap();
        assert_eq!(w.try_resolve_hit(3, 249), Ok(Resolution::NotFound));
        assert_eq!(w.len(), 1);
        assert_matches!(
            w.try_resolve_hit(3, 250),
            Ok(Resolution::Judged { judgment, .. }) if judgment.tier == Tier::Miss
        );
    }

    #[test]
    fn far_early_attempt_resolves_as_miss() {
        let mut w = ActiveWindow::default();
        w.arm(obj(1000, 6)).unwrap();
        let r = w.try_resolve_hit(6, 500).unwrap();
        assert_matches!(r, Resolution::Judged { judgment, .. } if judgment.tier == Tier::Miss);
        assert!(w.is_empty());
    }
}

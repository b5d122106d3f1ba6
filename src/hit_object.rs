use serde::{Deserialize, Serialize};

/// Width and height of the gamepad grid.
pub const GRID_SIZE: usize = 3;

/// Number of hittable cells on the gamepad.
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Hit sound requested when an object is struck.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum SoundKind {
    #[default]
    Normal,
    Clap,
    None,
}

impl SoundKind {
    /// Decodes the numeric sound column of a map file.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SoundKind::Normal),
            1 => Some(SoundKind::Clap),
            2 => Some(SoundKind::None),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            SoundKind::Normal => 0,
            SoundKind::Clap => 1,
            SoundKind::None => 2,
        }
    }
}

/// A scheduled target on the grid. Immutable once the map is loaded; per-session
/// armed state lives in [`crate::window::ActiveWindow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitObject {
    /// Track time at which the object should be struck, in ms.
    pub time_ms: i64,
    /// Row-major cell index, top-left is 0.
    pub position: usize,
    pub sound: SoundKind,
}

impl HitObject {
    pub fn new(time_ms: i64, position: usize, sound: SoundKind) -> Self {
        Self {
            time_ms,
            position,
            sound,
        }
    }

    /// (row, column) of the object on a grid of `GRID_SIZE` columns.
    pub fn cell(&self) -> (usize, usize) {
        (self.position / GRID_SIZE, self.position % GRID_SIZE)
    }
}

impl std::fmt::Display for HitObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.time_ms, self.position, self.sound.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_codes_roundtrip() {
        for kind in [SoundKind::Normal, SoundKind::Clap, SoundKind::None] {
            assert_eq!(SoundKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(SoundKind::from_code(7), None);
        assert_eq!(SoundKind::from_code(-1), None);
    }

    #[test]
    fn cell_is_row_major() {
        assert_eq!(HitObject::new(0, 0, SoundKind::Normal).cell(), (0, 0));
        assert_eq!(HitObject::new(0, 5, SoundKind::Normal).cell(), (1, 2));
        assert_eq!(HitObject::new(0, 7, SoundKind::Normal).cell(), (2, 1));
    }

    #[test]
    fn display_matches_map_line() {
        let h = HitObject::new(1500, 4, SoundKind::Clap);
        assert_eq!(h.to_string(), "1500,4,1");
    }
}

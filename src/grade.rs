use serde::{Deserialize, Serialize};

use crate::judgment::{GOOD_POINTS, OKAY_POINTS, PERFECT_POINTS};

/// Minimum accuracy, in percent, for each grade. S additionally needs zero misses.
pub const REQ_S: f32 = 90.0;
pub const REQ_A: f32 = 85.0;
pub const REQ_B: f32 = 70.0;
pub const REQ_C: f32 = 55.0;
pub const REQ_D: f32 = 40.0;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// First matching threshold wins.
    pub fn from_accuracy(accuracy: f32, misses: u32) -> Self {
        if accuracy >= REQ_S && misses == 0 {
            Grade::S
        } else if accuracy >= REQ_A {
            Grade::A
        } else if accuracy >= REQ_B {
            Grade::B
        } else if accuracy >= REQ_C {
            Grade::C
        } else if accuracy >= REQ_D {
            Grade::D
        } else {
            Grade::F
        }
    }
}

/// Weighted accuracy in percent; 0 when nothing has been judged.
pub fn accuracy_percent(perfect: u32, good: u32, okay: u32, miss: u32) -> f32 {
    let judged = u64::from(perfect) + u64::from(good) + u64::from(okay) + u64::from(miss);
    if judged == 0 {
        return 0.0;
    }
    let earned = i64::from(perfect) * PERFECT_POINTS
        + i64::from(good) * GOOD_POINTS
        + i64::from(okay) * OKAY_POINTS;
    (earned as f64 * 100.0 / (judged as i64 * PERFECT_POINTS) as f64) as f32
}

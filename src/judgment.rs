use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) of |offset| for each tier, in ms.
pub const PERFECT_WINDOW_MS: i64 = 50;
pub const GOOD_WINDOW_MS: i64 = 200;
pub const OKAY_WINDOW_MS: i64 = 375;

pub const PERFECT_POINTS: i64 = 50;
pub const GOOD_POINTS: i64 = 25;
pub const OKAY_POINTS: i64 = 10;

/// Timing quality of a resolved hit. Variants are ordered best to worst, so
/// `a < b` means `a` is the better tier.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum Tier {
    Perfect,
    Good,
    Okay,
    Miss,
}

impl Tier {
    /// Tier for an absolute timing error.
    pub fn from_abs_offset(d: i64) -> Self {
        if d < PERFECT_WINDOW_MS {
            Tier::Perfect
        } else if d < GOOD_WINDOW_MS {
            Tier::Good
        } else if d < OKAY_WINDOW_MS {
            Tier::Okay
        } else {
            Tier::Miss
        }
    }

    pub fn points(self) -> i64 {
        match self {
            Tier::Perfect => PERFECT_POINTS,
            Tier::Good => GOOD_POINTS,
            Tier::Okay => OKAY_POINTS,
            Tier::Miss => 0,
        }
    }

    /// Health change applied once per judgment of this tier.
    pub fn health_delta(self) -> f32 {
        match self {
            Tier::Perfect => 10.0,
            Tier::Good => 5.0,
            Tier::Okay => 1.0,
            Tier::Miss => -2.0,
        }
    }

    pub fn is_hit(self) -> bool {
        self != Tier::Miss
    }
}

/// Outcome of classifying one attempt against one scheduled time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Judgment {
    pub tier: Tier,
    pub points: i64,
    pub health_delta: f32,
    /// Signed error, negative when early.
    pub offset_ms: i64,
}

/// Classifies a hit attempt. Both times are track positions in ms.
pub fn classify(attempt_ms: i64, scheduled_ms: i64) -> Judgment {
    let offset_ms = attempt_ms - scheduled_ms;
    let tier = Tier::from_abs_offset(offset_ms.abs());
    Judgment {
        tier,
        points: tier.points(),
        health_delta: tier.health_delta(),
        offset_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundaries_favor_stricter_tier() {
        let cases = [
            (0, Tier::Perfect),
            (49, Tier::Perfect),
            (50, Tier::Good),
            (199, Tier::Good),
            (200, Tier::Okay),
            (374, Tier::Okay),
            (375, Tier::Miss),
            (5_000, Tier::Miss),
        ];
        for (d, tier) in cases {
            assert_eq!(classify(1000 + d, 1000).tier, tier, "late by {d}");
            assert_eq!(classify(1000 - d, 1000).tier, tier, "early by {d}");
        }
    }

    #[test]
    fn points_and_health_follow_tier() {
        let j = classify(1010, 1000);
        assert_eq!(j.points, 50);
        assert_eq!(j.health_delta, 10.0);
        assert_eq!(j.offset_ms, 10);

        let j = classify(900, 1000);
        assert_eq!(j.tier, Tier::Good);
        assert_eq!(j.points, 25);
        assert_eq!(j.health_delta, 5.0);
        assert_eq!(j.offset_ms, -100);

        let j = classify(1300, 1000);
        assert_eq!((j.points, j.health_delta), (10, 1.0));

        let j = classify(2000, 1000);
        assert_eq!((j.points, j.health_delta), (0, -2.0));
    }

    #[test]
    fn tier_order_is_best_first() {
        assert!(Tier::Perfect < Tier::Good);
        assert!(Tier::Good < Tier::Okay);
        assert!(Tier::Okay < Tier::Miss);
        assert!(!Tier::Miss.is_hit());
        assert!(Tier::Okay.is_hit());
    }

    proptest! {
        #[test]
        fn classifier_is_monotonic(a in 0i64..2_000, b in 0i64..2_000) {
            let (d1, d2) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(d1, 0).tier <= classify(d2, 0).tier);
        }

        #[test]
        fn classifier_is_symmetric(t in -10_000i64..10_000, d in 0i64..1_000) {
            prop_assert_eq!(classify(t + d, t).tier, classify(t - d, t).tier);
        }
    }
}

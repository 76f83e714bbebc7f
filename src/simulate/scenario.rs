//! Scenario selection.
//!
//! The ambient scenario changes on its own randomized timer, independent of
//! the drift tick. Both the draw-to-scenario mapping and the interval draw
//! are exposed separately so they can be tested without a runtime.

use std::time::Duration;

use rand::Rng;

use crate::model::RiskScenario;

/// Draws below this select LOW.
const LOW_CUTOFF: f64 = 0.3;
/// Draws below this (and at or above `LOW_CUTOFF`) select NORMAL.
const NORMAL_CUTOFF: f64 = 0.7;

/// Maps a uniform draw in [0, 1) to a scenario.
pub fn scenario_from_draw(draw: f64) -> RiskScenario {
    if draw < LOW_CUTOFF {
        RiskScenario::Low
    } else if draw < NORMAL_CUTOFF {
        RiskScenario::Normal
    } else {
        RiskScenario::High
    }
}

/// Picks the next scenario.
pub fn select_scenario<R: Rng + ?Sized>(rng: &mut R) -> RiskScenario {
    scenario_from_draw(rng.gen_range(0.0..1.0))
}

/// Delay until the next scenario change, uniform in `[min, max)`.
///
/// Collapses to `min` when the range is empty.
pub fn next_delay<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    if max_ms <= min_ms {
        return min;
    }
    Duration::from_millis(rng.gen_range(min_ms..max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_draw_thresholds() {
        assert_eq!(scenario_from_draw(0.0), RiskScenario::Low);
        assert_eq!(scenario_from_draw(0.2999), RiskScenario::Low);
        assert_eq!(scenario_from_draw(0.3), RiskScenario::Normal);
        assert_eq!(scenario_from_draw(0.6999), RiskScenario::Normal);
        assert_eq!(scenario_from_draw(0.7), RiskScenario::High);
        assert_eq!(scenario_from_draw(0.9999), RiskScenario::High);
    }

    #[test]
    fn test_delays_stay_within_ten_to_twenty_seconds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            let d = next_delay(&mut rng, Duration::from_secs(10), Duration::from_secs(20));
            assert!(d >= Duration::from_secs(10), "{:?} below minimum", d);
            assert!(d < Duration::from_secs(20), "{:?} at or above maximum", d);
        }
    }

    #[test]
    fn test_empty_range_collapses_to_min() {
        let mut rng = StdRng::seed_from_u64(3);
        let d = next_delay(&mut rng, Duration::from_secs(15), Duration::from_secs(15));
        assert_eq!(d, Duration::from_secs(15));
        let d = next_delay(&mut rng, Duration::from_secs(15), Duration::from_secs(5));
        assert_eq!(d, Duration::from_secs(15));
    }

    #[test]
    fn test_selection_produces_every_scenario() {
        let mut rng = StdRng::seed_from_u64(11);
        let picks: Vec<_> = (0..500).map(|_| select_scenario(&mut rng)).collect();
        for s in [RiskScenario::Low, RiskScenario::Normal, RiskScenario::High] {
            assert!(picks.contains(&s), "{} never selected in 500 draws", s);
        }
    }
}

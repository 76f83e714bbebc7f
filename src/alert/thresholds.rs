//! GLOF risk scoring and level thresholds.
//!
//! Turns a `SensorReading` into a `RiskAssessment`: each scored sensor is
//! normalized against its domain ceiling, the normalized factors are
//! combined with the registry weights, and the resulting probability is
//! bucketed into a risk level.

use rand::Rng;

use crate::model::{RiskAssessment, RiskLevel, SensorReading};
use crate::sensors::scored_sensors;

/// Probability (percent) at or above which the level is HIGH.
pub const HIGH_THRESHOLD: f64 = 70.0;

/// Probability (percent) at or above which the level is MODERATE.
pub const MODERATE_THRESHOLD: f64 = 40.0;

/// Normalizes a raw value against its ceiling, clamped to [0, 1].
pub fn normalize(value: f64, ceiling: f64) -> f64 {
    if ceiling <= 0.0 || value.is_nan() {
        return 0.0;
    }
    (value / ceiling).clamp(0.0, 1.0)
}

/// Weighted sum of the normalized sensor factors, as a percentage.
///
/// Temperature does not contribute. The result is clamped to [0, 100].
pub fn risk_probability(reading: &SensorReading) -> f64 {
    let total: f64 = scored_sensors()
        .map(|sensor| {
            let ceiling = sensor.ceiling.unwrap_or(f64::INFINITY);
            normalize(reading.get(sensor.field), ceiling) * sensor.weight
        })
        .sum();
    total.clamp(0.0, 100.0)
}

/// Buckets a probability into a risk level.
///
///   probability >= 70 → HIGH
///   probability >= 40 → MODERATE
///   otherwise         → LOW
pub fn classify_probability(probability: f64) -> RiskLevel {
    if probability >= HIGH_THRESHOLD {
        RiskLevel::High
    } else if probability >= MODERATE_THRESHOLD {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Recomputes the assessment for a reading.
///
/// Probability and level are a pure function of `reading`; confidence is
/// drawn from `rng` and carries no information about the estimate.
pub fn recompute<R: Rng + ?Sized>(reading: &SensorReading, rng: &mut R) -> RiskAssessment {
    let probability = risk_probability(reading);
    RiskAssessment {
        probability,
        risk_level: classify_probability(probability),
        confidence: rng.gen_range(85.0..95.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn reading(values: [f64; 7]) -> SensorReading {
        SensorReading {
            lake_area_km2: values[0],
            water_level_m: values[1],
            temperature_c: values[2],
            flow_rate_m3s: values[3],
            ground_movement_mm: values[4],
            dam_pressure_mpa: values[5],
            precipitation_mm: values[6],
        }
    }

    // --- Thresholds ---------------------------------------------------------

    #[test]
    fn test_seventy_is_high() {
        assert_eq!(classify_probability(70.0), RiskLevel::High);
    }

    #[test]
    fn test_forty_exactly_is_moderate() {
        assert_eq!(classify_probability(40.0), RiskLevel::Moderate);
        assert_eq!(classify_probability(69.99), RiskLevel::Moderate);
    }

    #[test]
    fn test_just_below_forty_is_low() {
        assert_eq!(classify_probability(39.99), RiskLevel::Low);
        assert_eq!(classify_probability(0.0), RiskLevel::Low);
    }

    // --- Probability --------------------------------------------------------

    #[test]
    fn test_initial_reading_scores_to_weighted_sum() {
        // Factors: lake 0.76, water 0.70, flow 0.6833, ground 0.42,
        // precip 0.65375, pressure 0.70.
        let p = risk_probability(&SensorReading::initial());
        let expected = 0.76 * 10.0
            + 0.70 * 25.0
            + (102.5 / 150.0) * 20.0
            + 0.42 * 20.0
            + (52.3 / 80.0) * 15.0
            + 0.70 * 10.0;
        assert!((p - expected).abs() < 1e-9, "expected {}, got {}", expected, p);
        assert!((p - 63.97).abs() < 0.01);
        assert_eq!(classify_probability(p), RiskLevel::Moderate);
    }

    #[test]
    fn test_temperature_does_not_affect_probability() {
        let cold = reading([1.0, 8.0, -20.0, 90.0, 1.0, 0.9, 30.0]);
        let hot = reading([1.0, 8.0, 45.0, 90.0, 1.0, 0.9, 30.0]);
        assert_eq!(risk_probability(&cold), risk_probability(&hot));
    }

    #[test]
    fn test_values_above_ceiling_saturate_at_one_hundred() {
        let extreme = reading([10.0, 100.0, 15.0, 1000.0, 50.0, 9.0, 500.0]);
        assert_eq!(risk_probability(&extreme), 100.0);
    }

    #[test]
    fn test_negative_and_nan_values_clamp_to_zero() {
        let broken = reading([-1.0, f64::NAN, 15.0, -5.0, -0.1, -2.0, -8.0]);
        assert_eq!(risk_probability(&broken), 0.0);
    }

    #[test]
    fn test_normalize_clamps() {
        assert_eq!(normalize(3.0, 2.0), 1.0);
        assert_eq!(normalize(-3.0, 2.0), 0.0);
        assert_eq!(normalize(1.0, 2.0), 0.5);
        assert_eq!(normalize(1.0, 0.0), 0.0);
    }

    // --- Recompute ----------------------------------------------------------

    #[test]
    fn test_recompute_is_idempotent_in_probability_and_level() {
        let mut rng = StdRng::seed_from_u64(7);
        let r = SensorReading::initial();
        let a = recompute(&r, &mut rng);
        let b = recompute(&r, &mut rng);
        assert_eq!(a.probability, b.probability);
        assert_eq!(a.risk_level, b.risk_level);
    }

    #[test]
    fn test_confidence_stays_in_cosmetic_band() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let a = recompute(&SensorReading::initial(), &mut rng);
            assert!(
                (85.0..95.0).contains(&a.confidence),
                "confidence {} outside [85, 95)",
                a.confidence
            );
        }
    }
}

//! Drift step.
//!
//! Each tick moves every sensor a tenth of the way toward its
//! scenario-dependent target, adds bounded noise, and clamps the result to
//! [0.6, 1.4] times the target.

use rand::Rng;

use crate::model::{RiskScenario, SensorReading, WeatherReading};
use crate::sensors::{SENSOR_REGISTRY, WEATHER_REGISTRY};

/// Fraction of the distance to target covered per tick.
pub const SMOOTHING: f64 = 0.1;

/// Lower clamp bound as a fraction of the target.
pub const LOWER_BOUND: f64 = 0.6;
/// Upper clamp bound as a fraction of the target.
pub const UPPER_BOUND: f64 = 1.4;

/// Clamp interval for a baseline under a scenario.
pub fn bounds(baseline: f64, scenario: RiskScenario) -> (f64, f64) {
    let target = baseline * scenario.baseline_factor();
    let (a, b) = (target * LOWER_BOUND, target * UPPER_BOUND);
    (a.min(b), a.max(b))
}

/// One drift update for a single value.
///
/// `unit_noise` is a draw from [-0.5, 0.5); it is scaled by the scenario
/// variance. Total: the result is always inside `bounds(baseline, scenario)`.
pub fn drift_value(
    current: f64,
    baseline: f64,
    variance: f64,
    scenario: RiskScenario,
    unit_noise: f64,
) -> f64 {
    let target = baseline * scenario.baseline_factor();
    let sigma = variance * scenario.variance_factor();
    let (lo, hi) = bounds(baseline, scenario);

    let next = current + (target - current) * SMOOTHING + unit_noise * sigma;
    if next.is_nan() {
        return target.clamp(lo, hi);
    }
    next.clamp(lo, hi)
}

fn unit_noise<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-0.5..0.5)
}

/// Applies one drift step to every sensor field.
pub fn drift_reading<R: Rng + ?Sized>(
    reading: &SensorReading,
    scenario: RiskScenario,
    rng: &mut R,
) -> SensorReading {
    let mut next = *reading;
    for sensor in SENSOR_REGISTRY {
        let value = drift_value(
            reading.get(sensor.field),
            sensor.baseline,
            sensor.variance,
            scenario,
            unit_noise(rng),
        );
        next.set(sensor.field, value);
    }
    next
}

/// Applies one drift step to the weather fields.
///
/// Weather is not tied to the lake scenario and always drifts around its
/// own nominal baselines.
pub fn drift_weather<R: Rng + ?Sized>(weather: &WeatherReading, rng: &mut R) -> WeatherReading {
    let mut next = *weather;
    for entry in WEATHER_REGISTRY {
        let value = drift_value(
            weather.get(entry.field),
            entry.baseline,
            entry.variance,
            RiskScenario::Normal,
            unit_noise(rng),
        );
        next.set(entry.field, value);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SensorField;
    use crate::sensors::find_sensor;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SCENARIOS: [RiskScenario; 3] =
        [RiskScenario::Low, RiskScenario::Normal, RiskScenario::High];

    #[test]
    fn test_targets_and_bounds_per_scenario() {
        let close = |(lo, hi): (f64, f64), (want_lo, want_hi): (f64, f64)| {
            (lo - want_lo).abs() < 1e-12 && (hi - want_hi).abs() < 1e-12
        };
        assert!(close(bounds(10.0, RiskScenario::Normal), (6.0, 14.0)));
        assert!(close(bounds(10.0, RiskScenario::Low), (3.0, 7.0)));
        assert!(close(bounds(10.0, RiskScenario::High), (9.0, 21.0)));
    }

    #[test]
    fn test_noiseless_step_covers_a_tenth_of_the_gap() {
        // 8.0 → target 10.0: gap 2.0, step 0.2.
        let next = drift_value(8.0, 10.0, 1.0, RiskScenario::Normal, 0.0);
        assert!((next - 8.2).abs() < 1e-12, "got {}", next);
    }

    #[test]
    fn test_noise_is_scaled_by_scenario_variance() {
        // At target, only noise moves the value: 0.5 * sigma'.
        let normal = drift_value(10.0, 10.0, 1.0, RiskScenario::Normal, 0.5);
        let high = drift_value(15.0, 10.0, 1.0, RiskScenario::High, 0.5);
        let low = drift_value(5.0, 10.0, 1.0, RiskScenario::Low, 0.5);
        assert!((normal - 10.5).abs() < 1e-12);
        assert!((high - 16.0).abs() < 1e-12);
        assert!((low - 5.25).abs() < 1e-12);
    }

    #[test]
    fn test_far_outliers_are_clamped() {
        let (lo, hi) = bounds(10.0, RiskScenario::Normal);
        assert_eq!(drift_value(1_000.0, 10.0, 1.0, RiskScenario::Normal, 0.4), hi);
        assert_eq!(drift_value(-50.0, 10.0, 1.0, RiskScenario::Normal, -0.4), lo);
        assert_eq!(drift_value(f64::NAN, 10.0, 1.0, RiskScenario::Normal, 0.0), 10.0);
    }

    #[test]
    fn test_every_field_stays_in_bounds_over_many_ticks() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut reading = SensorReading::initial();
        for step in 0..3_000 {
            let scenario = SCENARIOS[(step / 50) % 3];
            reading = drift_reading(&reading, scenario, &mut rng);
            for sensor in SENSOR_REGISTRY {
                let (lo, hi) = bounds(sensor.baseline, scenario);
                let v = reading.get(sensor.field);
                assert!(
                    v >= lo && v <= hi,
                    "step {}: {} = {} outside [{}, {}] under {}",
                    step, sensor.name, v, lo, hi, scenario
                );
            }
        }
    }

    #[test]
    fn test_forced_high_moves_every_field_into_high_band() {
        let mut rng = StdRng::seed_from_u64(99);
        // Start from the bottom of the LOW band.
        let mut reading = SensorReading::initial();
        for sensor in SENSOR_REGISTRY {
            reading.set(sensor.field, bounds(sensor.baseline, RiskScenario::Low).0);
        }
        for _ in 0..5 {
            reading = drift_reading(&reading, RiskScenario::High, &mut rng);
        }
        for sensor in SENSOR_REGISTRY {
            let (lo, hi) = bounds(sensor.baseline, RiskScenario::High);
            let v = reading.get(sensor.field);
            assert!(v >= lo && v <= hi, "{} = {} not in HIGH band [{}, {}]", sensor.name, v, lo, hi);
        }
    }

    #[test]
    fn test_sustained_high_converges_toward_target() {
        let mut rng = StdRng::seed_from_u64(5);
        let entry = find_sensor(SensorField::WaterLevel);
        let target = entry.baseline * 1.5;
        let mut reading = SensorReading::initial();
        for _ in 0..60 {
            reading = drift_reading(&reading, RiskScenario::High, &mut rng);
        }
        // 0.9^60 leaves < 0.2% of the initial gap; the rest is noise.
        let v = reading.get(SensorField::WaterLevel);
        assert!((v - target).abs() < entry.variance * 2.0 * 5.0, "water level {} far from {}", v, target);
    }

    #[test]
    fn test_weather_stays_near_its_own_baselines() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut weather = WeatherReading::initial();
        for _ in 0..500 {
            weather = drift_weather(&weather, &mut rng);
            for entry in WEATHER_REGISTRY {
                let v = weather.get(entry.field);
                assert!(v >= entry.baseline * 0.6 && v <= entry.baseline * 1.4, "{} = {}", entry.name, v);
            }
        }
    }
}

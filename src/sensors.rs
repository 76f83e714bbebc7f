/// Sensor registry for the GLOF monitoring service.
///
/// Defines the canonical list of simulated lake sensors, along with the
/// drift parameters and risk-scoring constants for each one. This is the
/// single source of truth for those numbers. The drift step and the risk
/// recompute both look fields up here rather than hardcoding constants.

use crate::model::{SensorField, WeatherField};

// ---------------------------------------------------------------------------
// Sensor metadata
// ---------------------------------------------------------------------------

/// Metadata for a single simulated sensor.
pub struct SensorSpec {
    pub field: SensorField,
    /// Human-readable name shown on the dashboard.
    pub name: &'static str,
    pub unit: &'static str,
    /// Nominal baseline the NORMAL scenario drifts toward.
    pub baseline: f64,
    /// Nominal per-tick noise amplitude.
    pub variance: f64,
    /// Domain ceiling used to normalize the value into [0, 1].
    /// `None` for sensors that do not contribute to the risk score.
    pub ceiling: Option<f64>,
    /// Contribution to the risk probability, in percentage points.
    pub weight: f64,
}

/// All simulated lake sensors, in display order.
pub static SENSOR_REGISTRY: &[SensorSpec] = &[
    SensorSpec {
        field: SensorField::LakeArea,
        name: "Lake Area",
        unit: "km²",
        baseline: 1.5,
        variance: 0.05,
        ceiling: Some(2.0),
        weight: 10.0,
    },
    SensorSpec {
        field: SensorField::WaterLevel,
        name: "Water Level",
        unit: "m",
        baseline: 10.0,
        variance: 0.3,
        ceiling: Some(15.0),
        weight: 25.0,
    },
    SensorSpec {
        field: SensorField::Temperature,
        name: "Temperature",
        unit: "°C",
        baseline: 15.0,
        variance: 0.8,
        ceiling: None, // shown, never scored
        weight: 0.0,
    },
    SensorSpec {
        field: SensorField::FlowRate,
        name: "Flow Rate",
        unit: "m³/s",
        baseline: 100.0,
        variance: 5.0,
        ceiling: Some(150.0),
        weight: 20.0,
    },
    SensorSpec {
        field: SensorField::GroundMovement,
        name: "Ground Movement",
        unit: "mm",
        baseline: 2.0,
        variance: 0.2,
        ceiling: Some(5.0),
        weight: 20.0,
    },
    SensorSpec {
        field: SensorField::DamPressure,
        name: "Dam Pressure",
        unit: "MPa",
        baseline: 1.0,
        variance: 0.05,
        ceiling: Some(1.5),
        weight: 10.0,
    },
    SensorSpec {
        field: SensorField::Precipitation,
        name: "Precipitation",
        unit: "mm",
        baseline: 50.0,
        variance: 3.0,
        ceiling: Some(80.0),
        weight: 15.0,
    },
];

/// Metadata for a weather display field.
pub struct WeatherSpec {
    pub field: WeatherField,
    pub name: &'static str,
    pub unit: &'static str,
    pub baseline: f64,
    pub variance: f64,
}

pub static WEATHER_REGISTRY: &[WeatherSpec] = &[
    WeatherSpec {
        field: WeatherField::Temperature,
        name: "Temperature",
        unit: "°C",
        baseline: 12.0,
        variance: 0.5,
    },
    WeatherSpec {
        field: WeatherField::Humidity,
        name: "Humidity",
        unit: "%",
        baseline: 65.0,
        variance: 2.0,
    },
    WeatherSpec {
        field: WeatherField::Wind,
        name: "Wind",
        unit: "km/h",
        baseline: 15.0,
        variance: 1.5,
    },
];

/// Looks up a sensor by field. Every `SensorField` has an entry.
pub fn find_sensor(field: SensorField) -> &'static SensorSpec {
    SENSOR_REGISTRY
        .iter()
        .find(|s| s.field == field)
        .unwrap_or(&SENSOR_REGISTRY[0])
}

/// Sensors that contribute to the risk probability.
pub fn scored_sensors() -> impl Iterator<Item = &'static SensorSpec> {
    SENSOR_REGISTRY.iter().filter(|s| s.ceiling.is_some())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

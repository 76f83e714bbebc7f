/// SensorReading, RiskScenario, RiskAssessment, Snapshot
/// core data structures shared by the estimator, the alert helpers and the
/// analysis client.
///
/// Core data types for the GLOF monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no timers and no I/O, only types and the field accessors
/// the drift step needs to walk a reading generically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Sensor fields
// ---------------------------------------------------------------------------

/// One of the seven simulated lake sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    LakeArea,
    WaterLevel,
    Temperature,
    FlowRate,
    GroundMovement,
    DamPressure,
    Precipitation,
}

impl SensorField {
    pub const ALL: [SensorField; 7] = [
        SensorField::LakeArea,
        SensorField::WaterLevel,
        SensorField::Temperature,
        SensorField::FlowRate,
        SensorField::GroundMovement,
        SensorField::DamPressure,
        SensorField::Precipitation,
    ];
}

/// One of the three weather display fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherField {
    Temperature,
    Humidity,
    Wind,
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A full set of simulated sensor values.
///
/// Serialized with the same keys the gateway uses for its sensors route so
/// the display collaborator can consume either source unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "lake_size_km2")]
    pub lake_area_km2: f64,
    pub water_level_m: f64,
    pub temperature_c: f64,
    pub flow_rate_m3s: f64,
    pub ground_movement_mm: f64,
    pub dam_pressure_mpa: f64,
    pub precipitation_mm: f64,
}

impl SensorReading {
    /// The reading shown before the first tick.
    pub fn initial() -> Self {
        SensorReading {
            lake_area_km2: 1.52,
            water_level_m: 10.5,
            temperature_c: 15.2,
            flow_rate_m3s: 102.5,
            ground_movement_mm: 2.1,
            dam_pressure_mpa: 1.05,
            precipitation_mm: 52.3,
        }
    }

    pub fn get(&self, field: SensorField) -> f64 {
        match field {
            SensorField::LakeArea => self.lake_area_km2,
            SensorField::WaterLevel => self.water_level_m,
            SensorField::Temperature => self.temperature_c,
            SensorField::FlowRate => self.flow_rate_m3s,
            SensorField::GroundMovement => self.ground_movement_mm,
            SensorField::DamPressure => self.dam_pressure_mpa,
            SensorField::Precipitation => self.precipitation_mm,
        }
    }

    pub fn set(&mut self, field: SensorField, value: f64) {
        let slot = match field {
            SensorField::LakeArea => &mut self.lake_area_km2,
            SensorField::WaterLevel => &mut self.water_level_m,
            SensorField::Temperature => &mut self.temperature_c,
            SensorField::FlowRate => &mut self.flow_rate_m3s,
            SensorField::GroundMovement => &mut self.ground_movement_mm,
            SensorField::DamPressure => &mut self.dam_pressure_mpa,
            SensorField::Precipitation => &mut self.precipitation_mm,
        };
        *slot = value;
    }
}

/// Weather values shown next to the sensor panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub wind_kmh: f64,
}

impl WeatherReading {
    pub fn initial() -> Self {
        WeatherReading {
            temperature_c: 12.0,
            humidity_percent: 65.0,
            wind_kmh: 15.0,
        }
    }

    pub fn get(&self, field: WeatherField) -> f64 {
        match field {
            WeatherField::Temperature => self.temperature_c,
            WeatherField::Humidity => self.humidity_percent,
            WeatherField::Wind => self.wind_kmh,
        }
    }

    pub fn set(&mut self, field: WeatherField, value: f64) {
        match field {
            WeatherField::Temperature => self.temperature_c = value,
            WeatherField::Humidity => self.humidity_percent = value,
            WeatherField::Wind => self.wind_kmh = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario and risk types
// ---------------------------------------------------------------------------

/// Coarse ambient state biasing every simulated sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskScenario {
    Low,
    Normal,
    High,
}

impl RiskScenario {
    /// Multiplier applied to a field's nominal baseline.
    pub fn baseline_factor(self) -> f64 {
        match self {
            RiskScenario::Low => 0.5,
            RiskScenario::Normal => 1.0,
            RiskScenario::High => 1.5,
        }
    }

    /// Multiplier applied to a field's nominal variance.
    pub fn variance_factor(self) -> f64 {
        match self {
            RiskScenario::Low => 0.5,
            RiskScenario::Normal => 1.0,
            RiskScenario::High => 2.0,
        }
    }
}

impl fmt::Display for RiskScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskScenario::Low => write!(f, "LOW"),
            RiskScenario::Normal => write!(f, "NORMAL"),
            RiskScenario::High => write!(f, "HIGH"),
        }
    }
}

/// Risk levels of the estimator, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn message(self) -> &'static str {
        match self {
            RiskLevel::High => "High Risk of GLOF - Immediate action recommended",
            RiskLevel::Moderate => "Moderate Risk - Monitor closely",
            RiskLevel::Low => "Low Risk - Normal conditions",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Moderate => write!(f, "MODERATE"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Derived from the latest `SensorReading` on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Percentage in [0, 100].
    pub probability: f64,
    pub risk_level: RiskLevel,
    /// Cosmetic, drawn from [85, 95). Not derived from the inputs.
    pub confidence: f64,
}

/// Risk level reported by one of the analysis services.
///
/// Wider than `RiskLevel`: the SAR classifier can report CRITICAL, and
/// the motion service reports UNKNOWN when it analyzed no frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportedLevel {
    Low,
    Moderate,
    High,
    Critical,
    Unknown,
}

impl ReportedLevel {
    pub fn parse(raw: &str) -> ReportedLevel {
        match raw.trim().to_ascii_uppercase().as_str() {
            "LOW" => ReportedLevel::Low,
            "MODERATE" | "MEDIUM" => ReportedLevel::Moderate,
            "HIGH" => ReportedLevel::High,
            "CRITICAL" => ReportedLevel::Critical,
            _ => ReportedLevel::Unknown,
        }
    }
}

impl fmt::Display for ReportedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportedLevel::Low => write!(f, "LOW"),
            ReportedLevel::Moderate => write!(f, "MODERATE"),
            ReportedLevel::High => write!(f, "HIGH"),
            ReportedLevel::Critical => write!(f, "CRITICAL"),
            ReportedLevel::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Published snapshot
// ---------------------------------------------------------------------------

/// Everything the estimator publishes after a tick, for read-only use by
/// the display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub reading: SensorReading,
    pub weather: WeatherReading,
    pub assessment: RiskAssessment,
    pub scenario: RiskScenario,
    /// Number of drift steps applied so far; 0 before the first tick.
    pub tick: u64,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when loading the service configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io(String),
    /// The file contents are not valid TOML for `Config`.
    ParseError(String),
    /// A value parsed but violates a constraint (e.g. min > max interval).
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

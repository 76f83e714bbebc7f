/// Service configuration.
///
/// Loaded from a TOML file (`glofmon.toml` by default). Every section and
/// field has a default, so a missing file or a partial file is fine. Two
/// values can be overridden from the environment (or a `.env` file loaded
/// by the binary):
///
/// - `GLOF_GATEWAY_URL`: base URL of the API gateway.
/// - `ALERT_PHONE_NUMBERS`: comma-separated alert recipients.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::alert::evacuation::{Coordinates, SafeLocation, default_safe_locations};
use crate::model::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "./glofmon.toml";

/// Longest accepted tick or scenario interval (one day). Timer deadlines
/// are computed as `now + interval`, which must not overflow.
pub const MAX_INTERVAL_SECS: u64 = 86_400;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSettings {
    /// Drift period.
    pub tick_secs: u64,
    /// Scenario reselection interval, drawn from [min, max).
    pub scenario_min_secs: u64,
    pub scenario_max_secs: u64,
    /// Fixed RNG seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        EstimatorSettings {
            tick_secs: 2,
            scenario_min_secs: 10,
            scenario_max_secs: 20,
            seed: None,
        }
    }
}

impl EstimatorSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    pub fn scenario_interval(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.scenario_min_secs),
            Duration::from_secs(self.scenario_max_secs),
        )
    }
}

/// Base URLs of the backend services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub gateway_url: String,
    pub glof_url: String,
    pub sar_url: String,
    pub lake_url: String,
    pub terrain_url: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            gateway_url: "http://localhost:8000".to_string(),
            glof_url: "http://localhost:8001".to_string(),
            sar_url: "http://localhost:8002".to_string(),
            lake_url: "http://localhost:8003".to_string(),
            terrain_url: "http://localhost:8004".to_string(),
        }
    }
}

impl ServiceSettings {
    /// (name, base URL) for every backend behind the gateway.
    pub fn backends(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("glof", self.glof_url.as_str()),
            ("sar", self.sar_url.as_str()),
            ("lake", self.lake_url.as_str()),
            ("terrain", self.terrain_url.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// The monitored lake.
    pub risk_latitude: f64,
    pub risk_longitude: f64,
    pub safe_locations: Vec<SafeLocation>,
    /// Filled from `ALERT_PHONE_NUMBERS`, never from the file.
    #[serde(skip)]
    pub recipients: Vec<String>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        AlertSettings {
            risk_latitude: 30.7466,
            risk_longitude: 79.0669,
            safe_locations: default_safe_locations(),
            recipients: Vec::new(),
        }
    }
}

impl AlertSettings {
    pub fn risk_location(&self) -> Coordinates {
        Coordinates::new(self.risk_latitude, self.risk_longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub estimator: EstimatorSettings,
    pub services: ServiceSettings,
    pub alert: AlertSettings,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Loads the configuration from `path`, falling back to defaults when the
/// file does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    parse_config(&contents)
}

/// Parses and validates TOML text.
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let config: Config =
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let e = &config.estimator;
    if e.tick_secs == 0 {
        return Err(ConfigError::Invalid("estimator.tick_secs must be at least 1".to_string()));
    }
    if e.scenario_min_secs == 0 {
        return Err(ConfigError::Invalid(
            "estimator.scenario_min_secs must be at least 1".to_string(),
        ));
    }
    for (key, value) in [("tick_secs", e.tick_secs), ("scenario_max_secs", e.scenario_max_secs)] {
        if value > MAX_INTERVAL_SECS {
            return Err(ConfigError::Invalid(format!(
                "estimator.{} ({}) exceeds the {}s limit",
                key, value, MAX_INTERVAL_SECS
            )));
        }
    }
    if e.scenario_min_secs > e.scenario_max_secs {
        return Err(ConfigError::Invalid(format!(
            "estimator.scenario_min_secs ({}) exceeds scenario_max_secs ({})",
            e.scenario_min_secs, e.scenario_max_secs
        )));
    }

    let a = &config.alert;
    if !(-90.0..=90.0).contains(&a.risk_latitude) || !(-180.0..=180.0).contains(&a.risk_longitude) {
        return Err(ConfigError::Invalid(format!(
            "alert risk location ({}, {}) is not a valid coordinate",
            a.risk_latitude, a.risk_longitude
        )));
    }
    Ok(())
}

impl Config {
    /// Applies environment overrides through `lookup` (normally
    /// `std::env::var(..).ok()`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GLOF_GATEWAY_URL").filter(|u| !u.trim().is_empty()) {
            self.services.gateway_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(numbers) = lookup("ALERT_PHONE_NUMBERS") {
            self.alert.recipients = parse_phone_numbers(&numbers);
        }
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }
}

/// Splits a comma-separated recipient list, dropping blanks.
pub fn parse_phone_numbers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse_config("").expect("empty TOML is valid");
        assert_eq!(config, Config::default());
        assert_eq!(config.estimator.tick(), Duration::from_secs(2));
        assert_eq!(config.alert.safe_locations.len(), 3);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            [estimator]
            seed = 42

            [services]
            sar_url = "http://sar.internal:9002"
            "#,
        )
        .expect("valid config");
        assert_eq!(config.estimator.seed, Some(42));
        assert_eq!(config.estimator.scenario_max_secs, 20);
        assert_eq!(config.services.sar_url, "http://sar.internal:9002");
        assert_eq!(config.services.gateway_url, "http://localhost:8000");
    }

    #[test]
    fn test_custom_safe_locations_replace_defaults() {
        let config = parse_config(
            r#"
            [alert]
            risk_latitude = 27.9
            risk_longitude = 86.9

            [[alert.safe_locations]]
            name = "Namche Bazaar"
            latitude = 27.8069
            longitude = 86.7140
            "#,
        )
        .expect("valid config");
        assert_eq!(config.alert.safe_locations.len(), 1);
        assert_eq!(config.alert.safe_locations[0].name, "Namche Bazaar");
        assert_eq!(config.alert.risk_location(), Coordinates::new(27.9, 86.9));
    }

    #[test]
    fn test_zero_tick_is_rejected() {
        let err = parse_config("[estimator]\ntick_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {:?}", err);
    }

    #[test]
    fn test_intervals_longer_than_a_day_are_rejected() {
        let err = parse_config("[estimator]\ntick_secs = 9223372036854775807\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {:?}", err);
        assert!(err.to_string().contains("tick_secs"), "got {}", err);

        let err = parse_config("[estimator]\nscenario_max_secs = 86401\n").unwrap_err();
        assert!(err.to_string().contains("scenario_max_secs"), "got {}", err);

        // Both bounds are inclusive of exactly one day.
        let config = parse_config(
            "[estimator]\ntick_secs = 86400\nscenario_min_secs = 86400\nscenario_max_secs = 86400\n",
        )
        .expect("one day is allowed");
        assert_eq!(config.estimator.tick() * 3, Duration::from_secs(3 * MAX_INTERVAL_SECS));
    }

    #[test]
    fn test_inverted_scenario_interval_is_rejected() {
        let err = parse_config("[estimator]\nscenario_min_secs = 30\nscenario_max_secs = 10\n")
            .unwrap_err();
        assert!(err.to_string().contains("exceeds"), "got {}", err);
    }

    #[test]
    fn test_out_of_range_risk_location_is_rejected() {
        let err = parse_config("[alert]\nrisk_latitude = 123.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = parse_config("[estimator\ntick_secs = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config("./definitely-not-here.toml").expect("missing file falls back");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "GLOF_GATEWAY_URL" => Some("http://gateway.example:8000/".to_string()),
            "ALERT_PHONE_NUMBERS" => Some(" +911234567890, ,+919876543210 ".to_string()),
            _ => None,
        });
        assert_eq!(config.services.gateway_url, "http://gateway.example:8000");
        assert_eq!(config.alert.recipients, vec!["+911234567890", "+919876543210"]);
    }

    #[test]
    fn test_blank_gateway_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "GLOF_GATEWAY_URL").then(|| "  ".to_string()));
        assert_eq!(config.services.gateway_url, "http://localhost:8000");
    }
}

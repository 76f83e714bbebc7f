//! Evacuation guidance for GLOF alerts.
//!
//! Finds the nearest configured safe location for a risk location, builds
//! map links, and assembles the alert text and the preview record shown
//! before anything is sent. Delivery (SMS) is not handled here.

use serde::{Deserialize, Serialize};

use crate::model::RiskAssessment;

/// Mean Earth radius used for great-circle distances, in kilometres.
const EARTH_RADIUS_KM: f64 = 6_371.0088;

/// A (latitude, longitude) pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates { latitude, longitude }
    }
}

/// An evacuation point from the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl SafeLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Safe locations downstream of Kedarnath used when none are configured.
pub fn default_safe_locations() -> Vec<SafeLocation> {
    [
        ("Gaurikund", 30.6603, 79.0327),
        ("Sonprayag", 30.61171, 78.97866),
        ("Rudraprayag", 30.284414, 78.981140),
    ]
    .into_iter()
    .map(|(name, latitude, longitude)| SafeLocation {
        name: name.to_string(),
        latitude,
        longitude,
    })
    .collect()
}

/// The closest safe location to a risk location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestLocation {
    pub name: String,
    pub coordinates: Coordinates,
    /// Rounded to two decimals.
    pub distance_km: f64,
    pub map_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskLocation {
    pub coordinates: Coordinates,
    pub map_link: String,
}

/// What an alert would contain, without sending it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertPreview {
    pub probability: f64,
    pub risk_location: RiskLocation,
    pub nearest_safe_location: Option<NearestLocation>,
    pub configured_recipients: usize,
}

/// Google Maps link for a coordinate pair.
pub fn map_link(coordinates: Coordinates) -> String {
    format!(
        "https://www.google.com/maps?q={},{}",
        coordinates.latitude, coordinates.longitude
    )
}

/// Great-circle (haversine) distance in kilometres.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Returns the safe location closest to `from`, or `None` if the list is
/// empty. Ties keep the first location in list order.
pub fn nearest_safe_location(
    from: Coordinates,
    locations: &[SafeLocation],
) -> Option<NearestLocation> {
    let mut best: Option<(&SafeLocation, f64)> = None;
    for location in locations {
        let d = distance_km(from, location.coordinates());
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((location, d));
        }
    }

    best.map(|(location, d)| NearestLocation {
        name: location.name.clone(),
        coordinates: location.coordinates(),
        distance_km: round2(d),
        map_link: map_link(location.coordinates()),
    })
}

/// Default alert text for an assessment.
pub fn compose_alert_message(assessment: &RiskAssessment) -> String {
    format!(
        "GLOF ALERT! Risk Probability: {:.2}%\nRisk Level: {}\nImmediate evacuation recommended!",
        assessment.probability, assessment.risk_level
    )
}

/// Appends the risk location and evacuation guidance to a base message.
pub fn compose_full_message(
    base: &str,
    risk_location: Coordinates,
    nearest: Option<&NearestLocation>,
) -> String {
    let mut message = format!(
        "{}\nRisk Location: ({}, {})\nView on Map: {}",
        base,
        risk_location.latitude,
        risk_location.longitude,
        map_link(risk_location)
    );

    if let Some(n) = nearest {
        message.push_str(&format!(
            "\n\nNearest Safe Location: {}\nDistance: {} km\nEvacuation Map: {}",
            n.name, n.distance_km, n.map_link
        ));
    }
    message
}

/// Builds the preview record for the current assessment.
pub fn prepare_alert_preview(
    assessment: &RiskAssessment,
    risk_location: Coordinates,
    locations: &[SafeLocation],
    configured_recipients: usize,
) -> AlertPreview {
    AlertPreview {
        probability: assessment.probability,
        risk_location: RiskLocation {
            coordinates: risk_location,
            map_link: map_link(risk_location),
        },
        nearest_safe_location: nearest_safe_location(risk_location, locations),
        configured_recipients,
    }
}

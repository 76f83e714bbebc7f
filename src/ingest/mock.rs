//! Fixed mock results.
//!
//! Returned in place of a real service response whenever the call fails.
//! Every literal carries `"mock": true` so the display can badge it.

use serde_json::{Value, json};

use crate::ingest::analyze::{AnalyzeEndpoint, GlofRoute};

/// The mock literal for an analyze endpoint.
pub fn mock_for(endpoint: AnalyzeEndpoint) -> Value {
    match endpoint {
        AnalyzeEndpoint::Sar => json!({
            "success": true,
            "predicted_class": "pre_glof",
            "confidence": 78.5,
            "glof_probability": 15.2,
            "risk_level": "LOW",
            "mock": true
        }),
        AnalyzeEndpoint::Lake => json!({
            "success": true,
            "lake": {"size_before_m2": 15000, "size_after_m2": 15200, "change_percent": 1.3},
            "ice": {"size_before_m2": 8000, "size_after_m2": 7800, "change_percent": -2.5},
            "risk": {"level": "LOW", "message": "Lake conditions stable"},
            "mock": true
        }),
        AnalyzeEndpoint::Dem => json!({
            "success": true,
            "water_flow": {"submerged_area_m2": 5000, "overflow_rate_m3_per_s": 250},
            "risk": {"level": "MODERATE", "message": "Moderate water flow"},
            "mock": true
        }),
        AnalyzeEndpoint::Motion => json!({
            "success": true,
            "analysis": {"frames_analyzed": 50, "avg_flow_volume_m3": 2.5},
            "risk": {"level": "LOW", "message": "Normal water motion"},
            "mock": true
        }),
    }
}

/// The mock literal for a GLOF prediction-service route.
pub fn glof_mock_for(route: GlofRoute) -> Value {
    match route {
        GlofRoute::Predict => glof_prediction_mock(),
        GlofRoute::Sensors => sensors_mock(),
    }
}

/// Mock for the GLOF prediction route.
pub fn glof_prediction_mock() -> Value {
    json!({
        "probability": 23.5,
        "risk_level": "MODERATE",
        "confidence": 87.2,
        "timestamp": "2026-02-07T10:00:00Z",
        "mock": true
    })
}

/// Mock for the sensors route.
pub fn sensors_mock() -> Value {
    json!({
        "lake_size_km2": 1.52,
        "water_level_m": 10.3,
        "temperature_c": 14.7,
        "flow_rate_m3s": 105.2,
        "ground_movement_mm": 2.1,
        "dam_pressure_mpa": 1.02,
        "precipitation_mm": 48.5,
        "mock": true
    })
}

/// Risk levels for analysis results.
///
/// The analysis services normally report a level themselves (`risk.level`
/// or, for SAR, `risk_level`). When a result lacks one, the level is
/// derived from its metrics with the same cut-offs the services use.

use serde_json::Value;

use crate::ingest::analyze::AnalyzeEndpoint;
use crate::model::ReportedLevel;

// ---------------------------------------------------------------------------
// Per-service rules
// ---------------------------------------------------------------------------

/// Lake expansion: percentage growth of the lake and share of the frame
/// covered by water.
pub fn lake_risk(change_percent: f64, water_percentage: f64) -> (ReportedLevel, &'static str) {
    if change_percent > 20.0 || water_percentage > 60.0 {
        (ReportedLevel::High, "Significant lake expansion detected - High GLOF risk")
    } else if change_percent > 10.0 || water_percentage > 40.0 {
        (ReportedLevel::Moderate, "Notable lake changes - Monitor closely")
    } else {
        (ReportedLevel::Low, "Lake conditions stable")
    }
}

/// DEM flow: overflow rate (m³/s) and mean flow velocity (m/s).
pub fn dem_risk(overflow_rate: f64, flow_velocity: f64) -> (ReportedLevel, &'static str) {
    if overflow_rate > 1000.0 || flow_velocity > 0.5 {
        (ReportedLevel::High, "High water flow detected - Significant flood risk")
    } else if overflow_rate > 500.0 || flow_velocity > 0.3 {
        (ReportedLevel::Moderate, "Moderate water flow - Monitor conditions")
    } else {
        (ReportedLevel::Low, "Normal water flow conditions")
    }
}

/// Video motion: mean flow volume (m³) and mean velocity per frame pair.
pub fn motion_risk(avg_volume: f64, avg_velocity: f64) -> (ReportedLevel, &'static str) {
    if avg_volume > 10.0 || avg_velocity > 5.0 {
        (ReportedLevel::High, "Significant water motion detected - High flood risk")
    } else if avg_volume > 5.0 || avg_velocity > 2.0 {
        (ReportedLevel::Moderate, "Notable water motion - Monitor closely")
    } else {
        (ReportedLevel::Low, "Normal water motion levels")
    }
}

/// SAR classifier output class.
pub fn sar_class_risk(predicted_class: &str) -> Option<(ReportedLevel, &'static str)> {
    match predicted_class {
        "pre_glof" => Some((ReportedLevel::Low, "Normal conditions - Pre-GLOF state")),
        "during_glof" => Some((
            ReportedLevel::Critical,
            "GLOF IN PROGRESS - Immediate evacuation required!",
        )),
        "post_glof" => Some((
            ReportedLevel::Moderate,
            "Post-GLOF conditions - Monitor for secondary events",
        )),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Result inspection
// ---------------------------------------------------------------------------

fn number_at(result: &Value, pointer: &str) -> Option<f64> {
    result.pointer(pointer).and_then(Value::as_f64)
}

/// The level stated by the result itself, if any.
pub fn stated_level(result: &Value) -> Option<ReportedLevel> {
    result
        .pointer("/risk/level")
        .or_else(|| result.get("risk_level"))
        .and_then(Value::as_str)
        .map(ReportedLevel::parse)
}

/// Level of a result plus the message to show with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskReport {
    pub level: ReportedLevel,
    pub message: Option<String>,
}

/// What a result stands for: its stated level (with `risk.message` when
/// present), else the level and message derived from its metrics, else
/// UNKNOWN with no message.
pub fn risk_report(endpoint: AnalyzeEndpoint, result: &Value) -> RiskReport {
    if let Some(level) = stated_level(result) {
        let message = result
            .pointer("/risk/message")
            .and_then(Value::as_str)
            .map(String::from);
        return RiskReport { level, message };
    }
    match derived_risk(endpoint, result) {
        Some((level, message)) => RiskReport {
            level,
            message: Some(message.to_string()),
        },
        None => RiskReport {
            level: ReportedLevel::Unknown,
            message: None,
        },
    }
}

pub fn reported_level(endpoint: AnalyzeEndpoint, result: &Value) -> ReportedLevel {
    risk_report(endpoint, result).level
}

fn derived_risk(endpoint: AnalyzeEndpoint, result: &Value) -> Option<(ReportedLevel, &'static str)> {
    match endpoint {
        AnalyzeEndpoint::Lake => {
            let change = number_at(result, "/lake/change_percent")?;
            let water = number_at(result, "/coverage/water_percentage").unwrap_or(0.0);
            Some(lake_risk(change, water))
        }
        AnalyzeEndpoint::Dem => {
            let overflow = number_at(result, "/water_flow/overflow_rate_m3_per_s")?;
            let velocity = number_at(result, "/water_flow/avg_flow_velocity_m_per_s").unwrap_or(0.0);
            Some(dem_risk(overflow, velocity))
        }
        AnalyzeEndpoint::Motion => {
            if number_at(result, "/analysis/frames_analyzed") == Some(0.0) {
                return Some((ReportedLevel::Unknown, "No frames analyzed"));
            }
            let volume = number_at(result, "/analysis/avg_flow_volume_m3")?;
            let velocity = number_at(result, "/analysis/avg_flow_velocity").unwrap_or(0.0);
            Some(motion_risk(volume, velocity))
        }
        AnalyzeEndpoint::Sar => {
            let class = result.get("predicted_class").and_then(Value::as_str)?;
            sar_class_risk(class)
        }
    }
}

/// Upload-analyze client for the GLOF analysis services.
///
/// Posts a file to one of the four analysis routes on the API gateway and
/// reports what happened as an `AnalyzeOutcome`. Callers that only want
/// something to display use `AnalyzeOutcome::into_display`, which swaps
/// every failure for the endpoint's mock literal.
///
/// Gateway routes (see the gateway's `/api/*` table):
///   POST /api/sar/analyze             SAR image classifier      30 s
///   POST /api/lake/analyze            lake/ice size from image  30 s
///   POST /api/terrain/dem/analyze     DEM water-flow analysis   30 s
///   POST /api/terrain/motion/analyze  water motion from video   60 s
///   GET  /api/glof/predict            current GLOF prediction   10 s
///   GET  /api/glof/sensors            current sensor values     10 s

use reqwest::blocking::multipart::{Form, Part};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::ingest::mock::{glof_mock_for, mock_for};
use crate::logging::{self, Component};

// ============================================================================
// Endpoints
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzeEndpoint {
    Sar,
    Lake,
    Dem,
    Motion,
}

impl AnalyzeEndpoint {
    pub const ALL: [AnalyzeEndpoint; 4] = [
        AnalyzeEndpoint::Sar,
        AnalyzeEndpoint::Lake,
        AnalyzeEndpoint::Dem,
        AnalyzeEndpoint::Motion,
    ];

    /// Route on the gateway.
    pub fn path(self) -> &'static str {
        match self {
            AnalyzeEndpoint::Sar => "/api/sar/analyze",
            AnalyzeEndpoint::Lake => "/api/lake/analyze",
            AnalyzeEndpoint::Dem => "/api/terrain/dem/analyze",
            AnalyzeEndpoint::Motion => "/api/terrain/motion/analyze",
        }
    }

    /// Video analysis gets twice the budget of the image routes.
    pub fn timeout(self) -> Duration {
        match self {
            AnalyzeEndpoint::Motion => Duration::from_secs(60),
            _ => Duration::from_secs(30),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnalyzeEndpoint::Sar => "sar",
            AnalyzeEndpoint::Lake => "lake",
            AnalyzeEndpoint::Dem => "dem",
            AnalyzeEndpoint::Motion => "motion",
        }
    }

    pub fn component(self) -> Component {
        match self {
            AnalyzeEndpoint::Sar => Component::Sar,
            AnalyzeEndpoint::Lake => Component::Lake,
            AnalyzeEndpoint::Dem | AnalyzeEndpoint::Motion => Component::Terrain,
        }
    }
}

impl fmt::Display for AnalyzeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AnalyzeEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sar" => Ok(AnalyzeEndpoint::Sar),
            "lake" => Ok(AnalyzeEndpoint::Lake),
            "dem" | "srtm" => Ok(AnalyzeEndpoint::Dem),
            "motion" | "video" => Ok(AnalyzeEndpoint::Motion),
            other => Err(format!(
                "unknown analyze endpoint '{}' (expected sar, lake, dem or motion)",
                other
            )),
        }
    }
}

/// Read-only routes of the GLOF prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlofRoute {
    Predict,
    Sensors,
}

impl GlofRoute {
    pub const ALL: [GlofRoute; 2] = [GlofRoute::Predict, GlofRoute::Sensors];

    pub fn path(self) -> &'static str {
        match self {
            GlofRoute::Predict => "/api/glof/predict",
            GlofRoute::Sensors => "/api/glof/sensors",
        }
    }

    pub fn timeout(self) -> Duration {
        Duration::from_secs(10)
    }

    pub fn name(self) -> &'static str {
        match self {
            GlofRoute::Predict => "predict",
            GlofRoute::Sensors => "sensors",
        }
    }
}

impl fmt::Display for GlofRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// What an analyze call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    /// 2xx with a JSON object body.
    Ok(Value),
    /// No HTTP response: connection refused, DNS failure, timeout.
    Unreachable(String),
    /// Non-2xx HTTP status.
    Rejected(u16),
    /// 2xx whose body is not a JSON object.
    Malformed(String),
}

impl fmt::Display for AnalyzeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeOutcome::Ok(_) => write!(f, "OK"),
            AnalyzeOutcome::Unreachable(reason) => write!(f, "Service unreachable: {}", reason),
            AnalyzeOutcome::Rejected(status) => write!(f, "HTTP error: {}", status),
            AnalyzeOutcome::Malformed(reason) => write!(f, "Parse error: {}", reason),
        }
    }
}

impl AnalyzeOutcome {
    /// The result to show: the service's JSON, or the endpoint's mock
    /// literal for every kind of failure.
    pub fn into_display(self, endpoint: AnalyzeEndpoint) -> Value {
        self.or_else_mock(|| mock_for(endpoint))
    }

    /// Same as `into_display`, for the GLOF routes.
    pub fn into_glof_display(self, route: GlofRoute) -> Value {
        self.or_else_mock(|| glof_mock_for(route))
    }

    fn or_else_mock(self, mock: impl FnOnce() -> Value) -> Value {
        match self {
            AnalyzeOutcome::Ok(value) => value,
            _ => mock(),
        }
    }
}

/// Classifies a received HTTP response.
pub fn classify_response(status: u16, body: &str) -> AnalyzeOutcome {
    if !(200..300).contains(&status) {
        return AnalyzeOutcome::Rejected(status);
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) if value.is_object() => AnalyzeOutcome::Ok(value),
        Ok(other) => AnalyzeOutcome::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        )),
        Err(e) => AnalyzeOutcome::Malformed(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// API Client
// ============================================================================

fn send(request: reqwest::blocking::RequestBuilder) -> AnalyzeOutcome {
    let response = match request.header("Accept", "application/json").send() {
        Ok(response) => response,
        Err(e) => return AnalyzeOutcome::Unreachable(e.to_string()),
    };

    let status = response.status().as_u16();
    match response.text() {
        Ok(body) => classify_response(status, &body),
        Err(e) => AnalyzeOutcome::Unreachable(format!("reading response body: {}", e)),
    }
}

pub struct AnalyzeClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl AnalyzeClient {
    /// Client for a gateway at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str) -> Result<Self, Box<dyn Error>> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(AnalyzeClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, endpoint: AnalyzeEndpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Uploads `bytes` as the multipart field `file`.
    pub fn analyze(&self, endpoint: AnalyzeEndpoint, file_name: &str, bytes: Vec<u8>) -> AnalyzeOutcome {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let request = self
            .client
            .post(self.url_for(endpoint))
            .multipart(form)
            .timeout(endpoint.timeout());
        send(request)
    }

    pub fn glof_url_for(&self, route: GlofRoute) -> String {
        format!("{}{}", self.base_url, route.path())
    }

    /// GETs one of the GLOF prediction routes.
    pub fn glof(&self, route: GlofRoute) -> AnalyzeOutcome {
        let request = self
            .client
            .get(self.glof_url_for(route))
            .timeout(route.timeout());
        send(request)
    }

    /// `glof`, logging any failure and substituting the mock literal.
    pub fn glof_or_mock(&self, route: GlofRoute) -> Value {
        let outcome = self.glof(route);
        logging::log_analyze_failure(Component::Glof, route.name(), &outcome);
        outcome.into_glof_display(route)
    }

    /// `analyze`, logging any failure and substituting the mock literal.
    pub fn analyze_or_mock(&self, endpoint: AnalyzeEndpoint, file_name: &str, bytes: Vec<u8>) -> Value {
        let outcome = self.analyze(endpoint, file_name, bytes);
        logging::log_analyze_failure(endpoint.component(), endpoint.name(), &outcome);
        outcome.into_display(endpoint)
    }
}

// ============================================================================
// Tests
// ============================================================================

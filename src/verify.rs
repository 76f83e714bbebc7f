//! Service Status Module
//!
//! Probes the API gateway and each analysis backend behind it to report
//! which ones are answering. A backend that is offline is not an error for
//! the dashboard (its analyze calls fall back to mock results), but the
//! operator should know the numbers on screen are canned.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::time::Duration;

use crate::config::ServiceSettings;
use crate::logging;

/// Per-service check budget.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Status Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub timestamp: String,
    pub services: Vec<ServiceStatus>,
    pub summary: StatusSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub url: String,
    pub status: ServiceState,
    /// The service's health payload, when it returned JSON.
    pub data: Option<Value>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    Offline,
}

// ============================================================================
// Probing
// ============================================================================

/// GETs `{url}/` and reports the service as online if it answered with a
/// success status.
pub fn check_service(client: &reqwest::blocking::Client, name: &str, url: &str) -> ServiceStatus {
    let mut result = ServiceStatus {
        name: name.to_string(),
        url: url.to_string(),
        status: ServiceState::Offline,
        data: None,
        error_message: None,
    };

    let health_url = format!("{}/", url.trim_end_matches('/'));
    match client.get(&health_url).timeout(PROBE_TIMEOUT).send() {
        Ok(response) => {
            if response.status().is_success() {
                result.status = ServiceState::Online;
                // A non-JSON health page still counts as online.
                result.data = response.json::<Value>().ok();
            } else {
                result.error_message = Some(format!("HTTP {}", response.status()));
            }
        }
        Err(e) => {
            result.error_message = Some(format!("Request failed: {}", e));
        }
    }

    result
}

pub fn summarize(services: &[ServiceStatus]) -> StatusSummary {
    let online = services
        .iter()
        .filter(|s| s.status == ServiceState::Online)
        .count();
    StatusSummary {
        total: services.len(),
        online,
        offline: services.len() - online,
    }
}

// ============================================================================
// Full Status Runner
// ============================================================================

pub fn run_status_check(settings: &ServiceSettings) -> Result<StatusReport, Box<dyn Error>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()?;

    let mut targets = vec![("gateway", settings.gateway_url.as_str())];
    targets.extend(settings.backends());

    println!("🔍 Checking services...");
    let mut services = Vec::with_capacity(targets.len());
    for (name, url) in targets {
        print!("  {} ({}) ... ", name, url);
        let result = check_service(&client, name, url);
        match result.status {
            ServiceState::Online => println!("✓ online"),
            ServiceState::Offline => println!(
                "✗ offline: {}",
                result.error_message.as_deref().unwrap_or("Unknown")
            ),
        }
        services.push(result);
    }

    let summary = summarize(&services);
    logging::log_status_summary(summary.total, summary.online);

    Ok(StatusReport {
        timestamp: Utc::now().to_rfc3339(),
        services,
        summary,
    })
}

pub fn print_summary(report: &StatusReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 SERVICE STATUS");
    println!("═══════════════════════════════════════════════════════════");
    for service in &report.services {
        let state = match service.status {
            ServiceState::Online => "online",
            ServiceState::Offline => "offline (mock results)",
        };
        println!("{:<10} {:<28} {}", service.name, service.url, state);
    }
    println!();
    println!(
        "Online: {}/{}  ({} offline)",
        report.summary.online, report.summary.total, report.summary.offline
    );
    println!("═══════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(name: &str, state: ServiceState) -> ServiceStatus {
        ServiceStatus {
            name: name.to_string(),
            url: format!("http://localhost/{}", name),
            status: state,
            data: None,
            error_message: None,
        }
    }

    #[test]
    fn test_summary_counts() {
        let services = vec![
            status("gateway", ServiceState::Online),
            status("sar", ServiceState::Offline),
            status("lake", ServiceState::Offline),
        ];
        assert_eq!(summarize(&services), StatusSummary { total: 3, online: 1, offline: 2 });
        assert_eq!(summarize(&[]), StatusSummary { total: 0, online: 0, offline: 0 });
    }

    #[test]
    fn test_state_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ServiceState::Online).unwrap(), "online");
    }

    #[test]
    fn test_unreachable_service_is_offline() {
        let client = reqwest::blocking::Client::new();
        // Port 9 (discard) is closed on any sane test host.
        let result = check_service(&client, "sar", "http://127.0.0.1:9");
        assert_eq!(result.status, ServiceState::Offline);
        assert!(result.error_message.is_some());
    }
}

/// glofmon: GLOF monitoring service
///
/// Usage:
///   glofmon [run]                       run the estimator until Ctrl-C
///   glofmon analyze <kind> <file>       upload a file (sar|lake|dem|motion)
///   glofmon predict                     current GLOF prediction from the gateway
///   glofmon sensors                     current sensor values from the gateway
///   glofmon status                      check the gateway and backends
///   glofmon alert-preview               show what an alert would contain
///
/// Environment:
///   GLOFMON_CONFIG    config file path (default ./glofmon.toml)
///   GLOFMON_LOG       debug|info|warn|error (default info)
///   GLOFMON_LOG_FILE  append log entries to this file

use std::env;
use std::error::Error;

use glofmon_service::alert::evacuation::{
    compose_alert_message, compose_full_message, prepare_alert_preview,
};
use glofmon_service::alert::stalenesses::{default_max_age_secs, is_stale};
use glofmon_service::config::{Config, DEFAULT_CONFIG_PATH, load_config};
use glofmon_service::ingest::analyze::{AnalyzeClient, AnalyzeEndpoint, GlofRoute};
use glofmon_service::ingest::risk_rules::{risk_report, stated_level};
use glofmon_service::logging::{self, Component, ConsoleStyle, LogLevel};
use glofmon_service::model::{SensorField, SensorReading, Snapshot};
use glofmon_service::sensors::{SENSOR_REGISTRY, find_sensor};
use glofmon_service::simulate::estimator::{Estimator, SimulationState};
use glofmon_service::verify;

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let level = env::var("GLOFMON_LOG")
        .ok()
        .and_then(|l| LogLevel::parse(&l))
        .unwrap_or(LogLevel::Info);
    let log_file = env::var("GLOFMON_LOG_FILE").ok();
    let style = if level == LogLevel::Debug {
        ConsoleStyle::Timestamped
    } else {
        ConsoleStyle::Compact
    };
    logging::init_logger(level, log_file.as_deref(), style)?;

    let config_path = env::var("GLOFMON_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = load_config(&config_path)?;
    config.apply_env();
    logging::debug(
        Component::System,
        None,
        &format!(
            "config from {} (gateway {}, {} alert recipients)",
            config_path,
            config.services.gateway_url,
            config.alert.recipients.len()
        ),
    );

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("run") => run_estimator(&config),
        Some("analyze") => analyze(&config, &args[1..]),
        Some("predict") => glof(&config, GlofRoute::Predict),
        Some("sensors") => glof(&config, GlofRoute::Sensors),
        Some("status") => status(&config),
        Some("alert-preview") => alert_preview(&config),
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            print_usage();
            Err(format!("unknown command '{}'", other).into())
        }
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  glofmon [run]                  run the estimator until Ctrl-C");
    println!("  glofmon analyze <kind> <file>  kind: sar | lake | dem | motion");
    println!("  glofmon predict                current GLOF prediction from the gateway");
    println!("  glofmon sensors                current sensor values from the gateway");
    println!("  glofmon status                 check the gateway and backends");
    println!("  glofmon alert-preview          show what an alert would contain");
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

fn print_snapshot(snapshot: &Snapshot) {
    let values: Vec<String> = SENSOR_REGISTRY
        .iter()
        .map(|s| format!("{} {:.2}{}", s.name, snapshot.reading.get(s.field), s.unit))
        .collect();
    println!(
        "[{}] #{:<5} {:>5.1}% {:<8} conf {:.1}%  scenario {:<6} | {}",
        snapshot.updated_at.format("%H:%M:%S"),
        snapshot.tick,
        snapshot.assessment.probability,
        snapshot.assessment.risk_level.to_string(),
        snapshot.assessment.confidence,
        snapshot.scenario.to_string(),
        values.join(", ")
    );
}

fn run_estimator(config: &Config) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let settings = config.estimator.clone();
    let max_age = default_max_age_secs(settings.tick_secs);

    runtime.block_on(async move {
        let mut estimator = Estimator::new(settings.clone());
        let mut updates = estimator.subscribe();
        estimator.start();
        println!("Estimator running; press Ctrl-C to stop.");

        let mut watchdog = tokio::time::interval(settings.tick() * 3);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut last_level = None;

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    print_snapshot(&snapshot);

                    let level = snapshot.assessment.risk_level;
                    if last_level != Some(level) {
                        logging::info(
                            Component::Estimator,
                            None,
                            &format!("Risk level {}: {}", level, level.message()),
                        );
                        last_level = Some(level);
                    }
                }
                _ = watchdog.tick() => {
                    let snapshot = estimator.snapshot();
                    if snapshot.tick > 0 && is_stale(&snapshot, max_age) {
                        logging::warn(
                            Component::Estimator,
                            None,
                            &format!("No update for more than {}s (last tick {})", max_age, snapshot.tick),
                        );
                    }
                }
                _ = &mut ctrl_c => break,
            }
        }

        estimator.stop();
    });

    Ok(())
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

fn analyze(config: &Config, args: &[String]) -> Result<(), Box<dyn Error>> {
    let (kind, path) = match args {
        [kind, path, ..] => (kind, path),
        _ => return Err("usage: glofmon analyze <sar|lake|dem|motion> <file>".into()),
    };
    let endpoint: AnalyzeEndpoint = kind.parse()?;
    let bytes = std::fs::read(path)?;
    let file_name = std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let client = AnalyzeClient::new(&config.services.gateway_url)?;
    let result = client.analyze_or_mock(endpoint, &file_name, bytes);

    println!("{}", serde_json::to_string_pretty(&result)?);
    let report = risk_report(endpoint, &result);
    match report.message {
        Some(message) => println!("Risk level: {} ({})", report.level, message),
        None => println!("Risk level: {}", report.level),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// predict / sensors
// ---------------------------------------------------------------------------

fn glof(config: &Config, route: GlofRoute) -> Result<(), Box<dyn Error>> {
    let client = AnalyzeClient::new(&config.services.gateway_url)?;
    let result = client.glof_or_mock(route);

    println!("{}", serde_json::to_string_pretty(&result)?);
    match route {
        GlofRoute::Predict => {
            if let Some(level) = stated_level(&result) {
                println!("Risk level: {}", level);
            }
        }
        GlofRoute::Sensors => print_sensor_table(&result),
    }
    Ok(())
}

fn print_sensor_table(result: &serde_json::Value) {
    let Ok(reading) = serde_json::from_value::<SensorReading>(result.clone()) else {
        return;
    };
    println!();
    for field in SensorField::ALL {
        let sensor = find_sensor(field);
        println!("  {:<16} {:>9.2} {}", sensor.name, reading.get(field), sensor.unit);
    }
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

fn status(config: &Config) -> Result<(), Box<dyn Error>> {
    let report = verify::run_status_check(&config.services)?;
    verify::print_summary(&report);
    Ok(())
}

// ---------------------------------------------------------------------------
// alert-preview
// ---------------------------------------------------------------------------

/// Simulated ticks run before previewing, so the preview reflects a
/// drifted reading rather than the fixed initial one.
const PREVIEW_TICKS: u64 = 10;

fn alert_preview(config: &Config) -> Result<(), Box<dyn Error>> {
    let mut state = SimulationState::with_seed(config.estimator.seed);
    let snapshot = state.fast_forward(PREVIEW_TICKS);
    let assessment = snapshot.assessment;
    println!(
        "Assessment after {} simulated ticks under {}: {:.2}% {} ({})",
        snapshot.tick,
        snapshot.scenario,
        assessment.probability,
        assessment.risk_level,
        assessment.risk_level.message()
    );

    let risk_location = config.alert.risk_location();

    let preview = prepare_alert_preview(
        &assessment,
        risk_location,
        &config.alert.safe_locations,
        config.alert.recipients.len(),
    );
    println!("{}", serde_json::to_string_pretty(&preview)?);

    let message = compose_full_message(
        &compose_alert_message(&assessment),
        risk_location,
        preview.nearest_safe_location.as_ref(),
    );
    println!("\n--- message ---\n{}", message);
    Ok(())
}

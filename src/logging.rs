/// Structured logging for the GLOF monitoring service
///
/// Provides context-rich logging with component/endpoint identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for long-running estimator sessions.

use chrono::Utc;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::ingest::analyze::AnalyzeOutcome;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    /// Parses `debug`, `info`, `warn`/`warning`, `error` (any case).
    pub fn parse(raw: &str) -> Option<LogLevel> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Estimator,
    Scenario,
    Sar,
    Lake,
    Terrain,
    Glof,
    Gateway,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Estimator => write!(f, "EST"),
            Component::Scenario => write!(f, "SCN"),
            Component::Sar => write!(f, "SAR"),
            Component::Lake => write!(f, "LAKE"),
            Component::Terrain => write!(f, "TERRAIN"),
            Component::Glof => write!(f, "GLOF"),
            Component::Gateway => write!(f, "GW"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the backend is simply not running in this deployment
    Expected,
    /// Unexpected failure - the backend is up but misbehaving
    Unexpected,
    /// Unknown - cannot tell whether the backend or the input is at fault
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// How entries are echoed to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStyle {
    /// Compact lines with status glyphs; debug entries go to the file only.
    Compact,
    /// Full timestamped entries, debug included.
    Timestamped,
}

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    min_level: LogLevel,
    style: ConsoleStyle,
    /// Opened once at init so a long `run` session does not reopen it per tick.
    file: Option<File>,
}

impl Logger {
    pub fn new(min_level: LogLevel, style: ConsoleStyle, log_file: Option<&str>) -> io::Result<Logger> {
        let file = match log_file {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };
        Ok(Logger { min_level, style, file })
    }

    fn format_entry(level: LogLevel, component: Component, tag: Option<&str>, message: &str) -> String {
        let at = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        format!("{} {} {}{}: {}", at, level, component, tag_suffix(tag), message)
    }

    fn write(&mut self, level: LogLevel, component: Component, tag: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }
        let entry = Self::format_entry(level, component, tag, message);

        match (self.style, level) {
            (ConsoleStyle::Timestamped, LogLevel::Error | LogLevel::Warning) => eprintln!("{}", entry),
            (ConsoleStyle::Timestamped, _) => println!("{}", entry),
            (ConsoleStyle::Compact, LogLevel::Error) => {
                eprintln!("   ✗ {}{}: {}", component, tag_suffix(tag), message)
            }
            (ConsoleStyle::Compact, LogLevel::Warning) => {
                eprintln!("   ⚠ {}{}: {}", component, tag_suffix(tag), message)
            }
            (ConsoleStyle::Compact, LogLevel::Info) => println!("   {}", message),
            (ConsoleStyle::Compact, LogLevel::Debug) => {}
        }

        if let Some(file) = self.file.as_mut() {
            if let Err(e) = writeln!(file, "{}", entry) {
                eprintln!("log file write failed: {}", e);
                // Stop retrying on every entry.
                self.file = None;
            }
        }
    }
}

fn tag_suffix(tag: Option<&str>) -> String {
    tag.map(|t| format!(" [{}]", t)).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Installs the global logger. Fails only if `log_file` cannot be opened.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, style: ConsoleStyle) -> io::Result<()> {
    let logger = Logger::new(min_level, style, log_file)?;
    let mut slot = LOGGER.lock().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(logger);
    Ok(())
}

fn emit(level: LogLevel, component: Component, tag: Option<&str>, message: &str) {
    let mut slot = LOGGER.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(logger) = slot.as_mut() {
        logger.write(level, component, tag, message);
    }
}

pub fn info(component: Component, tag: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, tag, message);
}

pub fn warn(component: Component, tag: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, tag, message);
}

pub fn error(component: Component, tag: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, tag, message);
}

pub fn debug(component: Component, tag: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, tag, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a failed analyze call.
///
/// A backend that cannot be reached is the normal state of a demo
/// deployment; a backend that answers with garbage or a 5xx is not.
/// A 4xx usually means the uploaded file was refused.
pub fn classify_analyze_failure(outcome: &AnalyzeOutcome) -> Option<FailureType> {
    match outcome {
        AnalyzeOutcome::Ok(_) => None,
        AnalyzeOutcome::Unreachable(_) => Some(FailureType::Expected),
        AnalyzeOutcome::Rejected(status) if *status >= 500 => Some(FailureType::Unexpected),
        AnalyzeOutcome::Rejected(_) => Some(FailureType::Unknown),
        AnalyzeOutcome::Malformed(_) => Some(FailureType::Unexpected),
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log an analyze failure with automatic classification.
/// Successful outcomes are ignored.
pub fn log_analyze_failure(component: Component, endpoint: &str, outcome: &AnalyzeOutcome) {
    let Some(failure_type) = classify_analyze_failure(outcome) else {
        return;
    };

    let message = format!("analyze failed [{}]: {}; serving mock result", failure_type, outcome);

    match failure_type {
        FailureType::Expected => debug(component, Some(endpoint), &message),
        FailureType::Unexpected => error(component, Some(endpoint), &message),
        FailureType::Unknown => warn(component, Some(endpoint), &message),
    }
}

// ---------------------------------------------------------------------------
// Status Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a service status sweep
pub fn log_status_summary(total: usize, online: usize) {
    let offline = total.saturating_sub(online);
    let message = format!("Status check complete: {}/{} online, {} offline", online, total, offline);

    if offline == 0 {
        info(Component::Gateway, None, &message);
    } else if online == 0 {
        error(Component::Gateway, None, &message);
    } else {
        warn(Component::Gateway, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_failure_classification() {
        let unreachable = AnalyzeOutcome::Unreachable("connection refused".to_string());
        assert_eq!(classify_analyze_failure(&unreachable), Some(FailureType::Expected));

        assert_eq!(classify_analyze_failure(&AnalyzeOutcome::Rejected(503)), Some(FailureType::Unexpected));
        assert_eq!(classify_analyze_failure(&AnalyzeOutcome::Rejected(415)), Some(FailureType::Unknown));

        let malformed = AnalyzeOutcome::Malformed("expected value at line 1".to_string());
        assert_eq!(classify_analyze_failure(&malformed), Some(FailureType::Unexpected));

        let ok = AnalyzeOutcome::Ok(serde_json::json!({"success": true}));
        assert_eq!(classify_analyze_failure(&ok), None);
    }

    #[test]
    fn test_file_receives_entries_at_or_above_min_level() {
        let path = std::env::temp_dir().join(format!("glofmon-log-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let path_str = path.to_str().unwrap();

        let mut logger = Logger::new(LogLevel::Info, ConsoleStyle::Compact, Some(path_str)).unwrap();
        logger.write(LogLevel::Debug, Component::Estimator, None, "tick 1");
        logger.write(LogLevel::Warning, Component::Sar, Some("sar"), "HTTP error: 503");
        drop(logger);

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(!contents.contains("tick 1"));
        assert!(contents.contains("WARN SAR [sar]: HTTP error: 503"), "got {}", contents);
    }

    #[test]
    fn test_unopenable_log_file_is_an_error() {
        let missing_dir = std::env::temp_dir().join("glofmon-no-such-dir").join("x.log");
        assert!(Logger::new(LogLevel::Info, ConsoleStyle::Compact, missing_dir.to_str()).is_err());
    }

    #[test]
    fn test_entry_format_includes_component_and_tag() {
        let entry = Logger::format_entry(LogLevel::Warning, Component::Lake, Some("lake"), "slow");
        assert!(entry.contains("WARN LAKE [lake]: slow"), "got {}", entry);
    }
}

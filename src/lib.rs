//! Monitoring core for the GLOF (glacial lake outburst flood) dashboard.
//!
//! - `simulate`: simulated telemetry and the owned risk estimator.
//! - `alert`: risk scoring, snapshot staleness, evacuation guidance.
//! - `ingest`: upload-analyze client with mock fallback.
//! - `verify`: backend status sweep.

pub mod alert;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod sensors;
pub mod simulate;
pub mod verify;

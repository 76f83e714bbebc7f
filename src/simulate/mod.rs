/// Simulated telemetry for the dashboard.
///
/// Submodules:
/// - `scenario`: random ambient scenario and its reselection interval.
/// - `drift`: per-tick smoothing random walk with bounded excursion.
/// - `estimator`: owned state plus the two timers that drive it.

pub mod drift;
pub mod estimator;
pub mod scenario;

/// Risk scoring and alerting helpers.
///
/// Submodules:
/// - `thresholds`: risk probability, level buckets, assessment recompute.
/// - `stalenesses`: detects snapshots the estimator stopped refreshing.
/// - `evacuation`: nearest safe location, map links, alert preview.

pub mod evacuation;
pub mod stalenesses;
pub mod thresholds;

/// Snapshot staleness detection.
///
/// The estimator publishes every 2 seconds while running. A display that
/// keeps showing the last snapshot after the estimator stopped (or its
/// runtime stalled) would present frozen numbers as live, so this module
/// lets the consumer flag gaps.
///
/// # Clock injection
/// All functions accept a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally. This makes staleness purely deterministic in
/// tests without mocking or time manipulation.

use chrono::{DateTime, Utc};

use crate::model::Snapshot;

/// Returns `true` if the snapshot is older than `max_age_secs` relative to
/// `now`.
///
/// Staleness is defined as strictly greater than the threshold:
///   age > max_age_secs  →  stale
///   age == max_age_secs →  not stale
///
/// A snapshot stamped in the future (clock skew) is not stale.
pub fn is_stale_at(snapshot: &Snapshot, max_age_secs: u64, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(snapshot.updated_at).num_seconds();
    age > 0 && age as u64 > max_age_secs
}

/// Convenience wrapper that uses the real current time.
/// Use `is_stale_at` in tests to keep them deterministic.
pub fn is_stale(snapshot: &Snapshot, max_age_secs: u64) -> bool {
    is_stale_at(snapshot, max_age_secs, Utc::now())
}

/// Staleness threshold for a given tick period: three missed ticks.
pub fn default_max_age_secs(tick_secs: u64) -> u64 {
    tick_secs.saturating_mul(3)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Clients for the analysis backends.
///
/// Submodules:
/// - `analyze`: multipart upload client and its outcome type.
/// - `mock`: literal results served when a call fails.
/// - `risk_rules`: reads or derives the risk level of a result.

pub mod analyze;
pub mod mock;
pub mod risk_rules;

//! Cross-component integration scenarios.

pub mod admission_flows;
pub mod envelope_flows;

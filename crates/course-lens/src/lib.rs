//! Course export analysis: archive extraction, publish-state resolution,
//! objective detection, and rule-based QM/UDL pre-checks.

pub mod config;
pub mod course;
pub mod error;
pub mod telemetry;

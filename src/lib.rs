//! AI-assisted bulk candidate screening service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

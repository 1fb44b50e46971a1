pub mod config;
pub mod error;
pub mod sizing;
pub mod telemetry;

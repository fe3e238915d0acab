pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod fixtures;
pub mod harness;
pub mod scenario;
pub mod state;
pub mod telemetry;

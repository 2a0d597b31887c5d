//! buildpulse: build execution telemetry
//!
//! Aggregates per-task timing and outcome notifications from a build into an execution
//! report, filters it, and publishes it to time-series, document-store, push-gateway, and
//! console backends without ever failing the build.

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod metrics;
pub mod publisher;
pub mod report;
pub mod service;
pub mod telemetry;

pub use service::{BuildService, BuildServiceParams, PublishHandle, ServiceState};

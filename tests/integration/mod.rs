//! Integration tests for buildpulse aggregation and publishing

mod cli_replay;
mod config_integration;
mod hybrid_publisher;
mod router_isolation;
pub mod test_utils;

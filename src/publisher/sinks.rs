//! Built-in backend sinks.

mod http;

pub mod document;
pub mod influxdb;
pub mod output;
pub mod pushgateway;

pub use document::DocumentStoreSink;
pub use influxdb::InfluxDbSink;
pub use output::OutputSink;
pub use pushgateway::PushGatewaySink;

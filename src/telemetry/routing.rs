//! Event routing from host listeners into a build service.

pub mod bus;
pub mod ingestor;

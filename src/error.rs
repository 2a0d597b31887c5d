//! Error types for build telemetry aggregation and publishing.
//!
//! Nothing in this module is allowed to fail a build: publishing and filtering errors
//! terminate in log lines, `ApiError` is only surfaced by configuration loading and the CLI.

use crate::publisher::PublisherKind;
use thiserror::Error;

/// Errors raised while resolving or running a single publisher.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Publisher configuration error: {0}")]
    Configuration(String),

    #[error("{publisher} transport error: {message}")]
    Transport {
        publisher: PublisherKind,
        message: String,
    },

    #[error("{publisher} rejected write with status {status}: {body}")]
    Rejected {
        publisher: PublisherKind,
        status: u16,
        body: String,
    },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("{publisher} panicked: {message}")]
    Panicked {
        publisher: PublisherKind,
        message: String,
    },

    #[error("{failed} of {attempted} hybrid publishers failed")]
    HybridSides { failed: usize, attempted: usize },

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    pub fn transport(publisher: PublisherKind, error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("Request timeout: {}", error)
        } else if error.is_connect() {
            format!("Connection error: {}", error)
        } else {
            format!("HTTP error: {}", error)
        };
        PublishError::Transport { publisher, message }
    }
}

impl From<prometheus::Error> for PublishError {
    fn from(err: prometheus::Error) -> Self {
        PublishError::Encoding(err.to_string())
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::Encoding(err.to_string())
    }
}

/// Invalid or contradictory filter predicates. Filters fall back to identity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterConfigurationError {
    #[error("Invalid filter pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Contradictory threshold: min {min_ms}ms is greater than max {max_ms}ms")]
    ContradictoryThreshold { min_ms: u64, max_ms: u64 },
}

/// Crate-level errors for configuration, logging setup and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidTranscript(err.to_string())
    }
}

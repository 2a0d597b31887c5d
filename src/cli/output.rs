//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to a one-line category prefix plus the error text.
pub fn map_error(e: &ApiError) -> String {
    let category = match e {
        ApiError::ConfigError(_) => "config",
        ApiError::InvalidTranscript(_) => "transcript",
        ApiError::RuntimeError(_) => "runtime",
        ApiError::IoError(_) => "io",
    };
    format!("error[{}]: {}", category, e)
}

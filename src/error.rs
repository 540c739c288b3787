//! Error types for Synheart Vigil

use thiserror::Error;

/// Errors that can occur when constructing or persisting the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

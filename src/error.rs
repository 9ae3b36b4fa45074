//! Error types for Rep Flux
//!
//! Only exercise definition loading fails loudly. Per-frame problems (lost
//! pose, missing joints, degenerate geometry) are reported through
//! [`FrameStatus`](crate::types::FrameStatus) instead.

use thiserror::Error;

/// Errors raised while building an engine or decoding caller input
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to read exercise definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid landmarks: {0}")]
    InvalidLandmarks(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Invalid feedback condition '{condition}': {reason}")]
    InvalidCondition { condition: String, reason: String },

    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("Invalid landmark frame: {0}")]
    InvalidFrame(String),
}

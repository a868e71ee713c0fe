//! Error types for the benchmark harness.

use crate::errors::{BackendError, EvaluationError};
use thiserror::Error;

/// Errors raised while validating or executing a benchmark run.
///
/// Configuration errors fail fast, before any fixture generation or timing.
/// Backend and evaluation failures abort the whole run on first occurrence so
/// that reported statistics always reflect exactly `loops` successful
/// measured iterations.
#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Warm-up count {warmups} must not exceed the measured loop count {loops}")]
    WarmupsExceedLoops { warmups: u32, loops: u32 },

    #[error("Invalid number of measured loops: {value}. Must be greater than 0")]
    InvalidLoops { value: u32 },

    #[error("Invalid input length: {value}. Must be greater than 0")]
    InvalidInputLength { value: usize },

    #[error("Invalid model count: {value}. Must be greater than 0")]
    InvalidModelCount { value: usize },

    #[error("Layer shapes must form a chain ending in a single output, got {shapes:?}")]
    InvalidLayerShapes { shapes: Vec<(usize, usize)> },

    #[error("Failed to parse configuration file '{path}': {source}")]
    ConfigParseError {
        path: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

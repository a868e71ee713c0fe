//! Error types for backend adapter initialization and invocation.

use crate::errors::EvaluationError;
use thiserror::Error;

/// Errors raised by a backend adapter.
///
/// Initialization failures (device acquisition, module compilation, artifact
/// loading) are surfaced to the caller of the benchmark harness and never
/// retried: a malformed module or artifact cannot succeed on a second
/// attempt.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Compute device not available: {message}")]
    DeviceNotAvailable { message: String },

    #[error("Kernel module compilation failed: {message}")]
    KernelCompilationFailed { message: String },

    #[error("Kernel input capacity exceeded: input has {len} elements but the shared region holds {capacity}")]
    InputCapacityExceeded { len: usize, capacity: usize },

    #[error("Kernel models must share layer shapes: model {model} differs from model 0")]
    KernelShapeMismatch { model: usize },

    #[error("Failed to parse model artifact {part}: {message}")]
    ArtifactParseFailed { part: String, message: String },

    #[error("Weight data size mismatch: specs require {expected} bytes but {actual} were provided")]
    WeightDataSizeMismatch { expected: usize, actual: usize },

    #[error("Weight spec '{name}' is not referenced by the graph topology")]
    UnusedWeightSpec { name: String },

    #[error("Graph node '{node}' references unknown tensor '{tensor}'")]
    UnknownTensorReference { node: String, tensor: String },

    #[error("Graph topology produced no output node")]
    MissingGraphOutput,

    #[error("Unsupported graph op: {op}")]
    UnsupportedGraphOp { op: String },

    #[error("The backend requires a host-generated weight fixture but none was provided")]
    MissingWeightFixture,

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

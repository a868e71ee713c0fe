//! Error types for tensor operations and forward-pass evaluation.

use thiserror::Error;

/// Errors that can occur during model construction or evaluation.
///
/// Every variant signals a caller bug (mismatched shapes), not a transient
/// condition: evaluation stops at the failing operation and no partial
/// result is returned.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Matrix-vector dimension mismatch: matrix has {cols} columns but vector has {len} elements")]
    MatrixVectorDimensionMismatch { cols: usize, len: usize },

    #[error("Matrix-matrix dimension mismatch: left operand has {left_cols} columns but right operand has {right_rows} rows")]
    MatrixMatrixDimensionMismatch {
        left_cols: usize,
        right_rows: usize,
    },

    #[error("Matrix rows must not be empty")]
    EmptyMatrix,

    #[error("Matrix rows must all have the same length: row {row} has {actual} elements, expected {expected}")]
    RaggedMatrix {
        row: usize,
        actual: usize,
        expected: usize,
    },

    #[error("At least one layer is required")]
    NoLayersProvided,

    #[error("Layer {layer} expects {expected} inputs but the previous layer produces {actual}")]
    LayerChainMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Model expects {expected} inputs but got {actual}")]
    InputSizeMismatch { expected: usize, actual: usize },

    #[error("At least one model is required in an ensemble")]
    NoModelsProvided,

    #[error("Ensemble models must share the input size: model {model} expects {actual}, expected {expected}")]
    EnsembleInputSizeMismatch {
        model: usize,
        expected: usize,
        actual: usize,
    },

    #[error("The final layer must produce at least one output")]
    EmptyOutput,
}

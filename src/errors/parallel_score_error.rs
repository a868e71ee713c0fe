//! Error types for parallel batch scoring.

use thiserror::Error;

/// Errors raised by [`crate::parallel_score::score_batch`].
#[derive(Error, Debug)]
pub enum ParallelScoreError {
    #[error("Input buffer length {actual} is not a multiple of the input size {input_size}")]
    InputBufferSizeMismatch { actual: usize, input_size: usize },

    #[error("Invalid thread count: {count}")]
    InvalidThreadCount { count: usize },

    #[error("Scoring sample {sample_index} failed: {message}")]
    ScoreFailed {
        sample_index: usize,
        message: String,
    },

    #[error("A worker thread panicked")]
    ThreadPanicked,
}

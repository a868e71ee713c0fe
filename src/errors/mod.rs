//! Error types for the bid evaluation library.
//!
//! This module contains specific error types used throughout the library,
//! avoiding generic error wrappers like `anyhow` or `Box<dyn Error>` for better
//! error handling and debugging.

mod backend_error;
mod benchmark_error;
mod bid_error;
mod evaluation_error;
mod parallel_score_error;

pub use backend_error::BackendError;
pub use benchmark_error::BenchmarkError;
pub use bid_error::BidError;
pub use evaluation_error::EvaluationError;
pub use parallel_score_error::ParallelScoreError;

/// Result type alias for tensor and forward-pass operations.
pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;

/// Result type alias for backend adapter operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Result type alias for benchmark harness operations.
pub type BenchmarkResult<T> = std::result::Result<T, BenchmarkError>;

/// Result type alias for parallel batch scoring.
pub type ParallelScoreResult<T> = std::result::Result<T, ParallelScoreError>;

//! Benchmark harness for the bid evaluation backends.
//!
//! Pre-generates random fixture workloads, runs a configurable number of
//! untimed warm-up evaluations followed by timed evaluations, and reports
//! per-iteration timing statistics with a separate figure for backend
//! initialization.

pub mod config;
pub mod fixtures;
pub mod harness;
pub mod report;

pub use config::{BenchmarkConfig, ConfigLoader};
pub use fixtures::{
    CANONICAL_INPUT_LEN, CANONICAL_LAYER_SHAPES, CANONICAL_MODEL_COUNT, FixtureGenerator, Sampling,
};
pub use harness::BenchmarkRunner;
pub use report::{TimingReport, print_timing_analysis};

//! Backend adapters: substitutable execution strategies for bid scoring.
//!
//! Each backend exposes the same per-iteration contract (score one input,
//! get one scalar back) so the benchmark harness can swap strategies without
//! changing its control flow. Backend handles are explicit values owned by
//! the caller; there is no module-level instance state shared across calls.

pub mod graph;
pub mod kernel;
pub mod native;

pub use graph::GraphBackend;
pub use kernel::KernelBackend;
pub use native::NativeBackend;

use std::time::Duration;

use crate::ensemble::Ensemble;
use crate::errors::BackendResult;
use crate::tensor::Vector;

/// One benchmark iteration's workload: a generated input, plus the generated
/// ensemble for backends that evaluate host-side weights. Backends with baked
/// or pre-loaded weights leave the ensemble slot unused.
pub struct Fixture {
    pub input: Vector,
    pub ensemble: Option<Ensemble>,
}

impl Fixture {
    /// A fixture carrying only an input vector.
    pub fn input_only(input: Vector) -> Self {
        Self {
            input,
            ensemble: None,
        }
    }
}

/// Elapsed time of a backend's one-off initialization, reported once and
/// outside the per-iteration loop.
#[derive(Debug, Clone, Copy)]
pub struct InitTiming {
    /// Module/artifact compilation or parsing.
    pub compile: Duration,
    /// Instantiation: device acquisition, graph construction.
    pub instantiate: Duration,
}

impl InitTiming {
    pub fn total(&self) -> Duration {
        self.compile + self.instantiate
    }
}

/// The common evaluate-or-score contract every execution strategy implements.
pub trait ScoreBackend {
    /// Human-readable backend name used in reports and logs.
    fn label(&self) -> &str;

    /// Whether the harness should generate a fresh ensemble per iteration
    /// for this backend. Defaults to false: kernel and graph backends carry
    /// their own weights.
    fn wants_generated_weights(&self) -> bool {
        false
    }

    /// Scores one fixture. Called exactly once per benchmark iteration.
    fn score(&mut self, fixture: &Fixture) -> BackendResult<f64>;

    /// Initialization phase breakdown, when the backend has a separate
    /// initialization step.
    fn init_timing(&self) -> Option<InitTiming> {
        None
    }
}

//! Native scalar-loop backend: pure in-process evaluation.

use crate::backends::{Fixture, ScoreBackend};
use crate::errors::{BackendError, BackendResult};

/// Evaluates the per-iteration generated ensemble with the in-process tensor
/// primitives. No initialization step, no state across calls.
pub struct NativeBackend;

impl ScoreBackend for NativeBackend {
    fn label(&self) -> &str {
        "native"
    }

    fn wants_generated_weights(&self) -> bool {
        true
    }

    fn score(&mut self, fixture: &Fixture) -> BackendResult<f64> {
        let ensemble = fixture
            .ensemble
            .as_ref()
            .ok_or(BackendError::MissingWeightFixture)?;
        Ok(ensemble.score(&fixture.input)?)
    }
}

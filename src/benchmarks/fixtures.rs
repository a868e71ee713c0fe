//! Random fixture generation for benchmark workloads.
//!
//! Fixtures are deliberately unvalidated against any trained semantics: they
//! only need to be dimensionally consistent with the model structure under
//! test.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::ensemble::{Ensemble, ScoreReduction};
use crate::errors::EvaluationResult;
use crate::model::DenseModel;
use crate::tensor::{Matrix, Vector};

/// Input length of the canonical benchmark workload.
pub const CANONICAL_INPUT_LEN: usize = 200;

/// Number of models in the canonical benchmark ensemble.
pub const CANONICAL_MODEL_COUNT: usize = 5;

/// Layer shapes (rows, cols) of the canonical benchmark model.
pub const CANONICAL_LAYER_SHAPES: [(usize, usize); 4] =
    [(200, 200), (100, 200), (50, 100), (1, 50)];

/// Sampling strategy for fixture values.
///
/// Different deployed benchmark variants rely on each of these, so all are
/// supported as configuration options rather than separate code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sampling {
    /// Uniform samples in [0, 1).
    Uniform,
    /// Uniform samples in [-1, 1), the foreign-kernel fixture variant.
    SymmetricUniform,
    /// Standard-normal samples via a Box-Muller transform of two uniform
    /// draws.
    #[default]
    Normal,
}

/// Produces random input vectors and weight matrices of specified shapes.
pub struct FixtureGenerator {
    rng: StdRng,
    sampling: Sampling,
}

impl FixtureGenerator {
    /// Creates a generator seeded from OS entropy.
    pub fn new(sampling: Sampling) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            sampling,
        }
    }

    /// Creates a generator with a fixed seed for reproducible fixtures.
    pub fn with_seed(sampling: Sampling, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sampling,
        }
    }

    /// The configured sampling strategy.
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    fn sample(&mut self) -> f64 {
        match self.sampling {
            Sampling::Uniform => self.rng.gen_range(0.0..1.0),
            Sampling::SymmetricUniform => self.rng.gen_range(-1.0..1.0),
            Sampling::Normal => {
                // Box-Muller transform; zero draws are resampled so the log
                // argument stays positive.
                let mut u = 0.0f64;
                let mut v = 0.0f64;
                while u == 0.0 {
                    u = self.rng.gen_range(0.0..1.0);
                }
                while v == 0.0 {
                    v = self.rng.gen_range(0.0..1.0);
                }
                (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
            }
        }
    }

    /// Produces `n` independent samples.
    pub fn random_vector(&mut self, n: usize) -> Vector {
        (0..n).map(|_| self.sample()).collect()
    }

    /// Produces `rows` independent calls to [`Self::random_vector`].
    pub fn random_matrix(&mut self, rows: usize, cols: usize) -> Matrix {
        (0..rows).map(|_| self.random_vector(cols)).collect()
    }

    /// Produces a model with random weights of the given layer shapes.
    pub fn random_model(
        &mut self,
        shapes: &[(usize, usize)],
        activation: Activation,
    ) -> EvaluationResult<DenseModel> {
        let weights = shapes
            .iter()
            .map(|&(rows, cols)| self.random_matrix(rows, cols))
            .collect();
        DenseModel::with_uniform_activation(weights, activation)
    }

    /// Produces an ensemble of independently-weighted random models.
    pub fn random_ensemble(
        &mut self,
        model_count: usize,
        shapes: &[(usize, usize)],
        activation: Activation,
        reduction: ScoreReduction,
    ) -> EvaluationResult<Ensemble> {
        let models = (0..model_count)
            .map(|_| self.random_model(shapes, activation))
            .collect::<EvaluationResult<Vec<_>>>()?;
        Ensemble::new(models, reduction)
    }
}

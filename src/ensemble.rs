//! Ensemble scoring: several independent models combined into one bid.

use serde::{Deserialize, Serialize};

use crate::errors::{EvaluationError, EvaluationResult};
use crate::model::DenseModel;
use crate::tensor::Vector;

/// How per-model scalar outputs are combined into one score.
///
/// All three modes appear in deployed bidding functions; `ClampedProduct` is
/// the canonical default since it guards the product against non-positive
/// factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreReduction {
    /// Floor each output at 1.0, then multiply.
    #[default]
    ClampedProduct,
    /// Multiply the raw outputs.
    Product,
    /// Sum the raw outputs.
    Sum,
}

impl ScoreReduction {
    /// Reduces per-model outputs into a single score.
    pub fn reduce(self, outputs: &[f64]) -> f64 {
        match self {
            ScoreReduction::ClampedProduct => {
                outputs.iter().fold(1.0, |acc, &s| acc * s.max(1.0))
            }
            ScoreReduction::Product => outputs.iter().product(),
            ScoreReduction::Sum => outputs.iter().sum(),
        }
    }
}

/// A set of independently-weighted models sharing the same input shape.
#[derive(Debug, Clone)]
pub struct Ensemble {
    models: Vec<DenseModel>,
    reduction: ScoreReduction,
}

impl Ensemble {
    /// Creates an ensemble from a non-empty model set with a shared input
    /// size.
    pub fn new(models: Vec<DenseModel>, reduction: ScoreReduction) -> EvaluationResult<Self> {
        if models.is_empty() {
            return Err(EvaluationError::NoModelsProvided);
        }
        let expected = models[0].input_size();
        for (i, model) in models.iter().enumerate().skip(1) {
            if model.input_size() != expected {
                return Err(EvaluationError::EnsembleInputSizeMismatch {
                    model: i,
                    expected,
                    actual: model.input_size(),
                });
            }
        }
        Ok(Self { models, reduction })
    }

    /// Number of inputs every member model consumes.
    pub fn input_size(&self) -> usize {
        self.models[0].input_size()
    }

    /// The member models.
    pub fn models(&self) -> &[DenseModel] {
        &self.models
    }

    /// The configured reduction mode.
    pub fn reduction(&self) -> ScoreReduction {
        self.reduction
    }

    /// Evaluates every model against the same input and reduces the scalar
    /// outputs into one score.
    ///
    /// Evaluations are independent; no state is shared between them. The
    /// first failing evaluation aborts scoring.
    pub fn score(&self, input: &Vector) -> EvaluationResult<f64> {
        let mut outputs = Vec::with_capacity(self.models.len());
        for model in &self.models {
            outputs.push(model.evaluate_scalar(input)?);
        }
        Ok(self.reduction.reduce(&outputs))
    }
}

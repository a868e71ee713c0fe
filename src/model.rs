//! Dense forward-pass model.
//!
//! A model is an ordered, dimension-compatible stack of layers, each a weight
//! matrix paired with an activation policy. Shape compatibility is checked
//! once at construction; evaluation itself never mutates the weights and is
//! deterministic for a fixed input.

use crate::activation::Activation;
use crate::errors::{EvaluationError, EvaluationResult};
use crate::tensor::{self, Matrix, Vector};

/// One weight matrix plus an activation policy.
///
/// A forward pass through a layer maps an input vector of length
/// `cols(weights)` to an output vector of length `rows(weights)` via the
/// matrix-vector product followed by the activation.
#[derive(Debug, Clone)]
pub struct Layer {
    weights: Matrix,
    activation: Activation,
}

impl Layer {
    /// Creates a layer, validating that the weight matrix is rectangular.
    pub fn new(weights: Matrix, activation: Activation) -> EvaluationResult<Self> {
        tensor::validate_matrix(&weights)?;
        Ok(Self {
            weights,
            activation,
        })
    }

    /// Number of inputs the layer consumes.
    pub fn input_size(&self) -> usize {
        tensor::cols(&self.weights)
    }

    /// Number of outputs the layer produces.
    pub fn output_size(&self) -> usize {
        tensor::rows(&self.weights)
    }

    /// The layer's weight matrix.
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// The layer's activation policy.
    pub fn activation(&self) -> Activation {
        self.activation
    }
}

/// An ordered sequence of dimension-compatible layers forming one full
/// forward pass.
#[derive(Debug, Clone)]
pub struct DenseModel {
    layers: Vec<Layer>,
}

impl DenseModel {
    /// Creates a model from a non-empty layer stack.
    ///
    /// Consecutive layers must chain: each layer's input size must equal the
    /// previous layer's output size. Violations are construction-time errors,
    /// not evaluation-time ones.
    pub fn new(layers: Vec<Layer>) -> EvaluationResult<Self> {
        if layers.is_empty() {
            return Err(EvaluationError::NoLayersProvided);
        }
        for i in 1..layers.len() {
            let expected = layers[i].input_size();
            let actual = layers[i - 1].output_size();
            if expected != actual {
                return Err(EvaluationError::LayerChainMismatch {
                    layer: i,
                    expected,
                    actual,
                });
            }
        }
        Ok(Self { layers })
    }

    /// Convenience constructor: every matrix gets the same activation.
    pub fn with_uniform_activation(
        weights: Vec<Matrix>,
        activation: Activation,
    ) -> EvaluationResult<Self> {
        let layers = weights
            .into_iter()
            .map(|w| Layer::new(w, activation))
            .collect::<EvaluationResult<Vec<_>>>()?;
        Self::new(layers)
    }

    /// Number of inputs the model consumes.
    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    /// Number of outputs the model produces.
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    /// The model's layer stack.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Runs the forward pass: folds the layer stack left-to-right with
    /// `acc = activation(W * acc)`.
    ///
    /// Pure: the model's weights are never mutated. A dimension mismatch
    /// aborts at the failing layer with no partial result.
    pub fn evaluate(&self, input: &Vector) -> EvaluationResult<Vector> {
        if input.len() != self.input_size() {
            return Err(EvaluationError::InputSizeMismatch {
                expected: self.input_size(),
                actual: input.len(),
            });
        }

        let mut acc = input.clone();
        for layer in &self.layers {
            let mut next = tensor::multiply_matrix_vector(layer.weights(), &acc)?;
            layer.activation().apply_in_place(&mut next);
            acc = next;
        }
        Ok(acc)
    }

    /// Runs the forward pass and reads element 0 of the final vector.
    ///
    /// The bid models end in a `1×k` layer, so element 0 is the score.
    pub fn evaluate_scalar(&self, input: &Vector) -> EvaluationResult<f64> {
        let output = self.evaluate(input)?;
        output
            .first()
            .copied()
            .ok_or(EvaluationError::EmptyOutput)
    }

    /// Batched variant: composes the layer stack via matrix-matrix products
    /// over a single-column (or wider) input matrix.
    pub fn evaluate_columns(&self, input: &Matrix) -> EvaluationResult<Matrix> {
        let mut acc = input.clone();
        for layer in &self.layers {
            let mut next = tensor::multiply_matrix_matrix(layer.weights(), &acc)?;
            layer.activation().apply_matrix_in_place(&mut next);
            acc = next;
        }
        Ok(acc)
    }

    /// Batched scalar read-out: evaluates a vector as a one-column matrix and
    /// reads column 0 of the final matrix.
    pub fn evaluate_scalar_batched(&self, input: &Vector) -> EvaluationResult<f64> {
        let output = self.evaluate_columns(&tensor::as_column(input))?;
        output
            .first()
            .and_then(|row| row.first())
            .copied()
            .ok_or(EvaluationError::EmptyOutput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::identity;

    #[test]
    fn test_layer_chain_mismatch_is_construction_error() {
        let result = DenseModel::with_uniform_activation(
            vec![vec![vec![1.0, 1.0]], vec![vec![1.0, 1.0]]], // 1x2 then 1x2
            Activation::Relu,
        );
        assert!(matches!(
            result,
            Err(EvaluationError::LayerChainMismatch {
                layer: 1,
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_empty_model_rejected() {
        assert!(matches!(
            DenseModel::new(vec![]),
            Err(EvaluationError::NoLayersProvided)
        ));
    }

    #[test]
    fn test_identity_stack_is_relu() {
        let model =
            DenseModel::with_uniform_activation(vec![identity(4), identity(4)], Activation::Relu)
                .unwrap();
        let input = vec![-1.0, 2.0, 0.0, -3.5];
        let output = model.evaluate(&input).unwrap();
        assert_eq!(output, vec![0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_input_size_mismatch() {
        let model =
            DenseModel::with_uniform_activation(vec![identity(3)], Activation::Relu).unwrap();
        let result = model.evaluate(&vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(EvaluationError::InputSizeMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_batched_matches_vector_path() {
        let weights = vec![
            vec![vec![0.5, -1.0, 2.0], vec![1.0, 1.0, 1.0]], // 2x3
            vec![vec![1.0, -1.0]],                           // 1x2
        ];
        let model = DenseModel::with_uniform_activation(weights, Activation::Relu).unwrap();
        let input = vec![1.0, 2.0, -0.5];

        let scalar = model.evaluate_scalar(&input).unwrap();
        let batched = model.evaluate_scalar_batched(&input).unwrap();
        assert!((scalar - batched).abs() < 1e-12);
    }

    #[test]
    fn test_identity_activation_keeps_negatives() {
        let model = DenseModel::with_uniform_activation(
            vec![vec![vec![1.0, 1.0]]],
            Activation::Identity,
        )
        .unwrap();
        let score = model.evaluate_scalar(&vec![1.0, -3.0]).unwrap();
        assert!((score - -2.0).abs() < 1e-12);
    }
}

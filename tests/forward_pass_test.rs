//! End-to-end tests for the dense forward pass, including the golden
//! all-ones regression fixture.

use bidnet_inference::activation::Activation;
use bidnet_inference::ensemble::{Ensemble, ScoreReduction};
use bidnet_inference::errors::EvaluationError;
use bidnet_inference::model::{DenseModel, Layer};
use bidnet_inference::tensor::{self, Matrix};

const DELTA: f64 = 1e-9;

/// All-ones matrix of the given shape.
fn ones(rows: usize, cols: usize) -> Matrix {
    vec![vec![1.0; cols]; rows]
}

/// The canonical 4-layer all-ones model over a 200-element input.
fn all_ones_model() -> DenseModel {
    DenseModel::with_uniform_activation(
        vec![ones(200, 200), ones(100, 200), ones(50, 100), ones(1, 50)],
        Activation::Relu,
    )
    .unwrap()
}

#[test]
fn golden_all_ones_forward_pass() {
    let model = all_ones_model();
    let input = vec![1.0; 200];

    // Layer 1: ones dot ones summed 200 times, already non-negative.
    let first = tensor::multiply_matrix_vector(model.layers()[0].weights(), &input).unwrap();
    assert_eq!(first.len(), 200);
    assert!(first.iter().all(|&v| (v - 200.0).abs() < DELTA));

    // 200 -> 200 each; 100 x (200*200) = 40_000; 50 x (100*40_000) = 4e6;
    // 1 x (50*4e6) = 2e8.
    let score = model.evaluate_scalar(&input).unwrap();
    assert!((score - 200_000_000.0).abs() < DELTA);
}

#[test]
fn golden_all_ones_ensemble_reductions() {
    let models: Vec<DenseModel> = (0..5).map(|_| all_ones_model()).collect();
    let input = vec![1.0; 200];

    let product = Ensemble::new(models.clone(), ScoreReduction::Product)
        .unwrap()
        .score(&input)
        .unwrap();
    assert!((product / 3.2e41 - 1.0).abs() < 1e-12);

    let clamped = Ensemble::new(models.clone(), ScoreReduction::ClampedProduct)
        .unwrap()
        .score(&input)
        .unwrap();
    assert!((clamped / 3.2e41 - 1.0).abs() < 1e-12);

    let sum = Ensemble::new(models, ScoreReduction::Sum)
        .unwrap()
        .score(&input)
        .unwrap();
    assert!((sum - 1_000_000_000.0).abs() < DELTA);
}

#[test]
fn identity_weight_stack_reduces_to_relu() {
    let model = DenseModel::with_uniform_activation(
        vec![tensor::identity(6), tensor::identity(6), tensor::identity(6)],
        Activation::Relu,
    )
    .unwrap();

    let input = vec![-2.0, 1.5, 0.0, -0.25, 4.0, -6.0];
    let output = model.evaluate(&input).unwrap();
    let expected: Vec<f64> = input.iter().map(|&v| v.max(0.0)).collect();
    assert_eq!(output, expected);

    // Idempotence: feeding the activated output back through changes nothing.
    assert_eq!(model.evaluate(&output).unwrap(), expected);
}

#[test]
fn batched_column_variant_matches_vector_variant() {
    let model = all_ones_model();
    let input = vec![0.5; 200];

    let scalar = model.evaluate_scalar(&input).unwrap();
    let batched = model.evaluate_scalar_batched(&input).unwrap();
    assert!((scalar - batched).abs() < 1e-6 * scalar.abs());
}

#[test]
fn mismatched_layer_dimensions_fail_without_partial_result() {
    // 1x3 layer after a 2-output layer cannot be constructed.
    let construction = DenseModel::with_uniform_activation(
        vec![ones(2, 4), ones(1, 3)],
        Activation::Relu,
    );
    assert!(matches!(
        construction,
        Err(EvaluationError::LayerChainMismatch { .. })
    ));

    // A well-formed model still rejects a wrong-length input at evaluation.
    let model = DenseModel::with_uniform_activation(vec![ones(2, 4)], Activation::Relu).unwrap();
    assert!(matches!(
        model.evaluate(&vec![1.0; 3]),
        Err(EvaluationError::InputSizeMismatch {
            expected: 4,
            actual: 3
        })
    ));
}

#[test]
fn per_layer_activation_is_independent() {
    // ReLU on the hidden layer only; the output layer may go negative.
    let hidden = Layer::new(ones(2, 2), Activation::Relu).unwrap();
    let output = Layer::new(vec![vec![-1.0, -1.0]], Activation::Identity).unwrap();
    let model = DenseModel::new(vec![hidden, output]).unwrap();

    let score = model.evaluate_scalar(&vec![1.0, 2.0]).unwrap();
    assert!((score - -6.0).abs() < DELTA);
}

//! Activation policies for dense layers.
//!
//! Only the two policies used by the bid models are supported: identity
//! (no activation) and ReLU. The activation is an explicit per-layer choice,
//! including for the last layer, rather than a hard-coded rule.

use serde::{Deserialize, Serialize};

use crate::tensor::{Matrix, Vector};

/// Represents the activation policy applied after a layer's product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Activation {
    /// No activation: f(x) = x.
    Identity,
    /// Rectified Linear Unit activation function: f(x) = max(0, x).
    Relu,
}

impl Activation {
    /// Get activation by string name.
    pub fn get_by_name(type_name: &str) -> Option<Self> {
        match type_name {
            "IDENTITY" => Some(Activation::Identity),
            "RELU" => Some(Activation::Relu),
            _ => None,
        }
    }

    /// Apply the activation function to a single value.
    pub fn apply_single(self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::Relu => x.max(0.0),
        }
    }

    /// Apply the activation function to a vector in place.
    ///
    /// Shape-preserving; callers that need the pre-activation values must
    /// copy beforehand.
    pub fn apply_in_place(self, values: &mut Vector) {
        if matches!(self, Activation::Identity) {
            return;
        }
        for val in values.iter_mut() {
            *val = self.apply_single(*val);
        }
    }

    /// Apply the activation function recursively over a matrix, row by row.
    pub fn apply_matrix_in_place(self, values: &mut Matrix) {
        if matches!(self, Activation::Identity) {
            return;
        }
        for row in values.iter_mut() {
            self.apply_in_place(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELTA: f64 = 1e-12;

    #[test]
    fn test_relu() {
        assert!((Activation::Relu.apply_single(1.0) - 1.0).abs() < DELTA);
        assert!((Activation::Relu.apply_single(-1.0) - 0.0).abs() < DELTA);
        assert!((Activation::Relu.apply_single(0.5) - 0.5).abs() < DELTA);
    }

    #[test]
    fn test_identity() {
        assert!((Activation::Identity.apply_single(-3.25) - -3.25).abs() < DELTA);
    }

    #[test]
    fn test_relu_in_place() {
        let mut values = vec![-1.0, 0.0, 2.5, -0.5];
        Activation::Relu.apply_in_place(&mut values);
        assert_eq!(values, vec![0.0, 0.0, 2.5, 0.0]);
    }

    #[test]
    fn test_relu_idempotent() {
        let mut once = vec![-2.0, 3.0, -0.25, 0.0];
        Activation::Relu.apply_in_place(&mut once);
        let mut twice = once.clone();
        Activation::Relu.apply_in_place(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_relu_matrix_recurses_rows() {
        let mut m = vec![vec![-1.0, 2.0], vec![3.0, -4.0]];
        Activation::Relu.apply_matrix_in_place(&mut m);
        assert_eq!(m, vec![vec![0.0, 2.0], vec![3.0, 0.0]]);
    }

    #[test]
    fn test_get_by_name() {
        assert_eq!(Activation::get_by_name("RELU"), Some(Activation::Relu));
        assert_eq!(
            Activation::get_by_name("IDENTITY"),
            Some(Activation::Identity)
        );
        assert_eq!(Activation::get_by_name("INVALID"), None);
    }
}

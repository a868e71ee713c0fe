//! Serialized model artifacts consumed by the graph runtime.
//!
//! A model ships as three parts: a topology descriptor (JSON), a weight
//! specification (JSON), and the raw weight bytes (little-endian f32,
//! concatenated in spec order). The parts are produced by export tooling
//! outside this crate; `from_dense_model` exists so benchmark fixtures and
//! tests can synthesize them for generated weights.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::model::DenseModel;

/// Graph node operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphOp {
    MatMul,
    Relu,
}

/// One node of the topology: an op over named predecessor tensors, with an
/// optional named weight tensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNodeSpec {
    pub name: String,
    pub op: GraphOp,
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<String>,
}

/// Topology descriptor: an ordered node list. The graph input is the
/// reserved tensor name `input`; the last node is the output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphTopology {
    pub nodes: Vec<GraphNodeSpec>,
}

/// One entry of the weight specification: a named tensor with its shape.
/// Offsets into the weight data follow spec order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
}

/// The reserved input tensor name.
pub const INPUT_TENSOR: &str = "input";

/// The three artifact parts of one serialized model.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    /// Topology descriptor, JSON-encoded.
    pub topology: Vec<u8>,
    /// Weight specification, JSON-encoded.
    pub weight_specs: Vec<u8>,
    /// Raw weight bytes, little-endian f32 in spec order.
    pub weight_data: Vec<u8>,
}

impl ModelArtifacts {
    /// Serializes a dense model into the three-part artifact form.
    ///
    /// Each layer becomes a `MatMul` node over a `w{i}` weight tensor,
    /// followed by a `Relu` node when the layer activates.
    pub fn from_dense_model(model: &DenseModel) -> Self {
        let mut nodes = Vec::new();
        let mut specs = Vec::new();
        let mut data = Vec::new();
        let mut previous = INPUT_TENSOR.to_string();

        for (i, layer) in model.layers().iter().enumerate() {
            let weight_name = format!("w{}", i);
            let dense_name = format!("dense{}", i);
            nodes.push(GraphNodeSpec {
                name: dense_name.clone(),
                op: GraphOp::MatMul,
                inputs: vec![previous.clone()],
                weights: Some(weight_name.clone()),
            });
            previous = dense_name;

            if layer.activation() == Activation::Relu {
                let relu_name = format!("relu{}", i);
                nodes.push(GraphNodeSpec {
                    name: relu_name.clone(),
                    op: GraphOp::Relu,
                    inputs: vec![previous.clone()],
                    weights: None,
                });
                previous = relu_name;
            }

            specs.push(WeightSpec {
                name: weight_name,
                shape: vec![layer.output_size(), layer.input_size()],
                dtype: "float32".to_string(),
            });
            for row in layer.weights() {
                for &value in row {
                    data.extend_from_slice(&(value as f32).to_le_bytes());
                }
            }
        }

        let topology = serde_json::to_vec(&GraphTopology { nodes })
            .expect("topology serialization cannot fail");
        let weight_specs =
            serde_json::to_vec(&specs).expect("weight spec serialization cannot fail");

        Self {
            topology,
            weight_specs,
            weight_data: data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_parts_from_model() {
        let model = DenseModel::with_uniform_activation(
            vec![vec![vec![1.0, 2.0], vec![3.0, 4.0]], vec![vec![0.5, -0.5]]],
            Activation::Relu,
        )
        .unwrap();
        let artifacts = ModelArtifacts::from_dense_model(&model);

        let topology: GraphTopology = serde_json::from_slice(&artifacts.topology).unwrap();
        // MatMul + Relu per layer.
        assert_eq!(topology.nodes.len(), 4);
        assert_eq!(topology.nodes[0].inputs, vec![INPUT_TENSOR.to_string()]);

        let specs: Vec<WeightSpec> = serde_json::from_slice(&artifacts.weight_specs).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].shape, vec![2, 2]);
        assert_eq!(specs[1].shape, vec![1, 2]);

        // 4 + 2 weights, 4 bytes each.
        assert_eq!(artifacts.weight_data.len(), 24);
    }

    #[test]
    fn test_identity_layer_has_no_relu_node() {
        let model = DenseModel::with_uniform_activation(
            vec![vec![vec![1.0]]],
            Activation::Identity,
        )
        .unwrap();
        let artifacts = ModelArtifacts::from_dense_model(&model);
        let topology: GraphTopology = serde_json::from_slice(&artifacts.topology).unwrap();
        assert_eq!(topology.nodes.len(), 1);
        assert_eq!(topology.nodes[0].op, GraphOp::MatMul);
    }
}

//! Tensor-graph runtime backend.
//!
//! Loads pre-serialized model artifacts once per model, builds an executable
//! node graph, and predicts over a tensor-shaped view of the input, reading
//! back a scalar. Arithmetic is f32, matching the serialized weight dtype.

pub mod artifact;

pub use artifact::{GraphNodeSpec, GraphOp, GraphTopology, ModelArtifacts, WeightSpec};

use std::collections::HashMap;
use std::time::Instant;

use crate::backends::{Fixture, InitTiming, ScoreBackend};
use crate::ensemble::ScoreReduction;
use crate::errors::{BackendError, BackendResult, EvaluationError};

use artifact::INPUT_TENSOR;

/// A named f32 tensor with its shape, sliced out of the weight data.
#[derive(Debug, Clone)]
struct GraphTensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

/// One executable node: op plus resolved tensor references.
#[derive(Debug)]
struct GraphNode {
    name: String,
    op: GraphOp,
    input: String,
    weights: Option<GraphTensor>,
}

/// One loaded model: an ordered node graph ready for prediction.
#[derive(Debug)]
pub struct GraphModel {
    nodes: Vec<GraphNode>,
    input_size: usize,
}

/// Artifact parts after JSON decoding, before graph construction.
struct ParsedArtifacts {
    topology: GraphTopology,
    specs: Vec<WeightSpec>,
    weight_data: Vec<u8>,
}

impl GraphModel {
    /// Loads one model from its three artifact parts.
    pub fn load(artifacts: &ModelArtifacts) -> BackendResult<Self> {
        Self::build(Self::parse(artifacts)?)
    }

    fn parse(artifacts: &ModelArtifacts) -> BackendResult<ParsedArtifacts> {
        let topology: GraphTopology = serde_json::from_slice(&artifacts.topology).map_err(|e| {
            BackendError::ArtifactParseFailed {
                part: "topology".to_string(),
                message: e.to_string(),
            }
        })?;
        let specs: Vec<WeightSpec> =
            serde_json::from_slice(&artifacts.weight_specs).map_err(|e| {
                BackendError::ArtifactParseFailed {
                    part: "weight_specs".to_string(),
                    message: e.to_string(),
                }
            })?;
        Ok(ParsedArtifacts {
            topology,
            specs,
            weight_data: artifacts.weight_data.clone(),
        })
    }

    fn build(parsed: ParsedArtifacts) -> BackendResult<Self> {
        let expected: usize = parsed
            .specs
            .iter()
            .map(|s| s.shape.iter().product::<usize>() * std::mem::size_of::<f32>())
            .sum();
        if parsed.weight_data.len() != expected {
            return Err(BackendError::WeightDataSizeMismatch {
                expected,
                actual: parsed.weight_data.len(),
            });
        }

        // Slice the raw bytes into named tensors, in spec order.
        let mut tensors: HashMap<String, GraphTensor> = HashMap::new();
        let mut offset = 0usize;
        for spec in &parsed.specs {
            if spec.shape.is_empty() {
                return Err(BackendError::ArtifactParseFailed {
                    part: "weight_specs".to_string(),
                    message: format!("spec '{}' has an empty shape", spec.name),
                });
            }
            let count: usize = spec.shape.iter().product();
            let bytes = &parsed.weight_data[offset..offset + count * 4];
            let data = bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            tensors.insert(
                spec.name.clone(),
                GraphTensor {
                    shape: spec.shape.clone(),
                    data,
                },
            );
            offset += count * 4;
        }

        if parsed.topology.nodes.is_empty() {
            return Err(BackendError::MissingGraphOutput);
        }

        let mut nodes = Vec::with_capacity(parsed.topology.nodes.len());
        let mut known: Vec<&str> = vec![INPUT_TENSOR];
        let mut used_specs: HashMap<&str, bool> =
            parsed.specs.iter().map(|s| (s.name.as_str(), false)).collect();
        let mut input_size = None;

        for spec in &parsed.topology.nodes {
            let input = spec
                .inputs
                .first()
                .ok_or_else(|| BackendError::UnknownTensorReference {
                    node: spec.name.clone(),
                    tensor: String::new(),
                })?;
            if !known.contains(&input.as_str()) {
                return Err(BackendError::UnknownTensorReference {
                    node: spec.name.clone(),
                    tensor: input.clone(),
                });
            }

            let weights = match (&spec.op, &spec.weights) {
                (GraphOp::MatMul, Some(name)) => {
                    let tensor = tensors.get(name).cloned().ok_or_else(|| {
                        BackendError::UnknownTensorReference {
                            node: spec.name.clone(),
                            tensor: name.clone(),
                        }
                    })?;
                    if let Some(flag) = used_specs.get_mut(name.as_str()) {
                        *flag = true;
                    }
                    if input == INPUT_TENSOR && input_size.is_none() {
                        input_size = Some(tensor.shape[tensor.shape.len() - 1]);
                    }
                    Some(tensor)
                }
                (GraphOp::MatMul, None) => {
                    return Err(BackendError::UnsupportedGraphOp {
                        op: "MatMul without weights".to_string(),
                    });
                }
                (GraphOp::Relu, _) => None,
            };

            nodes.push(GraphNode {
                name: spec.name.clone(),
                op: spec.op,
                input: input.clone(),
                weights,
            });
            known.push(spec.name.as_str());
        }

        for (name, used) in used_specs {
            if !used {
                return Err(BackendError::UnusedWeightSpec {
                    name: name.to_string(),
                });
            }
        }

        let input_size = input_size.ok_or(BackendError::MissingGraphOutput)?;

        Ok(Self { nodes, input_size })
    }

    /// Number of inputs the graph's first dense node consumes.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Runs a prediction over a `1×n` view of the input and reads back the
    /// scalar at index 0 of the output tensor.
    pub fn predict(&self, input: &[f64]) -> BackendResult<f64> {
        if input.len() != self.input_size {
            return Err(BackendError::Evaluation(
                EvaluationError::InputSizeMismatch {
                    expected: self.input_size,
                    actual: input.len(),
                },
            ));
        }

        let mut env: HashMap<&str, Vec<f32>> = HashMap::new();
        env.insert(INPUT_TENSOR, input.iter().map(|&v| v as f32).collect());

        let mut output: &str = INPUT_TENSOR;
        for node in &self.nodes {
            let operand = &env[node.input.as_str()];
            let value = match node.op {
                GraphOp::MatMul => {
                    let weights = node.weights.as_ref().expect("validated at load");
                    let rows = weights.shape[0];
                    let cols = weights.shape[weights.shape.len() - 1];
                    if operand.len() != cols {
                        return Err(BackendError::Evaluation(
                            EvaluationError::MatrixVectorDimensionMismatch {
                                cols,
                                len: operand.len(),
                            },
                        ));
                    }
                    let mut out = vec![0.0f32; rows];
                    for (i, slot) in out.iter_mut().enumerate() {
                        let mut sum = 0.0f32;
                        for j in 0..cols {
                            sum += weights.data[i * cols + j] * operand[j];
                        }
                        *slot = sum;
                    }
                    out
                }
                GraphOp::Relu => operand.iter().map(|&v| v.max(0.0)).collect(),
            };
            env.insert(node.name.as_str(), value);
            output = node.name.as_str();
        }

        env[output]
            .first()
            .map(|&v| v as f64)
            .ok_or(BackendError::MissingGraphOutput)
    }
}

/// Backend handle over a set of loaded graph models.
pub struct GraphBackend {
    models: Vec<GraphModel>,
    reduction: ScoreReduction,
    init: InitTiming,
}

impl GraphBackend {
    /// Loads every model's artifacts once, timing the JSON decode and the
    /// graph construction as the backend's initialization phases.
    pub fn new(artifacts: &[ModelArtifacts], reduction: ScoreReduction) -> BackendResult<Self> {
        let parse_start = Instant::now();
        let parsed = artifacts
            .iter()
            .map(GraphModel::parse)
            .collect::<BackendResult<Vec<_>>>()?;
        let compile = parse_start.elapsed();

        let build_start = Instant::now();
        let models = parsed
            .into_iter()
            .map(GraphModel::build)
            .collect::<BackendResult<Vec<_>>>()?;
        let instantiate = build_start.elapsed();

        if models.is_empty() {
            return Err(BackendError::MissingGraphOutput);
        }

        Ok(Self {
            models,
            reduction,
            init: InitTiming {
                compile,
                instantiate,
            },
        })
    }

    /// The loaded models.
    pub fn models(&self) -> &[GraphModel] {
        &self.models
    }
}

impl ScoreBackend for GraphBackend {
    fn label(&self) -> &str {
        "graph"
    }

    fn score(&mut self, fixture: &Fixture) -> BackendResult<f64> {
        let mut outputs = Vec::with_capacity(self.models.len());
        for model in &self.models {
            outputs.push(model.predict(&fixture.input)?);
        }
        Ok(self.reduction.reduce(&outputs))
    }

    fn init_timing(&self) -> Option<InitTiming> {
        Some(self.init)
    }
}

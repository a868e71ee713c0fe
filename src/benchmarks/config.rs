//! Benchmark configuration structures.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::activation::Activation;
use crate::benchmarks::fixtures::{
    CANONICAL_INPUT_LEN, CANONICAL_LAYER_SHAPES, CANONICAL_MODEL_COUNT, Sampling,
};
use crate::ensemble::ScoreReduction;
use crate::errors::{BenchmarkError, BenchmarkResult};
use log::warn;

/// Configuration of one benchmark run.
///
/// Validation happens before any fixture generation: a self-contradictory
/// configuration never reaches the timed phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub name: String,
    pub description: String,
    /// Untimed iterations run before measurement to reach steady state.
    pub warmups: u32,
    /// Timed iterations; every reported statistic covers exactly this many.
    pub loops: u32,
    pub sampling: Sampling,
    pub reduction: ScoreReduction,
    pub activation: Activation,
    pub input_len: usize,
    pub model_count: usize,
    /// Layer shapes as (rows, cols), first to last.
    pub layer_shapes: Vec<(usize, usize)>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            name: "bid_forward_pass".to_string(),
            description: "Dense forward-pass ensemble scoring".to_string(),
            warmups: 10,
            loops: 100,
            sampling: Sampling::Normal,
            reduction: ScoreReduction::ClampedProduct,
            activation: Activation::Relu,
            input_len: CANONICAL_INPUT_LEN,
            model_count: CANONICAL_MODEL_COUNT,
            layer_shapes: CANONICAL_LAYER_SHAPES.to_vec(),
        }
    }
}

impl BenchmarkConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> BenchmarkResult<()> {
        if self.loops == 0 {
            return Err(BenchmarkError::InvalidLoops { value: self.loops });
        }
        if self.warmups > self.loops {
            return Err(BenchmarkError::WarmupsExceedLoops {
                warmups: self.warmups,
                loops: self.loops,
            });
        }
        if self.input_len == 0 {
            return Err(BenchmarkError::InvalidInputLength {
                value: self.input_len,
            });
        }
        if self.model_count == 0 {
            return Err(BenchmarkError::InvalidModelCount {
                value: self.model_count,
            });
        }

        let chains = !self.layer_shapes.is_empty()
            && self.layer_shapes[0].1 == self.input_len
            && self
                .layer_shapes
                .windows(2)
                .all(|pair| pair[1].1 == pair[0].0)
            && self.layer_shapes.iter().all(|&(r, c)| r > 0 && c > 0);
        if !chains {
            return Err(BenchmarkError::InvalidLayerShapes {
                shapes: self.layer_shapes.clone(),
            });
        }

        Ok(())
    }

    /// Total fixture pairs generated for one run.
    pub fn total_iterations(&self) -> u32 {
        self.warmups + self.loops
    }
}

/// Configuration loader that handles JSON files with fallbacks.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a benchmark configuration file, falling back to the canonical
    /// default when the file does not exist.
    pub fn load(path: &str) -> BenchmarkResult<BenchmarkConfig> {
        match fs::read_to_string(path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| BenchmarkError::ConfigParseError {
                    path: path.to_string(),
                    source: e,
                })
            }
            Err(_) => {
                warn!(
                    "Config file '{}' not found, using default benchmark configuration",
                    path
                );
                Ok(BenchmarkConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BenchmarkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_warmups_exceeding_loops_rejected() {
        let config = BenchmarkConfig {
            warmups: 150,
            loops: 100,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BenchmarkError::WarmupsExceedLoops {
                warmups: 150,
                loops: 100
            })
        ));
    }

    #[test]
    fn test_zero_loops_rejected() {
        let config = BenchmarkConfig {
            warmups: 0,
            loops: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BenchmarkError::InvalidLoops { value: 0 })
        ));
    }

    #[test]
    fn test_broken_layer_chain_rejected() {
        let config = BenchmarkConfig {
            input_len: 4,
            layer_shapes: vec![(3, 4), (1, 2)],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BenchmarkError::InvalidLayerShapes { .. })
        ));
    }

    #[test]
    fn test_missing_config_file_falls_back_to_default() {
        let config = ConfigLoader::load("configs/does_not_exist.json").unwrap();
        assert_eq!(config.loops, 100);
        assert_eq!(config.warmups, 10);
    }
}

//! Core benchmark execution logic.
//!
//! A run has three strictly sequential, single-threaded phases: fixture
//! generation (untimed), warm-up (untimed), measurement (per-iteration
//! wall-clock timing). The backend under test only varies the per-iteration
//! scoring call; the control flow here is identical for every backend.

use std::time::Instant;

use log::{debug, info};

use crate::backends::{Fixture, ScoreBackend};
use crate::benchmarks::config::BenchmarkConfig;
use crate::benchmarks::fixtures::FixtureGenerator;
use crate::benchmarks::report::TimingReport;
use crate::errors::BenchmarkResult;

/// Main benchmark runner.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Runs a benchmark with a generator seeded from OS entropy.
    pub fn run(
        backend: &mut dyn ScoreBackend,
        config: &BenchmarkConfig,
    ) -> BenchmarkResult<TimingReport> {
        let mut generator = FixtureGenerator::new(config.sampling);
        Self::run_with_generator(backend, config, &mut generator)
    }

    /// Runs a benchmark with a caller-provided fixture generator.
    ///
    /// The first error, whether configuration, generation, or scoring, aborts the
    /// whole run, so a returned report always reflects exactly
    /// `config.loops` successful measured iterations.
    pub fn run_with_generator(
        backend: &mut dyn ScoreBackend,
        config: &BenchmarkConfig,
        generator: &mut FixtureGenerator,
    ) -> BenchmarkResult<TimingReport> {
        config.validate()?;

        info!(
            "Benchmarking {} backend: {} warm-ups, {} measured loops",
            backend.label(),
            config.warmups,
            config.loops
        );

        // Phase 1: generation. No timing happens here.
        let total = config.total_iterations() as usize;
        let mut fixtures = Vec::with_capacity(total);
        for _ in 0..total {
            let input = generator.random_vector(config.input_len);
            let ensemble = if backend.wants_generated_weights() {
                Some(generator.random_ensemble(
                    config.model_count,
                    &config.layer_shapes,
                    config.activation,
                    config.reduction,
                )?)
            } else {
                None
            };
            fixtures.push(Fixture { input, ensemble });
        }

        // Phase 2: warm-up. Outputs and timings are discarded.
        let warmups = config.warmups as usize;
        for fixture in &fixtures[..warmups] {
            backend.score(fixture)?;
        }

        // Phase 3: measurement.
        let mut timings = Vec::with_capacity(config.loops as usize);
        for (i, fixture) in fixtures[warmups..].iter().enumerate() {
            let start = Instant::now();
            let score = backend.score(fixture)?;
            timings.push(start.elapsed());
            debug!("iteration {}: score {}", i, score);
        }

        let report = TimingReport::new(
            backend.label().to_string(),
            config.warmups,
            config.loops,
            &timings,
            backend.init_timing(),
        );
        info!(
            "{} backend: avg {:.3} ms over {} loops",
            report.backend,
            report.average.as_secs_f64() * 1000.0,
            report.loops
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::fixtures::Sampling;
    use crate::errors::{BackendResult, BenchmarkError};

    /// Backend that counts invocations, for control-flow assertions.
    struct CountingBackend {
        calls: u32,
    }

    impl ScoreBackend for CountingBackend {
        fn label(&self) -> &str {
            "counting"
        }

        fn score(&mut self, _fixture: &Fixture) -> BackendResult<f64> {
            self.calls += 1;
            Ok(1.0)
        }
    }

    fn small_config(warmups: u32, loops: u32) -> BenchmarkConfig {
        BenchmarkConfig {
            warmups,
            loops,
            input_len: 3,
            model_count: 2,
            layer_shapes: vec![(2, 3), (1, 2)],
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_iteration_counts() {
        let mut backend = CountingBackend { calls: 0 };
        let config = small_config(10, 100);
        let mut generator = FixtureGenerator::with_seed(Sampling::Normal, 5);
        let report =
            BenchmarkRunner::run_with_generator(&mut backend, &config, &mut generator).unwrap();

        assert_eq!(backend.calls, 110);
        assert_eq!(report.loops, 100);
        assert_eq!(report.warmups, 10);
        assert!(report.init.is_none());
    }

    #[test]
    fn test_average_consistent_with_total() {
        let mut backend = CountingBackend { calls: 0 };
        let config = small_config(0, 25);
        let report = BenchmarkRunner::run(&mut backend, &config).unwrap();
        let expected = report.total / report.loops;
        assert_eq!(report.average, expected);
    }

    #[test]
    fn test_invalid_config_rejected_before_scoring() {
        let mut backend = CountingBackend { calls: 0 };
        let config = small_config(150, 100);
        let result = BenchmarkRunner::run(&mut backend, &config);
        assert!(matches!(
            result,
            Err(BenchmarkError::WarmupsExceedLoops {
                warmups: 150,
                loops: 100
            })
        ));
        assert_eq!(backend.calls, 0);
    }
}

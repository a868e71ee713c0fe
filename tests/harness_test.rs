//! Behavioral tests for the benchmark harness: phase ordering, iteration
//! counts, statistics consistency, and fail-fast configuration handling.

use std::time::Duration;

use bidnet_inference::backends::{Fixture, NativeBackend, ScoreBackend};
use bidnet_inference::benchmarks::{BenchmarkConfig, BenchmarkRunner, FixtureGenerator, Sampling};
use bidnet_inference::errors::{BackendResult, BenchmarkError};

/// Records the order of scoring calls so phase structure can be asserted.
struct RecordingBackend {
    calls: Vec<usize>,
    wants_weights: bool,
}

impl RecordingBackend {
    fn new(wants_weights: bool) -> Self {
        Self {
            calls: Vec::new(),
            wants_weights,
        }
    }
}

impl ScoreBackend for RecordingBackend {
    fn label(&self) -> &str {
        "recording"
    }

    fn wants_generated_weights(&self) -> bool {
        self.wants_weights
    }

    fn score(&mut self, fixture: &Fixture) -> BackendResult<f64> {
        self.calls.push(fixture.input.len());
        Ok(1.0)
    }
}

fn small_config(warmups: u32, loops: u32) -> BenchmarkConfig {
    BenchmarkConfig {
        warmups,
        loops,
        input_len: 4,
        model_count: 2,
        layer_shapes: vec![(3, 4), (1, 3)],
        ..Default::default()
    }
}

#[test]
fn exactly_warmups_untimed_plus_loops_timed() {
    let mut backend = RecordingBackend::new(false);
    let config = small_config(10, 100);
    let report = BenchmarkRunner::run(&mut backend, &config).unwrap();

    assert_eq!(backend.calls.len(), 110);
    assert_eq!(report.warmups, 10);
    assert_eq!(report.loops, 100);
    // Average must equal total / loops within Duration integer division.
    assert_eq!(report.average, report.total / 100);
    assert!(report.min <= report.average);
    assert!(report.average <= report.max + Duration::from_nanos(1));
}

#[test]
fn warmups_exceeding_loops_rejected_before_any_generation() {
    let mut backend = RecordingBackend::new(false);
    let config = small_config(150, 100);
    let result = BenchmarkRunner::run(&mut backend, &config);
    assert!(matches!(
        result,
        Err(BenchmarkError::WarmupsExceedLoops {
            warmups: 150,
            loops: 100
        })
    ));
    assert!(backend.calls.is_empty());
}

#[test]
fn weight_fixtures_generated_only_on_request() {
    struct EnsembleAssertingBackend {
        expect_ensemble: bool,
    }

    impl ScoreBackend for EnsembleAssertingBackend {
        fn label(&self) -> &str {
            "asserting"
        }

        fn wants_generated_weights(&self) -> bool {
            self.expect_ensemble
        }

        fn score(&mut self, fixture: &Fixture) -> BackendResult<f64> {
            assert_eq!(fixture.ensemble.is_some(), self.expect_ensemble);
            Ok(0.0)
        }
    }

    let config = small_config(1, 3);
    for expect_ensemble in [false, true] {
        let mut backend = EnsembleAssertingBackend { expect_ensemble };
        BenchmarkRunner::run(&mut backend, &config).unwrap();
    }
}

#[test]
fn native_backend_runs_end_to_end() {
    let mut backend = NativeBackend;
    let config = small_config(2, 8);
    let mut generator = FixtureGenerator::with_seed(Sampling::Normal, 99);
    let report =
        BenchmarkRunner::run_with_generator(&mut backend, &config, &mut generator).unwrap();

    assert_eq!(report.backend, "native");
    assert_eq!(report.loops, 8);
    assert!(report.init.is_none());
    assert!(report.total >= report.min);
}

#[test]
fn first_scoring_error_aborts_the_run() {
    struct FailingBackend {
        calls: u32,
        fail_at: u32,
    }

    impl ScoreBackend for FailingBackend {
        fn label(&self) -> &str {
            "failing"
        }

        fn score(&mut self, _fixture: &Fixture) -> BackendResult<f64> {
            self.calls += 1;
            if self.calls == self.fail_at {
                Err(bidnet_inference::errors::BackendError::MissingWeightFixture)
            } else {
                Ok(1.0)
            }
        }
    }

    let mut backend = FailingBackend {
        calls: 0,
        fail_at: 5,
    };
    let config = small_config(2, 10);
    let result = BenchmarkRunner::run(&mut backend, &config);
    assert!(matches!(result, Err(BenchmarkError::Backend(_))));
    // Aborted at the failing iteration: no further scoring happened.
    assert_eq!(backend.calls, 5);
}

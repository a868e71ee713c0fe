//! Benchmark binary comparing the bid evaluation backends.
//!
//! Runs the canonical workload (five 4-layer models over a 200-element
//! input) through every available backend and prints a comparative timing
//! analysis. Backends whose initialization reports unavailability are
//! skipped with a warning; the library itself always propagates the error.

use log::{info, warn};

use bidnet_inference::backends::graph::ModelArtifacts;
use bidnet_inference::backends::{GraphBackend, KernelBackend, NativeBackend};
use bidnet_inference::benchmarks::{
    BenchmarkConfig, BenchmarkRunner, ConfigLoader, FixtureGenerator, TimingReport,
    print_timing_analysis,
};
use bidnet_inference::errors::{BackendError, BenchmarkError};

fn run_native(config: &BenchmarkConfig) -> Result<TimingReport, BenchmarkError> {
    let mut backend = NativeBackend;
    BenchmarkRunner::run(&mut backend, config)
}

fn run_kernel(config: &BenchmarkConfig) -> Result<TimingReport, BenchmarkError> {
    let mut generator = FixtureGenerator::new(config.sampling);
    let ensemble = generator.random_ensemble(
        config.model_count,
        &config.layer_shapes,
        config.activation,
        config.reduction,
    )?;
    let mut backend = KernelBackend::new(&ensemble)?;
    BenchmarkRunner::run_with_generator(&mut backend, config, &mut generator)
}

fn run_graph(config: &BenchmarkConfig) -> Result<TimingReport, BenchmarkError> {
    let mut generator = FixtureGenerator::new(config.sampling);
    let ensemble = generator.random_ensemble(
        config.model_count,
        &config.layer_shapes,
        config.activation,
        config.reduction,
    )?;
    let artifacts: Vec<ModelArtifacts> = ensemble
        .models()
        .iter()
        .map(ModelArtifacts::from_dense_model)
        .collect();
    let mut backend = GraphBackend::new(&artifacts, config.reduction)?;
    BenchmarkRunner::run_with_generator(&mut backend, config, &mut generator)
}

fn main() {
    env_logger::init();

    let config = match ConfigLoader::load("configs/benchmark.json") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load benchmark configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid benchmark configuration: {}", e);
        std::process::exit(1);
    }

    info!("{}", "=".repeat(80));
    info!("Bid Forward-Pass Benchmark");
    info!(
        "Workload: {} models, input length {}, layer shapes {:?}",
        config.model_count, config.input_len, config.layer_shapes
    );
    info!(
        "{} warm-ups, {} measured loops, {:?} sampling, {:?} reduction",
        config.warmups, config.loops, config.sampling, config.reduction
    );
    info!("{}", "=".repeat(80));

    let mut reports = Vec::new();

    match run_native(&config) {
        Ok(report) => reports.push(report),
        Err(e) => {
            eprintln!("Native benchmark failed: {}", e);
            std::process::exit(1);
        }
    }

    match run_kernel(&config) {
        Ok(report) => reports.push(report),
        Err(BenchmarkError::Backend(BackendError::DeviceNotAvailable { message })) => {
            warn!("Skipping kernel backend, no device: {}", message);
        }
        Err(e) => {
            eprintln!("Kernel benchmark failed: {}", e);
            std::process::exit(1);
        }
    }

    match run_graph(&config) {
        Ok(report) => reports.push(report),
        Err(e) => {
            eprintln!("Graph benchmark failed: {}", e);
            std::process::exit(1);
        }
    }

    print_timing_analysis(&reports);

    println!("\n{}", "=".repeat(80));
    println!("Benchmark Complete");
    println!("{}", "=".repeat(80));
}

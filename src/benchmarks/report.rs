//! Timing statistics for benchmark runs.

use std::time::Duration;

use crate::backends::InitTiming;

/// Per-run timing statistics over exactly `loops` measured iterations.
#[derive(Debug, Clone)]
pub struct TimingReport {
    pub backend: String,
    pub warmups: u32,
    pub loops: u32,
    pub min: Duration,
    pub max: Duration,
    pub total: Duration,
    pub average: Duration,
    /// One-off backend initialization, reported outside the iteration loop.
    pub init: Option<InitTiming>,
}

impl TimingReport {
    /// Builds a report from per-iteration timings.
    pub fn new(
        backend: String,
        warmups: u32,
        loops: u32,
        timings: &[Duration],
        init: Option<InitTiming>,
    ) -> Self {
        let total: Duration = timings.iter().sum();
        let min = timings.iter().min().copied().unwrap_or_default();
        let max = timings.iter().max().copied().unwrap_or_default();
        let average = if loops > 0 {
            total / loops
        } else {
            Duration::ZERO
        };

        Self {
            backend,
            warmups,
            loops,
            min,
            max,
            total,
            average,
            init,
        }
    }

    /// Average-time ratio against a baseline report.
    pub fn overhead_ratio(&self, baseline: &TimingReport) -> f64 {
        self.average.as_secs_f64() / baseline.average.as_secs_f64()
    }

    /// Average-time overhead against a baseline, in percent.
    pub fn overhead_percentage(&self, baseline: &TimingReport) -> f64 {
        (self.overhead_ratio(baseline) - 1.0) * 100.0
    }
}

/// Prints detailed timing analysis across backends.
pub fn print_timing_analysis(reports: &[TimingReport]) {
    if reports.is_empty() {
        return;
    }

    let baseline = &reports[0];

    println!("\n{}", "=".repeat(80));
    println!("Detailed Results");
    println!("{}", "=".repeat(80));

    for report in reports {
        println!("\n📊 {} backend", report.backend);
        println!(
            "   Average time: {:.3} ms over {} measured loops ({} warm-ups)",
            report.average.as_secs_f64() * 1000.0,
            report.loops,
            report.warmups
        );
        println!(
            "   Min: {:.3} ms, Max: {:.3} ms, Total: {:.3} ms",
            report.min.as_secs_f64() * 1000.0,
            report.max.as_secs_f64() * 1000.0,
            report.total.as_secs_f64() * 1000.0
        );
        if let Some(init) = report.init {
            println!(
                "   Initialization: compile {:.3} ms, instantiate {:.3} ms",
                init.compile.as_secs_f64() * 1000.0,
                init.instantiate.as_secs_f64() * 1000.0
            );
        }
        if report.backend != baseline.backend {
            println!(
                "   Overhead vs {}: {:.2}x ({:.1}%)",
                baseline.backend,
                report.overhead_ratio(baseline),
                report.overhead_percentage(baseline)
            );
        }
    }

    println!("\n🚀 Speed Rankings (fastest to slowest):");
    let mut sorted = reports.to_vec();
    sorted.sort_by_key(|r| r.average);
    for (i, report) in sorted.iter().enumerate() {
        let rank_emoji = match i {
            0 => "🥇",
            1 => "🥈",
            2 => "🥉",
            _ => "  ",
        };
        println!(
            "   {} {}: {:.3} ms",
            rank_emoji,
            report.backend,
            report.average.as_secs_f64() * 1000.0
        );
    }
}

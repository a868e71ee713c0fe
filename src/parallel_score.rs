//! Parallel batch scoring of many inputs against one ensemble.
//!
//! Samples do not share weights or accumulators, so the batch distributes
//! across scoped threads with an atomic work-stealing counter and no locks.
//! The benchmark harness does not use this path: its phases stay
//! single-threaded.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::ensemble::Ensemble;
use crate::errors::{ParallelScoreError, ParallelScoreResult};

#[derive(Clone, Copy)]
struct SendPtr {
    ptr: *mut f64,
}

impl SendPtr {
    fn new(ptr: *mut f64) -> Self {
        Self { ptr }
    }

    /// Safety: callers must write each index from exactly one thread.
    unsafe fn write(self, index: usize, value: f64) {
        unsafe { *self.ptr.add(index) = value };
    }
}

unsafe impl Send for SendPtr {}
unsafe impl Sync for SendPtr {}

/// Thread-count configuration for batch scoring.
#[derive(Debug, Clone, Default)]
pub struct ScoreConfig {
    threads: Option<usize>,
}

impl ScoreConfig {
    pub fn new() -> Self {
        Self { threads: None }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn get_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Scores every sample in a packed input buffer against the ensemble.
///
/// `inputs` holds `num_samples * input_size` values, sample-major. Returns
/// one score per sample, in sample order.
pub fn score_batch(
    ensemble: &Ensemble,
    inputs: &[f64],
    config: &ScoreConfig,
) -> ParallelScoreResult<Vec<f64>> {
    let input_size = ensemble.input_size();
    if !inputs.len().is_multiple_of(input_size) {
        return Err(ParallelScoreError::InputBufferSizeMismatch {
            actual: inputs.len(),
            input_size,
        });
    }

    let num_samples = inputs.len() / input_size;
    if num_samples == 0 {
        return Ok(Vec::new());
    }

    let num_threads = config.get_threads();
    if num_threads == 0 {
        return Err(ParallelScoreError::InvalidThreadCount { count: 0 });
    }

    let mut scores = vec![0.0f64; num_samples];
    let sample_counter = AtomicUsize::new(0);

    thread::scope(|scope| {
        let sample_counter_ref = &sample_counter;
        let scores_ptr = SendPtr::new(scores.as_mut_ptr());

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                scope.spawn(move || -> ParallelScoreResult<()> {
                    loop {
                        let sample_index = sample_counter_ref.fetch_add(1, Ordering::Relaxed);
                        if sample_index >= num_samples {
                            break;
                        }

                        let start = sample_index * input_size;
                        let sample = inputs[start..start + input_size].to_vec();
                        let score = ensemble.score(&sample).map_err(|e| {
                            ParallelScoreError::ScoreFailed {
                                sample_index,
                                message: e.to_string(),
                            }
                        })?;

                        unsafe { scores_ptr.write(sample_index, score) };
                    }

                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(result) => result?,
                Err(_) => return Err(ParallelScoreError::ThreadPanicked),
            }
        }

        Ok(())
    })?;

    Ok(scores)
}

//! Batch runner for independent engagements.
//!
//! Runs are spread over a bounded rayon pool so a batch never has more than
//! `worker_threads` engine processes alive. Results are buffered by run
//! index: run `i` lands at position `i` whatever order runs finish in.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use battle_core::error::{BattleError, Result};
use battle_core::outcome::BattleOutcome;
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, info};

use crate::engine::CancelToken;

/// Build the worker pool batches run on.
pub fn build_pool(worker_threads: usize) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(worker_threads)
        .thread_name(|i| format!("battle-run-{i}"))
        .build()
        .map_err(|e| BattleError::EngineFailure {
            status: None,
            message: format!("failed to start batch workers: {e}"),
        })
}

/// Progress tracking for batch runs
#[derive(Debug)]
struct BatchProgress {
    total: usize,
    completed: AtomicUsize,
    start_time: Instant,
}

impl BatchProgress {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    fn record_completion(&self) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if completed % 10 == 0 {
            debug!("Progress: {}/{}", completed, self.total);
        }
    }

    fn finish(&self, failed: bool) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let completed = self.completed.load(Ordering::Relaxed);
        info!(
            completed,
            total = self.total,
            failed,
            "Batch finished in {:.2}s ({:.1} runs/sec)",
            seconds,
            completed as f64 / seconds.max(f64::EPSILON)
        );
    }
}

/// Run one engagement per seed, stopping at the first failure.
///
/// `run` receives the run index, its seed and the batch's cancel token. The
/// first error recorded fires the token: queued runs are skipped and
/// in-flight runs that honour the token stop early. That first error is the
/// batch's result.
pub fn run_batch<F>(pool: &ThreadPool, seeds: &[u32], run: F) -> Result<Vec<BattleOutcome>>
where
    F: Fn(usize, u32, &CancelToken) -> Result<BattleOutcome> + Sync,
{
    info!(runs = seeds.len(), "Starting batch");

    let progress = BatchProgress::new(seeds.len());
    let cancel = CancelToken::new();
    let first_error: Mutex<Option<BattleError>> = Mutex::new(None);

    let slots: Vec<Option<BattleOutcome>> = pool.install(|| {
        seeds
            .par_iter()
            .enumerate()
            .map(|(index, &seed)| {
                if cancel.is_cancelled() {
                    return None;
                }
                match run(index, seed, &cancel) {
                    Ok(outcome) => {
                        progress.record_completion();
                        Some(outcome)
                    }
                    Err(e) => {
                        if let Ok(mut first) = first_error.lock() {
                            if first.is_none() {
                                debug!(index, seed, error = %e, "Run failed, cancelling batch");
                                *first = Some(e);
                                cancel.cancel();
                            }
                        }
                        None
                    }
                }
            })
            .collect()
    });

    let first_error = first_error
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    progress.finish(first_error.is_some());

    if let Some(e) = first_error {
        return Err(e);
    }
    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| BattleError::MalformedOutput("batch lost a run result".to_string()))
}

/// Run one engagement per seed and keep every result.
///
/// Failures do not cancel other runs; position `i` holds run `i`'s result.
pub fn run_batch_each<F>(pool: &ThreadPool, seeds: &[u32], run: F) -> Vec<Result<BattleOutcome>>
where
    F: Fn(usize, u32, &CancelToken) -> Result<BattleOutcome> + Sync,
{
    info!(runs = seeds.len(), "Starting best-effort batch");

    let progress = BatchProgress::new(seeds.len());
    let cancel = CancelToken::new();

    let results: Vec<_> = pool.install(|| {
        seeds
            .par_iter()
            .enumerate()
            .map(|(index, &seed)| {
                let result = run(index, seed, &cancel);
                progress.record_completion();
                result
            })
            .collect()
    });

    progress.finish(results.iter().any(Result::is_err));
    results
}

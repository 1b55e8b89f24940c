//! Multi-threaded recording of large arrival sets.
//!
//! A single recorder is written by one thread at a time. To spread work,
//! every batch of arrivals is recorded into its own blank copy on the rayon
//! pool and the partial results are merged back on the calling thread. Partials
//! are merged in batch order so the summation order, and therefore the output,
//! does not depend on thread scheduling.

use crate::arrival::RayArrival;
use crate::error::{EarshotError, Result};
use crate::recorder::BinauralRecorder;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Splits arrivals into batches and records them in parallel.
///
/// The default renderer runs on rayon's global pool; [`new`](Self::new)
/// builds a dedicated pool with a fixed number of workers.
#[derive(Debug, Default)]
pub struct ParallelRenderer {
    pool: Option<ThreadPool>,
}

impl ParallelRenderer {
    /// Creates a renderer with its own pool of `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns [`EarshotError::Configuration`] if `workers` is zero or the
    /// pool cannot be started.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(EarshotError::Configuration(
                "Renderer needs at least one worker".into(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("earshot-render-{}", i))
            .build()
            .map_err(|e| {
                EarshotError::Configuration(format!("Failed to start render pool: {}", e))
            })?;
        Ok(Self { pool: Some(pool) })
    }

    /// Number of threads arrivals are spread over.
    pub fn workers(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Records all `arrivals` into `recorder`.
    ///
    /// Arrivals are split into one contiguous batch per worker.
    pub fn render(&self, recorder: &mut BinauralRecorder, arrivals: &[RayArrival]) {
        if arrivals.is_empty() {
            return;
        }
        let chunk_size = arrivals.len().div_ceil(self.workers());
        let batches: Vec<&[RayArrival]> = arrivals.chunks(chunk_size).collect();
        self.render_batches(recorder, &batches);
    }

    /// Records each batch into a blank copy and merges the copies in batch order.
    pub fn render_batches(&self, recorder: &mut BinauralRecorder, batches: &[&[RayArrival]]) {
        let template: &BinauralRecorder = recorder;
        log::debug!(
            "Rendering {} batches for recorder '{}' on {} workers",
            batches.len(),
            template.file_name(),
            self.workers()
        );

        let record_batches = || -> Vec<BinauralRecorder> {
            batches
                .par_iter()
                .map(|batch| {
                    let mut partial = template.make_blank_copy();
                    for arrival in batch.iter() {
                        partial.record_arrival(arrival);
                    }
                    partial
                })
                .collect()
        };
        let partials = match &self.pool {
            Some(pool) => pool.install(record_batches),
            None => record_batches(),
        };

        for partial in &partials {
            recorder.merge(partial);
        }
    }
}

//! Bounded worker pool for independent, read-only evaluation tasks.
//!
//! Every task is a pure function of one input item.  A task that returns an
//! error or panics is logged, counted, and left out of the result set; the
//! rest of the batch is unaffected.
//!
//! Results come back in input order no matter which worker finished first,
//! so "first occurrence wins" tie-breaks stay deterministic.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::warn;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use ed_core::DispatchConfig;

use crate::{DispatchError, DispatchResult};

/// Successful task results tagged with their input index, plus the number
/// of tasks that were excluded.
#[derive(Debug)]
pub struct Evaluation<R> {
    /// `(input_index, result)` in ascending `input_index` order.
    pub results:  Vec<(usize, R)>,
    pub failures: usize,
}

/// A dedicated Rayon pool with `dispatch-worker-{i}` threads, separate from
/// Rayon's global pool.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// `None` uses one thread per logical core.
    pub fn new(num_threads: Option<usize>) -> DispatchResult<Self> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("dispatch-worker-{i}"));
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| DispatchError::Pool(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn from_config(config: &DispatchConfig) -> DispatchResult<Self> {
        config.validate()?;
        Self::new(config.num_threads)
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task` once per item on the pool.
    ///
    /// `what` names the batch in log lines.
    pub fn evaluate<T, R, F>(&self, what: &str, items: &[T], task: F) -> Evaluation<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> DispatchResult<R> + Sync,
    {
        let outcomes: Vec<Result<R, String>> = self.pool.install(|| {
            items
                .par_iter()
                .map(|item| match panic::catch_unwind(AssertUnwindSafe(|| task(item))) {
                    Ok(Ok(r))     => Ok(r),
                    Ok(Err(e))    => Err(e.to_string()),
                    Err(payload)  => Err(panic_message(payload)),
                })
                .collect()
        });

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failures = 0;
        for (i, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(r) => results.push((i, r)),
                Err(msg) => {
                    failures += 1;
                    warn!("{what}: task {i} excluded: {msg}");
                }
            }
        }
        Evaluation { results, failures }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

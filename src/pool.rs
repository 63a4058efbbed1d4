//! bounded worker pool shared by hashing and fetching
//!
//! jobs go into one queue drained by a fixed set of scoped threads; each job
//! produces exactly one result on the result channel, and the caller collects
//! exactly as many results as it submitted. result order is unspecified.

use std::num::NonZeroUsize;
use std::sync::mpsc;
use std::thread;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// requested pool size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concurrency {
    /// worker count; below 2 selects the sequential path
    pub workers: usize,
    /// multiply `workers` by the number of available cpus
    pub dynamic: bool,
}

impl Concurrency {
    pub fn new(workers: usize, dynamic: bool) -> Self {
        Self { workers, dynamic }
    }

    /// worker count actually used, always at least 1
    pub fn effective(&self) -> usize {
        let workers = self.workers.max(1);
        if workers < 2 || !self.dynamic {
            return workers;
        }
        let cpus = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        workers.saturating_mul(cpus)
    }

    /// true when work should go through the pool
    pub fn is_pooled(&self) -> bool {
        self.effective() >= 2
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self::new(1, true)
    }
}

/// what a failing item does to the batch it belongs to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// log the failure, leave the item out, keep going
    #[default]
    Continue,
    /// the first failure fails the operation
    ///
    /// a pooled batch still runs every dispatched job before reporting it.
    Abort,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "continue" => Ok(ErrorPolicy::Continue),
            "abort" => Ok(ErrorPolicy::Abort),
            _ => Err(crate::Error::InvalidConfigValue {
                key: "on_error",
                value: s.to_string(),
            }),
        }
    }
}

/// run `task` over every job on up to `workers` threads
///
/// blocks until every job has produced its result. a panicking task
/// propagates the panic to the caller once the scope ends.
pub fn run<J, R, F>(jobs: Vec<J>, workers: usize, task: F) -> Vec<R>
where
    J: Send,
    R: Send,
    F: Fn(J) -> R + Sync,
{
    let workload = jobs.len();
    if workload == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, workload);
    tracing::debug!(workers, jobs = workload, "starting worker pool");

    let (job_tx, job_rx) = mpsc::channel::<J>();
    let (result_tx, result_rx) = mpsc::channel::<R>();
    let job_rx = Mutex::new(job_rx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let result_tx = result_tx.clone();
            let job_rx = &job_rx;
            let task = &task;
            scope.spawn(move || loop {
                // lock only while taking the next job
                let next = job_rx.lock().recv();
                let Ok(job) = next else {
                    break;
                };
                if result_tx.send(task(job)).is_err() {
                    break;
                }
            });
        }
        drop(result_tx);

        for job in jobs {
            // receivers live until every worker exits
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let mut results = Vec::with_capacity(workload);
        for _ in 0..workload {
            match result_rx.recv() {
                Ok(result) => results.push(result),
                // every worker is gone; the scope re-raises the panic
                Err(_) => break,
            }
        }
        results
    })
}

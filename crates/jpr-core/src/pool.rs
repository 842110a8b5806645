//! Bounded pool of blocking workers

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{Error, Result};

/// Runs blocking jobs with at most `max_workers` in flight.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    max_workers: usize,
}

impl WorkerPool {
    /// A pool of `max_workers` workers; zero is treated as one.
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run `job` on every item and return one outcome per item, in input order.
    ///
    /// A job that panics is reported as [`Error::Worker`] for its item.
    pub async fn run<I, T, F>(&self, items: Vec<I>, job: F) -> Vec<Result<T>>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> Result<T> + Send + Sync + 'static,
    {
        let job = Arc::new(job);
        let permits = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();
        let dispatched = items.len();

        for (index, item) in items.into_iter().enumerate() {
            let job = Arc::clone(&job);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(permit) => tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        job(item)
                    })
                    .await
                    .unwrap_or_else(|e| Err(Error::Worker(e.to_string()))),
                    Err(e) => Err(Error::Worker(e.to_string())),
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<T>>> = (0..dispatched).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => tracing::warn!(error = %e, "Worker task aborted"),
            }
        }

        outcomes
            .into_iter()
            .map(|outcome| {
                outcome.unwrap_or_else(|| Err(Error::Worker("job did not report".into())))
            })
            .collect()
    }
}

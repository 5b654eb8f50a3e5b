//! Bounded pool for blocking work.
//!
//! Jobs wait for a semaphore permit and then run on tokio's blocking thread
//! pool, so at most `size` of them execute at any moment while the async
//! callers stay suspended instead of parking a runtime worker.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::core::models::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> AppResult<Self> {
        if size == 0 {
            return Err(AppError::Config(
                "worker pool size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots not currently running a job
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run `job` on a worker once a slot frees up
    pub async fn run<F, T>(&self, job: F) -> AppResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::WorkerPool(format!("Worker pool closed: {}", e)))?;

        debug!(
            "Worker slot acquired ({} of {} free)",
            self.semaphore.available_permits(),
            self.size
        );

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        handle
            .await
            .map_err(|e| AppError::WorkerPool(format!("Worker task join error: {}", e)))
    }
}

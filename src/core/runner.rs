//! Batch download runner
//!
//! Fans a small batch of requests out to independent retrying tasks and
//! collects their outcomes in input order.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::core::fetcher::MediaFetcher;
use crate::core::models::{
    AppResult, BatchReport, DownloadConfig, DownloadOutcome, DownloadRequest, TruncationWarning,
};
use crate::core::retry::{retry_download, RetryPolicy};
use crate::core::worker_pool::WorkerPool;

/// Largest batch processed in one submission
pub const DEFAULT_MAX_BATCH_SIZE: usize = 5;

pub struct BatchDownloadRunner {
    fetcher: Arc<dyn MediaFetcher>,
    pool: WorkerPool,
    policy: RetryPolicy,
    max_batch_size: usize,
}

impl BatchDownloadRunner {
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        pool: WorkerPool,
        policy: RetryPolicy,
        max_batch_size: usize,
    ) -> Self {
        Self {
            fetcher,
            pool,
            policy,
            max_batch_size: max_batch_size.max(1),
        }
    }

    /// Build a runner with pool, retry policy and batch limit taken from `config`
    pub fn from_config(fetcher: Arc<dyn MediaFetcher>, config: &DownloadConfig) -> AppResult<Self> {
        let pool = WorkerPool::new(config.worker_threads)?;
        Ok(Self::new(
            fetcher,
            pool,
            RetryPolicy::from(config),
            config.max_batch_size,
        ))
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Download one request with retries
    pub async fn retry_download(&self, request: &DownloadRequest) -> DownloadOutcome {
        retry_download(request, Arc::clone(&self.fetcher), &self.pool, self.policy).await
    }

    /// Run every request concurrently and wait for all of them.
    ///
    /// Requests past `max_batch_size` are dropped and reported through
    /// `BatchReport::truncation`. Spawned tasks are not cancelled if the
    /// returned future is dropped.
    #[instrument(skip(self, requests), fields(batch_size = requests.len()))]
    pub async fn run_batch(&self, mut requests: Vec<DownloadRequest>) -> BatchReport {
        let batch_id = Uuid::new_v4().to_string();

        let truncation = if requests.len() > self.max_batch_size {
            let dropped = requests.len() - self.max_batch_size;
            requests.truncate(self.max_batch_size);
            warn!(
                "Batch {} exceeds the limit of {} requests, dropping {}",
                batch_id, self.max_batch_size, dropped
            );
            Some(TruncationWarning {
                limit: self.max_batch_size,
                dropped,
            })
        } else {
            None
        };

        info!("🚀 Starting batch {} with {} requests", batch_id, requests.len());

        let handles: Vec<_> = requests
            .iter()
            .cloned()
            .map(|request| {
                let fetcher = Arc::clone(&self.fetcher);
                let pool = self.pool.clone();
                let policy = self.policy;
                tokio::spawn(async move { retry_download(&request, fetcher, &pool, policy).await })
            })
            .collect();

        let joined = futures::future::join_all(handles).await;

        let outcomes: Vec<DownloadOutcome> = joined
            .into_iter()
            .zip(requests.iter())
            .map(|(result, request)| match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Download task for {} aborted: {}", request.url, e);
                    DownloadOutcome::failed(
                        request,
                        self.policy.max_attempts,
                        0,
                        vec![format!("Download task aborted: {}", e)],
                    )
                }
            })
            .collect();

        let report = BatchReport {
            batch_id,
            outcomes,
            truncation,
        };

        let completed_at = report
            .completed_at()
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        info!(
            "🏁 Batch {} finished at {}: {} succeeded, {} failed",
            report.batch_id,
            completed_at,
            report.succeeded_count(),
            report.failed_count()
        );

        report
    }
}

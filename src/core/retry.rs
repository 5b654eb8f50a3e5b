//! Fixed-bound retry around a single download.
//!
//! Every failure is retried the same way: wait a constant delay and try again
//! until `max_attempts` calls have been made. There is no error
//! classification and no exponential growth of the delay.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::fetcher::{FetchError, MediaFetcher};
use crate::core::models::{DownloadConfig, DownloadOutcome, DownloadRequest, TaskState};
use crate::core::worker_pool::WorkerPool;

/// Default number of calls made for one request
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Retry strategy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of calls, the first one included
    pub max_attempts: u32,
    /// Constant delay after each failed attempt
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl From<&DownloadConfig> for RetryPolicy {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts.max(1),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Download `request`, retrying failures according to `policy`.
///
/// Never fails: an exhausted request comes back as a `Failed` outcome
/// carrying the last error message.
pub async fn retry_download(
    request: &DownloadRequest,
    fetcher: Arc<dyn MediaFetcher>,
    pool: &WorkerPool,
    policy: RetryPolicy,
) -> DownloadOutcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt_errors: Vec<String> = Vec::new();
    let mut state = TaskState::Pending;

    for attempt in 1..=max_attempts {
        state = advance(state, TaskState::Attempting(attempt));
        debug!(
            "Attempt {}/{} for {} ({})",
            attempt, max_attempts, request.url, request.desired_format
        );

        let call_fetcher = Arc::clone(&fetcher);
        let url = request.url.clone();
        let format = request.desired_format;
        let result = pool
            .run(move || call_fetcher.fetch(&url, format))
            .await
            .unwrap_or_else(|e| Err(FetchError::new(e.to_string())));

        match result {
            Ok(()) => {
                state = advance(state, TaskState::Succeeded);
                let outcome = DownloadOutcome::succeeded(request, attempt, attempt_errors);
                info!(
                    "✅ {} succeeded on attempt {}/{} ({:?} at {})",
                    request.url,
                    attempt,
                    max_attempts,
                    state,
                    outcome.finished_at.to_rfc3339()
                );
                return outcome;
            }
            Err(error) => {
                warn!(
                    "Attempt {}/{} failed for {}: {}",
                    attempt, max_attempts, request.url, error
                );
                attempt_errors.push(error.to_string());

                if attempt < max_attempts {
                    info!(
                        "Retrying {} in {:?} (attempt {}/{})",
                        request.url,
                        policy.delay,
                        attempt + 1,
                        max_attempts
                    );
                    if !policy.delay.is_zero() {
                        sleep(policy.delay).await;
                    }
                }
            }
        }
    }

    state = advance(state, TaskState::Failed);
    let outcome = DownloadOutcome::failed(request, max_attempts, max_attempts, attempt_errors);
    warn!(
        "❌ {} failed after {} attempts ({:?} at {})",
        request.url,
        max_attempts,
        state,
        outcome.finished_at.to_rfc3339()
    );
    outcome
}

/// Step the request lifecycle; an out-of-order step is logged and forced
fn advance(current: TaskState, next: TaskState) -> TaskState {
    match current.transition(next) {
        Ok(state) => {
            debug!("Request state {:?} -> {:?}", current, state);
            state
        }
        Err(e) => {
            warn!("Unexpected request state change: {}", e);
            next
        }
    }
}

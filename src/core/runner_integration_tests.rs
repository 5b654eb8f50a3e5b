//! Integration tests for BatchDownloadRunner
//!
//! Covers the fan-out contract end to end with a scripted fetcher:
//! - Outcomes come back in input order
//! - Batches over the limit are truncated with a warning
//! - Retry counts per request are independent
//! - Requests run concurrently and one request's backoff does not stall another
//! - The worker pool bounds concurrent external calls

#[cfg(test)]
mod tests {
    use super::super::fetcher::{FetchError, MediaFetcher};
    use super::super::models::*;
    use super::super::retry::RetryPolicy;
    use super::super::runner::BatchDownloadRunner;
    use super::super::worker_pool::WorkerPool;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Replays a per-URL script of results; URLs without a script succeed
    #[derive(Default)]
    struct ScriptedFetcher {
        scripts: Mutex<HashMap<String, VecDeque<Result<(), FetchError>>>>,
        calls: Mutex<HashMap<String, usize>>,
        first_calls: Mutex<HashMap<String, Instant>>,
        call_delay: Duration,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn with_delay(call_delay: Duration) -> Self {
            Self {
                call_delay,
                ..Self::default()
            }
        }

        fn script(&self, url: &str, results: Vec<Result<(), FetchError>>) {
            self.scripts
                .lock()
                .unwrap()
                .insert(url.to_string(), results.into_iter().collect());
        }

        fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().values().sum()
        }

        fn first_call(&self, url: &str) -> Option<Instant> {
            self.first_calls.lock().unwrap().get(url).copied()
        }
    }

    impl MediaFetcher for ScriptedFetcher {
        fn fetch(&self, url: &str, _format: MediaFormat) -> Result<(), FetchError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
            self.first_calls
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_insert_with(Instant::now);
            if !self.call_delay.is_zero() {
                std::thread::sleep(self.call_delay);
            }

            let next = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(url)
                .and_then(|script| script.pop_front());

            self.running.fetch_sub(1, Ordering::SeqCst);
            next.unwrap_or(Ok(()))
        }
    }

    fn fail(message: &str) -> Result<(), FetchError> {
        Err(FetchError::new(message))
    }

    fn runner(fetcher: Arc<ScriptedFetcher>, workers: usize) -> BatchDownloadRunner {
        BatchDownloadRunner::new(
            fetcher,
            WorkerPool::new(workers).unwrap(),
            RetryPolicy {
                max_attempts: 3,
                delay: Duration::from_millis(5),
            },
            5,
        )
    }

    fn requests(urls: &[&str], format: MediaFormat) -> Vec<DownloadRequest> {
        urls.iter().map(|u| DownloadRequest::new(*u, format)).collect()
    }

    #[tokio::test]
    async fn test_retry_then_success_scenario() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.script("urlA", vec![fail("timeout"), fail("timeout"), Ok(())]);
        fetcher.script("urlB", vec![Ok(())]);

        let report = runner(fetcher.clone(), 5)
            .run_batch(requests(&["urlA", "urlB"], MediaFormat::Mp4))
            .await;

        assert!(report.truncation.is_none());
        assert_eq!(report.outcomes.len(), 2);

        let a = &report.outcomes[0];
        assert_eq!(a.url, "urlA");
        assert_eq!(a.status, OutcomeStatus::Success);
        assert_eq!(a.attempts_used, 3);
        assert_eq!(a.attempt_errors, vec!["timeout", "timeout"]);

        let b = &report.outcomes[1];
        assert_eq!(b.url, "urlB");
        assert_eq!(b.status, OutcomeStatus::Success);
        assert_eq!(b.attempts_used, 1);

        assert_eq!(fetcher.calls_for("urlA"), 3);
        assert_eq!(fetcher.calls_for("urlB"), 1);
    }

    #[tokio::test]
    async fn test_oversized_batch_is_truncated() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let urls = ["u1", "u2", "u3", "u4", "u5", "u6", "u7"];

        let report = runner(fetcher.clone(), 5)
            .run_batch(requests(&urls, MediaFormat::Mp3))
            .await;

        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(
            report.truncation,
            Some(TruncationWarning {
                limit: 5,
                dropped: 2
            })
        );
        let returned: Vec<&str> = report.outcomes.iter().map(|o| o.url.as_str()).collect();
        assert_eq!(returned, &urls[..5]);
        assert_eq!(fetcher.calls_for("u6"), 0);
        assert_eq!(fetcher.calls_for("u7"), 0);
        assert_eq!(fetcher.total_calls(), 5);
    }

    #[tokio::test]
    async fn test_order_follows_input_not_completion() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        // The first request needs two retries, so it finishes last
        fetcher.script("slow", vec![fail("busy"), fail("busy"), Ok(())]);

        let report = runner(fetcher, 5)
            .run_batch(requests(&["slow", "fast-1", "fast-2"], MediaFormat::Mp4))
            .await;

        let returned: Vec<&str> = report.outcomes.iter().map(|o| o.url.as_str()).collect();
        assert_eq!(returned, vec!["slow", "fast-1", "fast-2"]);
    }

    #[tokio::test]
    async fn test_mixed_outcomes_do_not_abort_batch() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.script("broken", vec![fail("404"), fail("404"), fail("gone")]);

        let report = runner(fetcher.clone(), 5)
            .run_batch(requests(&["good", "broken", "also-good"], MediaFormat::Mp4))
            .await;

        assert_eq!(report.succeeded_count(), 2);
        assert_eq!(report.failed_count(), 1);

        let broken = &report.outcomes[1];
        assert_eq!(broken.status, OutcomeStatus::Failed);
        assert_eq!(broken.attempts_used, 3);
        assert_eq!(broken.message, "Failed after 3 attempts for broken: gone");
        assert_eq!(fetcher.calls_for("broken"), 3);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let report = runner(fetcher.clone(), 5).run_batch(Vec::new()).await;

        assert!(report.outcomes.is_empty());
        assert!(report.truncation.is_none());
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_every_length_up_to_limit_is_preserved() {
        let urls = ["a", "b", "c", "d", "e"];
        for len in 0..=urls.len() {
            let fetcher = Arc::new(ScriptedFetcher::default());
            let report = runner(fetcher, 5)
                .run_batch(requests(&urls[..len], MediaFormat::Mp4))
                .await;

            assert_eq!(report.outcomes.len(), len);
            assert!(report.truncation.is_none());
            for (outcome, url) in report.outcomes.iter().zip(&urls[..len]) {
                assert_eq!(outcome.url, *url);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_worker_pool_bounds_external_calls() {
        let fetcher = Arc::new(ScriptedFetcher::with_delay(Duration::from_millis(50)));

        let report = runner(fetcher.clone(), 2)
            .run_batch(requests(&["p1", "p2", "p3", "p4", "p5"], MediaFormat::Mp4))
            .await;

        assert_eq!(report.succeeded_count(), 5);
        // Requests run side by side, but never more than the pool allows
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_all_requests_start_together() {
        let fetcher = Arc::new(ScriptedFetcher::with_delay(Duration::from_millis(100)));
        let urls = ["c1", "c2", "c3", "c4", "c5"];

        let started = Instant::now();
        let report = runner(fetcher.clone(), 5)
            .run_batch(requests(&urls, MediaFormat::Mp4))
            .await;
        let elapsed = started.elapsed();

        assert_eq!(report.succeeded_count(), 5);
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 5);
        // One round of 100ms calls, not five in a row
        assert!(elapsed < Duration::from_millis(400), "batch took {:?}", elapsed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_backoff_does_not_hold_up_other_requests() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.script("flaky", vec![fail("reset"), Ok(())]);

        let backoff = Duration::from_millis(500);
        let runner = BatchDownloadRunner::new(
            fetcher.clone(),
            WorkerPool::new(5).unwrap(),
            RetryPolicy {
                max_attempts: 3,
                delay: backoff,
            },
            5,
        );

        let started = Instant::now();
        let report = runner
            .run_batch(requests(&["flaky", "steady"], MediaFormat::Mp4))
            .await;

        assert_eq!(report.succeeded_count(), 2);
        assert_eq!(report.outcomes[0].attempts_used, 2);

        let steady_start = fetcher.first_call("steady").unwrap() - started;
        assert!(
            steady_start < Duration::from_millis(250),
            "steady waited {:?} behind the flaky request's backoff",
            steady_start
        );
        assert!(started.elapsed() >= backoff);
    }

    #[tokio::test]
    async fn test_from_config() -> AppResult<()> {
        let config = DownloadConfig {
            worker_threads: 3,
            retry_attempts: 2,
            retry_delay_ms: 1,
            max_batch_size: 4,
            ..DownloadConfig::default()
        };
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.script("x", vec![fail("a"), fail("b")]);

        let runner = BatchDownloadRunner::from_config(fetcher.clone(), &config)?;
        assert_eq!(runner.pool().size(), 3);
        assert_eq!(runner.max_batch_size(), 4);

        let outcome = runner
            .retry_download(&DownloadRequest::new("x", MediaFormat::Mp3))
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.attempts_used, 2);
        assert_eq!(fetcher.calls_for("x"), 2);
        Ok(())
    }
}

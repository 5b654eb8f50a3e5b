//! Video Batch Downloader - Core Library
//!
//! Accepts small batches of video URLs, hands each one to yt-dlp through a
//! bounded worker pool with a fixed retry budget, and serves the browser form
//! that drives it.

pub mod core;
pub mod utils;
pub mod web;

// Re-export commonly used types
pub use crate::core::{
    config::AppConfig,
    fetcher::{FetchError, MediaFetcher, YtDlpFetcher, YtDlpOptions},
    models::{
        AppError, AppResult, BatchReport, DownloadOutcome, DownloadRequest, MediaFormat,
        OutcomeStatus, TruncationWarning,
    },
    retry::{retry_download, RetryPolicy},
    runner::BatchDownloadRunner,
    translator::{GoogleTranslator, Localizer, Translator},
    worker_pool::WorkerPool,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the library with default settings
pub fn init() -> anyhow::Result<()> {
    utils::logging::init_tracing();

    tracing::info!("📚 {} v{} initialized", NAME, VERSION);
    Ok(())
}

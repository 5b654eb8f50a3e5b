//! Core data models for the batch downloader

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format requested for a download

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mp4,

    Mp3,
}

impl MediaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mp3 => "mp3",
        }
    }

    /// Whether the download goes through audio extraction
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Mp3)
    }
}

impl Default for MediaFormat {
    fn default() -> Self {
        Self::Mp4
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "mp3" => Ok(Self::Mp3),
            other => Err(AppError::Parse(format!("Unsupported format: {}", other))),
        }
    }
}

/// A single URL submitted for download

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,

    pub desired_format: MediaFormat,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, desired_format: MediaFormat) -> Self {
        Self {
            url: url.into(),
            desired_format,
        }
    }
}

/// Terminal status of a download request

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,

    Failed,
}

/// Result of one download request, produced exactly once

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub url: String,

    pub format: MediaFormat,

    pub status: OutcomeStatus,

    pub message: String,

    pub attempts_used: u32,

    /// Error message of every failed attempt, oldest first
    pub attempt_errors: Vec<String>,

    pub finished_at: chrono::DateTime<chrono::Utc>,
}

impl DownloadOutcome {
    pub fn succeeded(request: &DownloadRequest, attempts_used: u32, attempt_errors: Vec<String>) -> Self {
        let message = match request.desired_format {
            MediaFormat::Mp4 => format!("Download completed for {}!", request.url),
            MediaFormat::Mp3 => format!("MP3 file downloaded successfully for {}!", request.url),
        };

        Self {
            url: request.url.clone(),
            format: request.desired_format,
            status: OutcomeStatus::Success,
            message,
            attempts_used,
            attempt_errors,
            finished_at: chrono::Utc::now(),
        }
    }

    pub fn failed(
        request: &DownloadRequest,
        max_attempts: u32,
        attempts_used: u32,
        attempt_errors: Vec<String>,
    ) -> Self {
        let last_error = attempt_errors
            .last()
            .cloned()
            .unwrap_or_else(|| "unknown error".to_string());

        Self {
            url: request.url.clone(),
            format: request.desired_format,
            status: OutcomeStatus::Failed,
            message: format!(
                "Failed after {} attempts for {}: {}",
                max_attempts, request.url, last_error
            ),
            attempts_used,
            attempt_errors,
            finished_at: chrono::Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Signalled when a batch exceeded the size limit and was cut short

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TruncationWarning {
    pub limit: usize,

    pub dropped: usize,
}

/// Everything a caller gets back from a batch run

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,

    pub outcomes: Vec<DownloadOutcome>,

    pub truncation: Option<TruncationWarning>,
}

impl BatchReport {
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// When the last request of the batch settled; `None` for an empty batch
    pub fn completed_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.outcomes.iter().map(|o| o.finished_at).max()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }
}

/// Lifecycle of a request inside the runner

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskState {
    Pending,

    Attempting(u32),

    Succeeded,

    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Move to `next`, rejecting anything the lifecycle does not allow
    pub fn transition(self, next: TaskState) -> AppResult<TaskState> {
        let allowed = match (self, next) {
            (Self::Pending, Self::Attempting(1)) => true,
            (Self::Attempting(_), Self::Succeeded | Self::Failed) => true,
            (Self::Attempting(n), Self::Attempting(m)) => m == n + 1,
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition(format!("{:?} -> {:?}", self, next)))
        }
    }
}

/// Download configuration

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Blocking worker slots shared by every batch
    pub worker_threads: usize,

    pub retry_attempts: u32,

    /// Constant delay between a failed attempt and the next one
    pub retry_delay_ms: u64,

    pub max_batch_size: usize,

    pub socket_timeout_seconds: u64,

    pub output_directory: String,

    pub ytdlp_binary: String,

    pub audio_quality: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            worker_threads: 5,

            retry_attempts: 3,

            retry_delay_ms: 2000,

            max_batch_size: 5,

            socket_timeout_seconds: 60,

            output_directory: "downloads".to_string(),

            ytdlp_binary: "yt-dlp".to_string(),

            audio_quality: "192K".to_string(),
        }
    }
}

/// Application error types

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for application operations

pub type AppResult<T> = Result<T, AppError>;

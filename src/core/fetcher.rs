//! yt-dlp integration
//!
//! `MediaFetcher` is the seam between the batch runner and whatever actually
//! pulls media off the network. Calls are blocking and are expected to run on
//! the worker pool.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::models::{DownloadConfig, MediaFormat};

/// Any failure of the external download call. Not classified further.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct FetchError(pub String);

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Blocking download/transcode backend
pub trait MediaFetcher: Send + Sync {
    fn fetch(&self, url: &str, format: MediaFormat) -> Result<(), FetchError>;
}

/// Settings passed through to yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlpOptions {
    pub binary: String,
    pub output_dir: PathBuf,
    pub socket_timeout_seconds: u64,
    pub audio_quality: String,
}

impl Default for YtDlpOptions {
    fn default() -> Self {
        Self::from(&DownloadConfig::default())
    }
}

impl From<&DownloadConfig> for YtDlpOptions {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            binary: config.ytdlp_binary.clone(),
            output_dir: PathBuf::from(&config.output_directory),
            socket_timeout_seconds: config.socket_timeout_seconds,
            audio_quality: config.audio_quality.clone(),
        }
    }
}

/// Runs the `yt-dlp` executable; files are named after the remote title
pub struct YtDlpFetcher {
    options: YtDlpOptions,
}

impl YtDlpFetcher {
    pub fn new(options: YtDlpOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &YtDlpOptions {
        &self.options
    }

    /// Command-line arguments for one download
    pub fn build_args(&self, url: &str, format: MediaFormat) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        match format {
            MediaFormat::Mp4 => {
                args.push("-f".to_string());
                args.push("best[ext=mp4]".to_string());
            }
            MediaFormat::Mp3 => {
                args.extend(
                    ["-f", "bestaudio/best", "-x", "--audio-format", "mp3", "--audio-quality"]
                        .iter()
                        .map(|s| s.to_string()),
                );
                args.push(self.options.audio_quality.clone());
            }
        }

        let template = self.options.output_dir.join("%(title)s.%(ext)s");
        args.push("-o".to_string());
        args.push(template.to_string_lossy().into_owned());

        args.extend(
            ["--quiet", "--no-warnings", "--no-playlist", "--socket-timeout"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(self.options.socket_timeout_seconds.to_string());

        // Keeps a URL starting with '-' from being read as an option
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

impl MediaFetcher for YtDlpFetcher {
    fn fetch(&self, url: &str, format: MediaFormat) -> Result<(), FetchError> {
        std::fs::create_dir_all(&self.options.output_dir).map_err(|e| {
            FetchError::new(format!(
                "Failed to create output directory {}: {}",
                self.options.output_dir.display(),
                e
            ))
        })?;

        let args = self.build_args(url, format);
        debug!("Running {} {:?}", self.options.binary, args);

        let output = Command::new(&self.options.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FetchError::new(format!("Failed to run {}: {}", self.options.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(FetchError::new(if detail.is_empty() {
                format!("yt-dlp exited with {}", output.status)
            } else {
                format!("yt-dlp failed: {}", detail)
            }));
        }

        info!("📥 yt-dlp finished {} ({})", url, format);
        Ok(())
    }
}

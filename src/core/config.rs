//! Application configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::models::DownloadConfig;
use crate::core::translator::SUPPORTED_LANGUAGES;

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "VBD_CONFIG";

/// Main application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub download: DownloadConfig,
    pub server: ServerConfig,
    pub translation: TranslationConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Translation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub default_language: String, // "en", "ur", "zh-cn", ...
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            timeout_seconds: 10,
            default_language: "en".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;

            let config: AppConfig =
                serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

            tracing::info!("Loaded configuration from: {:?}", path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Created default configuration at: {:?}", path);
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Saved configuration to: {:?}", path);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            if !explicit.trim().is_empty() {
                return Ok(PathBuf::from(explicit));
            }
        }

        let project_dirs = ProjectDirs::from("com", "videodownloader", "batch")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Load, validate and apply environment overrides, falling back to defaults on any problem
    pub fn load_or_default() -> Self {
        let mut config = match Self::load() {
            Ok(cfg) => {
                if let Err(err) = cfg.validate() {
                    tracing::warn!(
                        "Invalid configuration detected ({}), falling back to defaults",
                        err
                    );
                    Self::default()
                } else {
                    cfg
                }
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to load configuration from disk: {}. Using defaults",
                    err
                );
                Self::default()
            }
        };

        let overrides: HashMap<String, String> = std::env::vars()
            .filter(|(key, _)| key.starts_with("VBD_"))
            .collect();
        if let Err(err) = config.apply_env_overrides(&overrides) {
            tracing::warn!("Ignoring environment overrides: {}", err);
        }

        config
    }

    /// Apply `VBD_*` overrides; the config is left untouched if the result is invalid
    pub fn apply_env_overrides(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        let mut candidate = self.clone();

        if let Some(host) = vars.get("VBD_HOST") {
            candidate.server.host = host.clone();
        }
        if let Some(port) = vars.get("VBD_PORT") {
            candidate.server.port = port
                .parse()
                .with_context(|| format!("VBD_PORT is not a port number: {}", port))?;
        }
        if let Some(dir) = vars.get("VBD_OUTPUT_DIR") {
            candidate.download.output_directory = dir.clone();
        }
        if let Some(bin) = vars.get("VBD_YTDLP_BIN") {
            candidate.download.ytdlp_binary = bin.clone();
        }
        if let Some(workers) = vars.get("VBD_WORKERS") {
            candidate.download.worker_threads = workers
                .parse()
                .with_context(|| format!("VBD_WORKERS is not a number: {}", workers))?;
        }

        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let download = &self.download;

        if download.worker_threads == 0 || download.worker_threads > 20 {
            anyhow::bail!("Worker threads should be between 1 and 20");
        }

        if download.retry_attempts == 0 || download.retry_attempts > 10 {
            anyhow::bail!("Retry attempts should be between 1 and 10");
        }

        if download.max_batch_size == 0 || download.max_batch_size > 50 {
            anyhow::bail!("Max batch size should be between 1 and 50");
        }

        if download.socket_timeout_seconds == 0 || download.socket_timeout_seconds > 300 {
            anyhow::bail!("Socket timeout should be between 1 and 300 seconds");
        }

        if download.ytdlp_binary.trim().is_empty() {
            anyhow::bail!("yt-dlp binary must not be empty");
        }

        if download.output_directory.trim().is_empty() {
            anyhow::bail!("Output directory must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port should be between 1 and 65535");
        }

        if !SUPPORTED_LANGUAGES
            .iter()
            .any(|(code, _)| *code == self.translation.default_language)
        {
            anyhow::bail!(
                "Unsupported default language: {}",
                self.translation.default_language
            );
        }

        if self.translation.timeout_seconds == 0 {
            anyhow::bail!("Translation timeout must be greater than 0");
        }

        Ok(())
    }
}

//! Core business logic module
//!
//! This module contains the domain models, the retrying batch runner and the
//! services it talks to.

pub mod config;
pub mod fetcher;
pub mod models;
pub mod retry;
pub mod runner;
pub mod translator;
pub mod worker_pool;

#[cfg(test)]
mod runner_integration_tests;

// Re-export commonly used types
pub use config::AppConfig;
pub use runner::BatchDownloadRunner;

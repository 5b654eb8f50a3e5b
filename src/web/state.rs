use std::sync::Arc;

use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::fetcher::{MediaFetcher, YtDlpFetcher, YtDlpOptions};
use crate::core::models::AppResult;
use crate::core::runner::BatchDownloadRunner;
use crate::core::translator::{GoogleTranslator, PassthroughTranslator, Translator};

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub runner: Arc<BatchDownloadRunner>,
    pub translator: Arc<dyn Translator>,
}

impl AppState {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let fetcher: Arc<dyn MediaFetcher> =
            Arc::new(YtDlpFetcher::new(YtDlpOptions::from(&config.download)));
        let runner = BatchDownloadRunner::from_config(fetcher, &config.download)?;

        let translator: Arc<dyn Translator> = if config.translation.enabled {
            match GoogleTranslator::new(&config.translation) {
                Ok(translator) => Arc::new(translator),
                Err(e) => {
                    warn!("Translation disabled, client setup failed: {}", e);
                    Arc::new(PassthroughTranslator)
                }
            }
        } else {
            Arc::new(PassthroughTranslator)
        };

        info!(
            "🔧 State ready: {} workers, {} attempts, batch limit {}",
            runner.pool().size(),
            runner.policy().max_attempts,
            runner.max_batch_size()
        );

        Ok(Self::with_components(config, runner, translator))
    }

    pub fn with_components(
        config: AppConfig,
        runner: BatchDownloadRunner,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            runner: Arc::new(runner),
            translator,
        }
    }
}

//! UI string localization
//!
//! `Translator` is the seam to the external translation service.
//! `Localizer` wraps one for the duration of a single request: it knows the
//! target language, skips English, caches what it already translated, and
//! falls back to the original text whenever the service fails. `prefetch`
//! looks up a whole page of labels concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::TranslationConfig;

/// Languages offered in the language selector: (code, display name)
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("ur", "Urdu"),
    ("zh-cn", "Chinese"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("hi", "Hindi"),
    ("ar", "Arabic"),
    ("ja", "Japanese"),
    ("ru", "Russian"),
];

pub const DEFAULT_LANGUAGE: &str = "en";

/// Normalize a user-supplied language code, falling back to English
pub fn resolve_language(code: Option<&str>) -> &'static str {
    let wanted = code.map(|c| c.trim().to_ascii_lowercase());
    SUPPORTED_LANGUAGES
        .iter()
        .map(|(c, _)| *c)
        .find(|c| Some(*c) == wanted.as_deref())
        .unwrap_or(DEFAULT_LANGUAGE)
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Translation service returned HTTP {0}")]
    Status(u16),

    #[error("Unexpected translation response: {0}")]
    Response(String),
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError>;
}

/// Returns every string unchanged
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str, _target_language: &str) -> Result<String, TranslationError> {
        Ok(text.to_string())
    }
}

/// Google Translate web endpoint (`client=gtx`), no API key required
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The web endpoint wants region subtags upper-cased
    fn google_language_code(code: &str) -> String {
        match code.split_once('-') {
            Some((lang, region)) => format!("{}-{}", lang, region.to_ascii_uppercase()),
            None => code.to_string(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let target = Self::google_language_code(target_language);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslationError::Status(response.status().as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        parse_gtx_response(&body)
    }
}

/// Response shape: `[[["translated","original",...], ...], ...]`
pub(crate) fn parse_gtx_response(body: &serde_json::Value) -> Result<String, TranslationError> {
    let segments = body
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslationError::Response("missing sentence array".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|v| v.as_str()))
        .collect();

    if translated.is_empty() {
        return Err(TranslationError::Response("no translated text".to_string()));
    }

    Ok(translated)
}

/// Per-request localization handle
pub struct Localizer {
    translator: Arc<dyn Translator>,
    language: &'static str,
    cache: HashMap<String, String>,
    errors: Vec<String>,
}

impl Localizer {
    pub fn new(translator: Arc<dyn Translator>, language: Option<&str>) -> Self {
        Self {
            translator,
            language: resolve_language(language),
            cache: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn language(&self) -> &'static str {
        self.language
    }

    /// Errors from lookups that fell back to the original text
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Translate every uncached text at once so later `t` calls hit the cache
    pub async fn prefetch(&mut self, texts: &[&str]) {
        if self.language == DEFAULT_LANGUAGE {
            return;
        }

        let mut pending: Vec<&str> = Vec::new();
        for &text in texts {
            if !self.cache.contains_key(text) && !pending.contains(&text) {
                pending.push(text);
            }
        }
        if pending.is_empty() {
            return;
        }

        debug!("Prefetching {} labels ({})", pending.len(), self.language);
        let translator = Arc::clone(&self.translator);
        let language = self.language;
        let results =
            futures::future::join_all(pending.iter().map(|text| translator.translate(text, language)))
                .await;

        for (text, result) in pending.into_iter().zip(results) {
            self.store(text, result);
        }
    }

    /// Translate `text` into this request's language, or return it unchanged
    pub async fn t(&mut self, text: &str) -> String {
        if self.language == DEFAULT_LANGUAGE {
            return text.to_string();
        }

        if let Some(hit) = self.cache.get(text) {
            return hit.clone();
        }

        let result = self.translator.translate(text, self.language).await;
        self.store(text, result)
    }

    fn store(&mut self, text: &str, result: Result<String, TranslationError>) -> String {
        let translated = match result {
            Ok(translated) => {
                debug!("Translated {:?} -> {:?} ({})", text, translated, self.language);
                translated
            }
            Err(e) => {
                warn!("Translation error ({}): {}", self.language, e);
                self.errors.push(e.to_string());
                text.to_string()
            }
        };

        self.cache.insert(text.to_string(), translated.clone());
        translated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTranslator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Translator for CountingTranslator {
        async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TranslationError::Status(503))
            } else {
                Ok(format!("[{}] {}", target, text))
            }
        }
    }

    #[test]
    fn test_resolve_language() {
        assert_eq!(resolve_language(Some("FR")), "fr");
        assert_eq!(resolve_language(Some("zh-cn")), "zh-cn");
        assert_eq!(resolve_language(Some("klingon")), "en");
        assert_eq!(resolve_language(None), "en");
    }

    #[test]
    fn test_google_language_code() {
        assert_eq!(GoogleTranslator::google_language_code("zh-cn"), "zh-CN");
        assert_eq!(GoogleTranslator::google_language_code("ur"), "ur");
    }

    #[test]
    fn test_parse_gtx_response() {
        let body = serde_json::json!([
            [["Hola ", "Hello ", null, null], ["mundo", "world", null, null]],
            null,
            "en"
        ]);
        assert_eq!(parse_gtx_response(&body).unwrap(), "Hola mundo");

        assert!(parse_gtx_response(&serde_json::json!({"error": 1})).is_err());
        assert!(parse_gtx_response(&serde_json::json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_english_skips_service() {
        let translator = Arc::new(CountingTranslator {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let mut localizer = Localizer::new(translator.clone(), Some("en"));

        assert_eq!(localizer.t("Download Videos").await, "Download Videos");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_translations_are_cached() {
        let translator = Arc::new(CountingTranslator {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let mut localizer = Localizer::new(translator.clone(), Some("es"));

        assert_eq!(localizer.t("About Us").await, "[es] About Us");
        assert_eq!(localizer.t("About Us").await, "[es] About Us");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_original() {
        let translator = Arc::new(CountingTranslator {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let mut localizer = Localizer::new(translator, Some("de"));

        assert_eq!(localizer.t("Select Page").await, "Select Page");
        assert_eq!(localizer.errors(), ["Translation service returned HTTP 503"]);
    }

    /// Sleeps on every lookup and remembers how many were in flight at once
    struct SlowTranslator {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Translator for SlowTranslator {
        async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("[{}] {}", target, text))
        }
    }

    #[tokio::test]
    async fn test_prefetch_translates_distinct_labels_concurrently() {
        let translator = Arc::new(SlowTranslator {
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let mut localizer = Localizer::new(translator.clone(), Some("fr"));
        assert_eq!(localizer.t("Select Page").await, "[fr] Select Page");

        localizer
            .prefetch(&["Select Page", "About Us", "Download MP4s", "About Us", "YouTube to MP3"])
            .await;

        // One earlier lookup plus the three labels not yet cached
        assert_eq!(translator.calls.load(Ordering::SeqCst), 4);
        assert_eq!(translator.peak.load(Ordering::SeqCst), 3);

        assert_eq!(localizer.t("About Us").await, "[fr] About Us");
        assert_eq!(localizer.t("YouTube to MP3").await, "[fr] YouTube to MP3");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 4);
        assert!(localizer.errors().is_empty());
    }

    #[tokio::test]
    async fn test_prefetch_records_fallbacks() {
        let translator = Arc::new(CountingTranslator {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let mut localizer = Localizer::new(translator.clone(), Some("ja"));

        localizer.prefetch(&["About Us", "Select Page"]).await;
        assert_eq!(localizer.errors().len(), 2);
        assert_eq!(localizer.t("About Us").await, "About Us");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
    }
}

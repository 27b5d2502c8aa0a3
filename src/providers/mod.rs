//! Translation provider adapters
//!
//! Every backend exposes the same batch contract: an ordered list of texts in,
//! an equally long list of translations out.

pub mod bhashini;
pub mod google;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::core::config::TranslatorConfig;
use crate::core::endpoint_cache::PipelineEndpointCache;
use crate::core::errors::Result;
use crate::core::models::{ProviderKind, TranslationRequest};

pub use bhashini::BhashiniProvider;
pub use google::GoogleProvider;

/// A remote machine-translation backend
#[async_trait]
pub trait TranslationProvider: Send + Sync + std::fmt::Debug {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Maximum number of texts per call
    fn batch_size(&self) -> usize;

    /// Whether credentials are present; without them the provider answers in demo mode
    fn is_configured(&self) -> bool;

    /// Translate one batch, reporting failures.
    ///
    /// On success the output has the same length and order as `request.texts`.
    async fn try_translate_batch(&self, request: &TranslationRequest) -> Result<Vec<String>>;

    /// Translate one batch, degrading every failure to error placeholders
    async fn translate_batch(&self, texts: &[String], target_lang: &str) -> Vec<String> {
        let request = TranslationRequest::new(texts.to_vec(), target_lang);
        match self.try_translate_batch(&request).await {
            Ok(translations) => translations,
            Err(e) => {
                warn!(
                    "Batch translation failed for {} texts to {}: {}",
                    texts.len(),
                    target_lang,
                    e
                );
                error_placeholders(texts)
            }
        }
    }
}

/// Demo-mode output: `[LANG] text`
pub fn demo_placeholder(text: &str, target_lang: &str) -> String {
    format!("[{}] {}", target_lang.to_uppercase(), text)
}

/// Visible marker for a text whose translation failed
pub fn error_placeholder(text: &str) -> String {
    format!("[Translation Error: {}]", text)
}

/// Demo translations for a batch, blank entries kept as they are
pub fn demo_placeholders(texts: &[String], target_lang: &str) -> Vec<String> {
    texts
        .iter()
        .map(|text| {
            if is_blank(text) {
                text.clone()
            } else {
                demo_placeholder(text, target_lang)
            }
        })
        .collect()
}

/// Error placeholders for a whole batch
pub fn error_placeholders(texts: &[String]) -> Vec<String> {
    texts.iter().map(|text| error_placeholder(text)).collect()
}

pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// The texts that actually go over the wire
pub(crate) fn sendable_texts(texts: &[String]) -> Vec<String> {
    texts.iter().filter(|t| !is_blank(t)).cloned().collect()
}

/// Put provider output back in place of the non-blank inputs.
///
/// Blank inputs stay blank; a missing or empty translation falls back to the
/// original text at that position.
pub(crate) fn merge_translations(texts: &[String], translated: Vec<Option<String>>) -> Vec<String> {
    let mut translated = translated.into_iter();
    texts
        .iter()
        .map(|text| {
            if is_blank(text) {
                return text.clone();
            }
            match translated.next().flatten() {
                Some(t) if !t.is_empty() => t,
                _ => text.clone(),
            }
        })
        .collect()
}

pub(crate) fn http_client(timeout_ms: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .pool_max_idle_per_host(10)
        .build()?;
    Ok(client)
}

/// Build the provider selected in `config`.
///
/// The endpoint cache is only consulted by providers with a discovery step.
pub fn build_provider(
    config: &TranslatorConfig,
    endpoints: PipelineEndpointCache,
) -> Result<Arc<dyn TranslationProvider>> {
    let provider: Arc<dyn TranslationProvider> = match config.provider {
        ProviderKind::Google => Arc::new(GoogleProvider::new(config)?),
        ProviderKind::Bhashini => Arc::new(BhashiniProvider::new(config, endpoints)?),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::TranslationError;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(demo_placeholder("Cat", "hi"), "[HI] Cat");
        assert_eq!(error_placeholder("Cat"), "[Translation Error: Cat]");
        assert_eq!(
            demo_placeholders(&texts(&["Cat", " ", "Dog"]), "ta"),
            texts(&["[TA] Cat", " ", "[TA] Dog"])
        );
    }

    #[test]
    fn test_merge_keeps_blanks_and_falls_back_by_position() {
        let input = texts(&["Cat", "", "Dog", "Bird"]);
        let merged = merge_translations(
            &input,
            vec![Some("बिल्ली".to_string()), None],
        );
        assert_eq!(merged, texts(&["बिल्ली", "", "Dog", "Bird"]));
        assert_eq!(sendable_texts(&input), texts(&["Cat", "Dog", "Bird"]));
    }

    #[derive(Debug)]
    struct FailingProvider;

    #[async_trait]
    impl TranslationProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn batch_size(&self) -> usize {
            10
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn try_translate_batch(&self, _request: &TranslationRequest) -> Result<Vec<String>> {
            Err(TranslationError::BatchTranslationError {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_translate_batch_degrades_to_error_placeholders() {
        let out = FailingProvider
            .translate_batch(&texts(&["Cat", "Dog"]), "hi")
            .await;
        assert_eq!(out, texts(&["[Translation Error: Cat]", "[Translation Error: Dog]"]));
    }

    #[test]
    fn test_build_provider_by_kind() {
        let mut config = TranslatorConfig::default();
        let provider = build_provider(&config, PipelineEndpointCache::new()).unwrap();
        assert_eq!(provider.name(), "google");
        assert_eq!(provider.batch_size(), 50);

        config.provider = ProviderKind::Bhashini;
        let provider = build_provider(&config, PipelineEndpointCache::new()).unwrap();
        assert_eq!(provider.name(), "bhashini");
        assert_eq!(provider.batch_size(), 10);
        assert!(!provider.is_configured());
    }
}

//! Deduplicating batcher: distinct strings in, translation lookup out

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{is_eligible, Row, TranslatableColumns, TranslationLookup, TranslationRequest};
use crate::pipeline::pacing::BatchPacer;
use crate::providers::{error_placeholder, TranslationProvider};

/// Distinct translatable strings of `rows`, in first-seen order
pub fn collect_translatable(rows: &[Row], columns: Option<&TranslatableColumns>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut texts = Vec::new();

    for row in rows {
        for (column, value) in row {
            if !is_eligible(column, value, columns) {
                continue;
            }
            if let Some(text) = value.translatable_text() {
                if seen.insert(text) {
                    texts.push(text.to_string());
                }
            }
        }
    }

    texts
}

/// Lookup mapping every translatable string of `rows` to its error placeholder
pub fn error_lookup(rows: &[Row], columns: Option<&TranslatableColumns>) -> TranslationLookup {
    let mut lookup = TranslationLookup::new();
    for text in collect_translatable(rows, columns) {
        let placeholder = error_placeholder(&text);
        lookup.insert(text, placeholder);
    }
    lookup
}

/// Drives the distinct strings of one (language, sheet) unit through a provider,
/// one batch at a time.
#[derive(Debug, Clone)]
pub struct DeduplicatingBatcher {
    provider: Arc<dyn TranslationProvider>,
    batch_delay: Duration,
    call_timeout: Duration,
}

impl DeduplicatingBatcher {
    pub fn new(provider: Arc<dyn TranslationProvider>, batch_delay: Duration, call_timeout: Duration) -> Self {
        Self {
            provider,
            batch_delay,
            call_timeout,
        }
    }

    /// Translate every distinct eligible string of `rows` into `target_lang`.
    ///
    /// Batch failures degrade to error placeholders for that batch only.
    /// A configuration failure stops the unit and is returned to the caller.
    pub async fn build_lookup(
        &self,
        rows: &[Row],
        columns: Option<&TranslatableColumns>,
        target_lang: &str,
    ) -> Result<TranslationLookup> {
        let texts = collect_translatable(rows, columns);
        let mut lookup = TranslationLookup::new();
        if texts.is_empty() {
            return Ok(lookup);
        }

        let batch_size = self.provider.batch_size().max(1);
        let total_batches = texts.len().div_ceil(batch_size);
        // Demo mode makes no network calls
        let paced = self.provider.is_configured();
        let mut pacer = BatchPacer::new(self.batch_delay);
        let mut translated = Vec::with_capacity(texts.len());

        for (index, batch) in texts.chunks(batch_size).enumerate() {
            if paced {
                pacer.ready().await;
            }
            debug!(
                "Batch {}/{} to {}: {} texts",
                index + 1,
                total_batches,
                target_lang,
                batch.len()
            );

            match self.translate_one(batch, target_lang).await {
                Ok(out) => translated.extend(align(batch, out)),
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => {
                    warn!(
                        "Batch {}/{} to {} failed: {}",
                        index + 1,
                        total_batches,
                        target_lang,
                        e
                    );
                    translated.extend(batch.iter().map(|t| error_placeholder(t)));
                }
            }
        }

        for (original, translation) in texts.into_iter().zip(translated) {
            lookup.insert(original, translation);
        }
        Ok(lookup)
    }

    async fn translate_one(&self, batch: &[String], target_lang: &str) -> Result<Vec<String>> {
        let request = TranslationRequest::new(batch.to_vec(), target_lang);
        timeout(self.call_timeout, self.provider.try_translate_batch(&request))
            .await
            .map_err(|_| TranslationError::TimeoutError)?
    }
}

/// Pair a batch with provider output by position; missing entries keep the original
fn align(batch: &[String], output: Vec<String>) -> Vec<String> {
    let mut output = output.into_iter();
    batch
        .iter()
        .map(|original| output.next().unwrap_or_else(|| original.clone()))
        .collect()
}

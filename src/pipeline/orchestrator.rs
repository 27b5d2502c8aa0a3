//! Fan-out orchestrator: one task per target language, sheets in order within a task

use std::sync::Arc;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{error, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::endpoint_cache::PipelineEndpointCache;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{
    find_language, TranslatableColumns, TranslatedResult, TranslationResults, Workbook,
};
use crate::pipeline::batcher::{error_lookup, DeduplicatingBatcher};
use crate::pipeline::reassembler::translate_sheet;
use crate::providers::{build_provider, TranslationProvider};

/// Translates whole workbooks into several languages at once.
///
/// Owns the session's endpoint cache; `reset` ends the session.
#[derive(Debug, Clone)]
pub struct WorkbookTranslator {
    provider: Arc<dyn TranslationProvider>,
    endpoints: PipelineEndpointCache,
    batch_delay: Duration,
    call_timeout: Duration,
}

impl WorkbookTranslator {
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        endpoints: PipelineEndpointCache,
        batch_delay: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            endpoints,
            batch_delay,
            call_timeout,
        }
    }

    /// Build the configured provider around a fresh endpoint cache
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| TranslationError::configuration(e.to_string()))?;

        let endpoints = PipelineEndpointCache::new();
        let provider = build_provider(config, endpoints.clone())?;
        Ok(Self::new(
            provider,
            endpoints,
            Duration::from_millis(config.batch_delay_ms),
            Duration::from_millis(config.timeout_ms),
        ))
    }

    pub fn provider(&self) -> &dyn TranslationProvider {
        self.provider.as_ref()
    }

    pub fn endpoint_cache(&self) -> &PipelineEndpointCache {
        &self.endpoints
    }

    /// Forget every resolved endpoint
    pub async fn reset(&self) {
        self.endpoints.clear().await;
    }

    /// Translate `workbook` into every language of `target_langs`.
    ///
    /// Languages run concurrently; a language that fails entirely still yields a
    /// structurally complete result filled with error placeholders. Only empty
    /// input is reported as an error, before any network activity.
    pub async fn translate_workbook(
        &self,
        workbook: &Workbook,
        target_langs: &[String],
        columns: Option<&TranslatableColumns>,
    ) -> Result<TranslationResults> {
        let languages = normalize_languages(target_langs);
        if languages.is_empty() {
            return Err(TranslationError::input("no target languages selected"));
        }
        if workbook.total_rows() == 0 {
            return Err(TranslationError::input("workbook contains no rows"));
        }

        for lang in &languages {
            if find_language(lang).is_none() {
                warn!("Unknown target language code '{}', sending as-is", lang);
            }
        }
        if !self.provider.is_configured() {
            warn!("{} has no credentials, producing demo translations", self.provider.name());
        }
        info!(
            "Translating {} sheets ({} rows) into {} languages via {}",
            workbook.sheets.len(),
            workbook.total_rows(),
            languages.len(),
            self.provider.name()
        );

        let workbook = Arc::new(workbook.clone());
        let columns = columns.cloned().map(Arc::new);
        let batcher = DeduplicatingBatcher::new(self.provider.clone(), self.batch_delay, self.call_timeout);

        let tasks: Vec<(String, JoinHandle<TranslatedResult>)> = languages
            .into_iter()
            .map(|lang| {
                let handle = tokio::spawn(translate_language(
                    batcher.clone(),
                    workbook.clone(),
                    columns.clone(),
                    lang.clone(),
                ));
                (lang, handle)
            })
            .collect();

        // Abandoning this future cancels the language tasks still running
        let _guard = AbortOnDrop(tasks.iter().map(|(_, h)| h.abort_handle()).collect());

        let mut results = TranslationResults::new();
        for (lang, handle) in tasks {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!("Translation task for {} did not complete: {}", lang, e);
                    failed_result(&workbook, columns.as_deref(), &lang)
                }
            };
            results.insert(lang, result);
        }

        Ok(results)
    }
}

struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Trimmed, non-empty, first occurrence wins
fn normalize_languages(target_langs: &[String]) -> Vec<String> {
    let mut languages: Vec<String> = Vec::with_capacity(target_langs.len());
    for lang in target_langs {
        let lang = lang.trim();
        if !lang.is_empty() && !languages.iter().any(|l| l == lang) {
            languages.push(lang.to_string());
        }
    }
    languages
}

async fn translate_language(
    batcher: DeduplicatingBatcher,
    workbook: Arc<Workbook>,
    columns: Option<Arc<TranslatableColumns>>,
    lang: String,
) -> TranslatedResult {
    let columns = columns.as_deref();
    let mut sheets = Vec::with_capacity(workbook.sheets.len());
    let mut aborted = false;

    for sheet in &workbook.sheets {
        let lookup = if aborted {
            error_lookup(&sheet.rows, columns)
        } else {
            match batcher.build_lookup(&sheet.rows, columns, &lang).await {
                Ok(lookup) => lookup,
                Err(e) => {
                    error!("Translation to {} aborted at sheet '{}': {}", lang, sheet.name, e);
                    aborted = true;
                    error_lookup(&sheet.rows, columns)
                }
            }
        };

        info!(
            "{}: sheet '{}' done ({} rows, {} distinct strings)",
            lang,
            sheet.name,
            sheet.rows.len(),
            lookup.len()
        );
        sheets.push(translate_sheet(sheet, &lookup, columns));
    }

    TranslatedResult {
        target_lang: lang,
        sheets,
    }
}

fn failed_result(workbook: &Workbook, columns: Option<&TranslatableColumns>, lang: &str) -> TranslatedResult {
    TranslatedResult {
        target_lang: lang.to_string(),
        sheets: workbook
            .sheets
            .iter()
            .map(|sheet| translate_sheet(sheet, &error_lookup(&sheet.rows, columns), columns))
            .collect(),
    }
}

//! Google Translate v2 adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ProviderKind, TranslationRequest};
use crate::providers::{
    demo_placeholders, http_client, merge_translations, sendable_texts, TranslationProvider,
};

#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    q: &'a [String],
    target: &'a str,
    source: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Debug, Deserialize)]
struct GoogleData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
struct GoogleTranslation {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// Google Translate v2: one POST per batch, API key in the query string
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_ms)?,
            api_key: config.google_api_key.trim().to_string(),
            base_url: config.google_base_url.clone(),
        })
    }

    async fn send_request(&self, texts: &[String], request: &TranslationRequest) -> Result<Vec<Option<String>>> {
        let body = GoogleRequest {
            q: texts,
            target: &request.target_lang,
            source: &request.source_lang,
            format: "text",
        };

        let response = self
            .client
            .post(&self.base_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GoogleErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(TranslationError::BatchTranslationError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GoogleResponse =
            serde_json::from_str(&text).map_err(|e| TranslationError::InvalidResponse {
                message: format!("missing data.translations: {}", e),
            })?;

        Ok(parsed
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}

#[async_trait]
impl TranslationProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn batch_size(&self) -> usize {
        ProviderKind::Google.batch_size()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn try_translate_batch(&self, request: &TranslationRequest) -> Result<Vec<String>> {
        if !self.is_configured() {
            return Ok(demo_placeholders(&request.texts, &request.target_lang));
        }

        let sendable = sendable_texts(&request.texts);
        if sendable.is_empty() {
            return Ok(request.texts.clone());
        }

        debug!("Google: translating {} texts to {}", sendable.len(), request.target_lang);
        let translated = self.send_request(&sendable, request).await?;
        Ok(merge_translations(&request.texts, translated))
    }
}

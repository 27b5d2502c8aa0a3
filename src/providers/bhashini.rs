//! Bhashini (ULCA) pipeline adapter
//!
//! Translation happens in two steps: a discovery call resolves the inference
//! callback URL for a language pair, then every batch is posted to that URL.
//! Resolved URLs live in the session's [`PipelineEndpointCache`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::core::config::TranslatorConfig;
use crate::core::endpoint_cache::PipelineEndpointCache;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ProviderKind, TranslationRequest, SOURCE_LANG};
use crate::providers::{
    demo_placeholders, http_client, merge_translations, sendable_texts, TranslationProvider,
};

const TASK_TYPE: &str = "translation";
const DISCOVERY_PATH: &str = "/model/getModelsPipeline";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineTask<'a> {
    task_type: &'static str,
    config: TaskConfig<'a>,
}

#[derive(Debug, Serialize)]
struct TaskConfig<'a> {
    language: LanguagePair<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguagePair<'a> {
    source_language: &'a str,
    target_language: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveryRequest<'a> {
    pipeline_tasks: Vec<PipelineTask<'a>>,
    pipeline_request_config: PipelineRequestConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineRequestConfig<'a> {
    pipeline_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct DiscoveryResponse {
    #[serde(rename = "pipelineInferenceAPIEndPoint")]
    inference_endpoint: Option<InferenceEndpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InferenceEndpoint {
    callback_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeRequest<'a> {
    pipeline_tasks: Vec<PipelineTask<'a>>,
    input_data: InputData<'a>,
}

#[derive(Debug, Serialize)]
struct InputData<'a> {
    input: Vec<SourceItem<'a>>,
}

#[derive(Debug, Serialize)]
struct SourceItem<'a> {
    source: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputeResponse {
    pipeline_response: Vec<PipelineOutput>,
}

#[derive(Debug, Deserialize)]
struct PipelineOutput {
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    target: Option<String>,
}

fn translation_task(target_lang: &str) -> PipelineTask<'_> {
    PipelineTask {
        task_type: TASK_TYPE,
        config: TaskConfig {
            language: LanguagePair {
                source_language: SOURCE_LANG,
                target_language: target_lang,
            },
        },
    }
}

/// Bhashini ULCA pipeline provider
#[derive(Debug, Clone)]
pub struct BhashiniProvider {
    client: reqwest::Client,
    user_id: String,
    api_key: String,
    base_url: String,
    pipeline_id: String,
    endpoints: PipelineEndpointCache,
}

impl BhashiniProvider {
    pub fn new(config: &TranslatorConfig, endpoints: PipelineEndpointCache) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_ms)?,
            user_id: config.bhashini_user_id.trim().to_string(),
            api_key: config.bhashini_api_key.trim().to_string(),
            base_url: config.bhashini_base_url.trim_end_matches('/').to_string(),
            pipeline_id: config.bhashini_pipeline_id.clone(),
            endpoints,
        })
    }

    /// Resolve the inference callback URL for `target_lang`, consulting the cache first.
    ///
    /// Any discovery failure is a `ConfigurationError`; nothing is cached then.
    pub async fn resolve_endpoint(&self, target_lang: &str) -> Result<String> {
        let key = PipelineEndpointCache::key(TASK_TYPE, target_lang);
        if let Some(endpoint) = self.endpoints.get(&key).await {
            return Ok(endpoint);
        }

        let body = DiscoveryRequest {
            pipeline_tasks: vec![translation_task(target_lang)],
            pipeline_request_config: PipelineRequestConfig {
                pipeline_id: &self.pipeline_id,
            },
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, DISCOVERY_PATH))
            .header("userID", &self.user_id)
            .header("ulcaApiKey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                TranslationError::configuration(format!("Pipeline discovery request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Pipeline discovery for {} failed with {}", target_lang, status);
            return Err(TranslationError::configuration(format!(
                "Config failed: {}",
                status
            )));
        }

        let discovered: DiscoveryResponse = response.json().await.map_err(|e| {
            TranslationError::configuration(format!("Unreadable discovery response: {}", e))
        })?;

        let endpoint = discovered
            .inference_endpoint
            .and_then(|e| e.callback_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                error!("Pipeline discovery for {} returned no callback URL", target_lang);
                TranslationError::configuration("No inference endpoint received")
            })?;

        info!("Resolved Bhashini inference endpoint for {}", target_lang);
        self.endpoints.insert(key, endpoint.clone()).await;
        Ok(endpoint)
    }

    async fn send_request(
        &self,
        endpoint: &str,
        texts: &[String],
        target_lang: &str,
    ) -> Result<Vec<Option<String>>> {
        let body = ComputeRequest {
            pipeline_tasks: vec![translation_task(target_lang)],
            input_data: InputData {
                input: texts.iter().map(|t| SourceItem { source: t }).collect(),
            },
        };

        let response = self
            .client
            .post(endpoint)
            .header("userID", &self.user_id)
            .header("ulcaApiKey", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslationError::BatchTranslationError {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response.json().await?;
        parse_compute_response(json)
    }
}

/// Extract translations from the canonical `pipelineResponse[0].output` shape
fn parse_compute_response(json: serde_json::Value) -> Result<Vec<Option<String>>> {
    if json.get("pipelineResponse").is_none() {
        if json.get("output").is_some() {
            return Err(TranslationError::configuration(
                "Unsupported response shape: top-level output without pipelineResponse",
            ));
        }
        return Err(TranslationError::InvalidResponse {
            message: "missing pipelineResponse".to_string(),
        });
    }

    let parsed: ComputeResponse =
        serde_json::from_value(json).map_err(|e| TranslationError::InvalidResponse {
            message: e.to_string(),
        })?;

    let first = parsed
        .pipeline_response
        .into_iter()
        .next()
        .ok_or_else(|| TranslationError::InvalidResponse {
            message: "empty pipelineResponse".to_string(),
        })?;

    Ok(first.output.into_iter().map(|item| item.target).collect())
}

#[async_trait]
impl TranslationProvider for BhashiniProvider {
    fn name(&self) -> &str {
        "bhashini"
    }

    fn batch_size(&self) -> usize {
        ProviderKind::Bhashini.batch_size()
    }

    fn is_configured(&self) -> bool {
        !self.user_id.is_empty() && !self.api_key.is_empty()
    }

    async fn try_translate_batch(&self, request: &TranslationRequest) -> Result<Vec<String>> {
        if !self.is_configured() {
            return Ok(demo_placeholders(&request.texts, &request.target_lang));
        }

        let sendable = sendable_texts(&request.texts);
        if sendable.is_empty() {
            return Ok(request.texts.clone());
        }

        let endpoint = self.resolve_endpoint(&request.target_lang).await?;
        debug!("Bhashini: translating {} texts to {}", sendable.len(), request.target_lang);
        let translated = self
            .send_request(&endpoint, &sendable, &request.target_lang)
            .await?;
        Ok(merge_translations(&request.texts, translated))
    }
}

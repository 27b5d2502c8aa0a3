//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::core::models::ProviderKind;

const DEFAULT_GOOGLE_BASE_URL: &str = "https://translation.googleapis.com/language/translate/v2";
const DEFAULT_BHASHINI_BASE_URL: &str = "https://meity-auth.ulcacontrib.org/ulca/apis/v0";
const DEFAULT_BHASHINI_PIPELINE_ID: &str = "64392f96daac500b55c543cd";

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub provider: ProviderKind,
    pub google_api_key: String,
    pub google_base_url: String,
    pub bhashini_user_id: String,
    pub bhashini_api_key: String,
    pub bhashini_base_url: String,
    pub bhashini_pipeline_id: String,
    /// Pause between consecutive batches of one (language, sheet) unit
    pub batch_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Google,
            google_api_key: String::new(),
            google_base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
            bhashini_user_id: String::new(),
            bhashini_api_key: String::new(),
            bhashini_base_url: DEFAULT_BHASHINI_BASE_URL.to_string(),
            bhashini_pipeline_id: DEFAULT_BHASHINI_PIPELINE_ID.to_string(),
            batch_delay_ms: 100,
            timeout_ms: 30000,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Absent credentials are accepted: the provider then runs in demo mode.
    pub fn from_env() -> anyhow::Result<Self> {
        let provider = std::env::var("TRANSLATION_PROVIDER")
            .unwrap_or_else(|_| "google".to_string())
            .parse::<ProviderKind>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let batch_delay_ms = std::env::var("BATCH_DELAY_MS")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u64>()?;

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()?;

        let config = Self {
            provider,
            google_api_key: std::env::var("GOOGLE_TRANSLATE_API_KEY").unwrap_or_default(),
            google_base_url: std::env::var("GOOGLE_TRANSLATE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_BASE_URL.to_string()),
            bhashini_user_id: std::env::var("BHASHINI_USER_ID").unwrap_or_default(),
            bhashini_api_key: std::env::var("BHASHINI_ULCA_API_KEY").unwrap_or_default(),
            bhashini_base_url: std::env::var("BHASHINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BHASHINI_BASE_URL.to_string()),
            bhashini_pipeline_id: std::env::var("BHASHINI_PIPELINE_ID")
                .unwrap_or_else(|_| DEFAULT_BHASHINI_PIPELINE_ID.to_string()),
            batch_delay_ms,
            timeout_ms,
        };

        if !config.has_credentials() {
            warn!(
                "No {} credentials found, running in demo mode with placeholder translations",
                config.provider
            );
        }

        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = match self.provider {
            ProviderKind::Google => &self.google_base_url,
            ProviderKind::Bhashini => &self.bhashini_base_url,
        };
        if base_url.is_empty() {
            return Err(anyhow::anyhow!("{} base URL is required", self.provider));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Whether the selected provider has the credentials it needs
    pub fn has_credentials(&self) -> bool {
        match self.provider {
            ProviderKind::Google => !self.google_api_key.trim().is_empty(),
            ProviderKind::Bhashini => {
                !self.bhashini_user_id.trim().is_empty() && !self.bhashini_api_key.trim().is_empty()
            }
        }
    }

    /// Set the API key of the selected provider.
    ///
    /// For Bhashini the ULCA key is set; the user id still comes from the environment.
    pub fn set_api_key(&mut self, api_key: String) {
        match self.provider {
            ProviderKind::Google => self.google_api_key = api_key,
            ProviderKind::Bhashini => self.bhashini_api_key = api_key,
        }
    }
}

//! Gemini API key client (Generative Language API).

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::shared::{
    build_generate_request, build_headers, classify_reqwest_error, parse_generate_response,
    read_body,
};
use crate::files::RemoteFile;
use crate::providers::{ProviderError, ProviderResult, resolve_api_key, resolve_base_url};
use crate::service::{FileService, Part};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: Option<u32>,
}

impl GeminiConfig {
    /// Creates a new config from environment.
    ///
    /// Authentication resolution order:
    /// 1. `config_api_key` parameter (from config file)
    /// 2. `GEMINI_API_KEY` environment variable
    ///
    /// `GEMINI_BASE_URL` overrides the configured base URL.
    ///
    /// # Errors
    /// Returns an error if no API key is available or the base URL is invalid.
    pub fn from_env(
        model: String,
        max_output_tokens: Option<u32>,
        config_base_url: Option<&str>,
        config_api_key: Option<&str>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(config_api_key, "GEMINI_API_KEY", "gemini")?;
        let base_url = resolve_base_url(
            config_base_url,
            "GEMINI_BASE_URL",
            DEFAULT_BASE_URL,
            "Gemini",
        )?;

        Ok(Self {
            api_key,
            base_url,
            model,
            max_output_tokens,
        })
    }

    /// Media upload endpoint root: the base URL with `/upload` prefixed to its path.
    ///
    /// `https://host/v1beta` becomes `https://host/upload/v1beta`.
    pub fn upload_base_url(&self) -> ProviderResult<String> {
        let mut url = url::Url::parse(&self.base_url).map_err(|e| {
            ProviderError::parse(format!("Invalid Gemini base URL {}: {e}", self.base_url))
        })?;
        let path = format!("/upload{}", url.path().trim_end_matches('/'));
        url.set_path(&path);
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

/// Gemini client.
pub struct GeminiClient {
    pub(super) config: GeminiConfig,
    pub(super) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Sends `contents` as one user turn to `models/{model}:generateContent`.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-2xx status, or a response
    /// without answer text.
    pub async fn generate_content(&self, contents: &[Part]) -> ProviderResult<String> {
        let request = build_generate_request(contents, self.config.max_output_tokens);
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        tracing::debug!(%url, parts = contents.len(), "generate content");

        let response = self
            .http
            .post(&url)
            .headers(build_headers(&self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        let body = read_body(response).await?;

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            ProviderError::parse(format!("Failed to parse Gemini response JSON: {e}"))
        })?;
        parse_generate_response(&value)
    }
}

#[async_trait]
impl FileService for GeminiClient {
    async fn upload(
        &self,
        content: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> ProviderResult<RemoteFile> {
        self.upload_file(content, display_name, mime_type).await
    }

    async fn list(&self) -> ProviderResult<Vec<RemoteFile>> {
        self.list_files().await
    }

    async fn delete(&self, file_id: &str) -> ProviderResult<()> {
        self.delete_file(file_id).await
    }

    async fn generate(&self, contents: &[Part]) -> ProviderResult<String> {
        self.generate_content(contents).await
    }
}

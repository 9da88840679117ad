//! Provider-agnostic helpers: credential resolution and the structured provider error.

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard User-Agent header for doclens API requests.
pub const USER_AGENT: &str = concat!("doclens/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Config resolution helpers
// ============================================================================

/// Resolves an API key with precedence: config > env.
///
/// # Arguments
/// * `config_api_key` - Value from config file (if present)
/// * `env_var` - Environment variable name (e.g., "`GEMINI_API_KEY`")
/// * `config_section` - Config section name (e.g., "gemini")
///
/// # Errors
/// Returns an error if neither source provides a key.
pub fn resolve_api_key(
    config_api_key: Option<&str>,
    env_var: &str,
    config_section: &str,
) -> Result<String> {
    if let Some(key) = config_api_key {
        let trimmed = key.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    let key = std::env::var(env_var).context(format!(
        "No API key available. Set {env_var} or api_key in [{config_section}]."
    ))?;
    let trimmed = key.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{env_var} is set but empty. Set it or api_key in [{config_section}].");
    }
    Ok(trimmed.to_string())
}

/// Resolves a base URL with precedence: env > config > default.
///
/// Trailing slashes are dropped so paths can be appended with `/`.
///
/// # Errors
/// Returns an error if the chosen URL does not parse.
pub fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
    provider_name: &str,
) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, provider_name)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, provider_name)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    Ok(default_url.to_string())
}

fn validate_url(url: &str, provider_name: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid {provider_name} base URL: {url}"))?;
    Ok(())
}

/// Categories of provider errors for consistent error handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Failed to parse response (JSON parse error, missing header, etc.)
    Parse,
    /// API-level error carried in a successful response (e.g. blocked prompt)
    ApiError,
    /// Request rejected before sending (e.g. malformed file id)
    InvalidRequest,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::HttpStatus => write!(f, "http_status"),
            ProviderErrorKind::Timeout => write!(f, "timeout"),
            ProviderErrorKind::Parse => write!(f, "parse"),
            ProviderErrorKind::ApiError => write!(f, "api_error"),
            ProviderErrorKind::InvalidRequest => write!(f, "invalid_request"),
        }
    }
}

/// Structured error from the provider with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderError {
    /// Error category
    pub kind: ProviderErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, lifting `error.message` out of a JSON body.
    pub fn http_status(status: u16, body: &str) -> Self {
        if body.is_empty() {
            return Self::new(ProviderErrorKind::HttpStatus, format!("HTTP {status}"));
        }

        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(error_obj) = json.get("error")
            && let Some(msg) = error_obj.get("message").and_then(Value::as_str)
        {
            return Self {
                kind: ProviderErrorKind::HttpStatus,
                message: format!("HTTP {status}: {msg}"),
                details: Some(body.to_string()),
            };
        }

        Self {
            kind: ProviderErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: Some(body.to_string()),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Parse, message)
    }

    pub fn api_error(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::ApiError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Result type for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

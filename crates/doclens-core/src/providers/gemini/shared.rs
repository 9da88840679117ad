//! Shared Gemini helpers: headers, error classification and wire types.

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::files::{PDF_MIME_TYPE, RemoteFile, file_id_from_uri};
use crate::providers::{ProviderError, ProviderErrorKind, ProviderResult, USER_AGENT};
use crate::service::Part;

/// Classifies a reqwest error into a `ProviderError`.
pub(super) fn classify_reqwest_error(e: &reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ProviderError::timeout(format!("Connection failed: {e}"))
    } else if e.is_decode() {
        ProviderError::parse(format!("Invalid response body: {e}"))
    } else if e.is_request() {
        ProviderError::new(ProviderErrorKind::HttpStatus, format!("Request error: {e}"))
    } else {
        ProviderError::new(ProviderErrorKind::HttpStatus, format!("Network error: {e}"))
    }
}

pub(super) fn build_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-goog-api-key",
        HeaderValue::from_str(api_key).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    headers.insert("accept", HeaderValue::from_static("application/json"));
    headers.insert("user-agent", HeaderValue::from_static(USER_AGENT));
    headers
}

/// Reads a response body and maps non-2xx statuses to `ProviderError`.
pub(super) async fn read_body(response: reqwest::Response) -> ProviderResult<String> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(ProviderError::http_status(status.as_u16(), &body));
    }
    Ok(body)
}

/// `File` resource as returned by the Files API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct FileResource {
    pub name: String,
    pub display_name: Option<String>,
    pub mime_type: Option<String>,
    /// int64 values are encoded as JSON strings.
    pub size_bytes: Option<String>,
    pub uri: String,
    pub state: Option<String>,
}

impl FileResource {
    /// Converts to a session handle; the id comes from `uri`, or `name` when no URI is given.
    pub fn into_remote_file(self) -> RemoteFile {
        let id_source = if self.uri.is_empty() {
            &self.name
        } else {
            &self.uri
        };
        let id = file_id_from_uri(id_source).to_string();
        RemoteFile {
            id,
            name: self.name,
            display_name: self.display_name.unwrap_or_default(),
            uri: self.uri,
            mime_type: self
                .mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| PDF_MIME_TYPE.to_string()),
            size_bytes: self.size_bytes.and_then(|s| s.parse().ok()),
            state: self.state,
        }
    }
}

/// Envelope of upload and get responses.
#[derive(Debug, Deserialize)]
pub(super) struct FileEnvelope {
    pub file: FileResource,
}

/// One page of `files.list`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct ListFilesPage {
    pub files: Vec<FileResource>,
    pub next_page_token: Option<String>,
}

/// Builds a `generateContent` request with every part in one user turn.
pub(super) fn build_generate_request(contents: &[Part], max_output_tokens: Option<u32>) -> Value {
    let parts: Vec<Value> = contents
        .iter()
        .map(|part| match part {
            Part::File(file) => json!({
                "fileData": {
                    "mimeType": file.mime_type,
                    "fileUri": file.uri,
                }
            }),
            Part::Text(text) => json!({ "text": text }),
        })
        .collect();

    let mut request = json!({
        "contents": [{
            "role": "user",
            "parts": parts,
        }]
    });
    if let Some(max) = max_output_tokens {
        request["generationConfig"] = json!({ "maxOutputTokens": max });
    }
    request
}

/// Extracts the answer text from a `generateContent` response.
///
/// Text parts of the first candidate are concatenated; thought parts are skipped.
pub(super) fn parse_generate_response(value: &Value) -> ProviderResult<String> {
    let Some(candidate) = value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
    else {
        let reason = value
            .get("promptFeedback")
            .and_then(|feedback| feedback.get("blockReason"))
            .and_then(Value::as_str);
        return Err(match reason {
            Some(reason) => ProviderError::api_error(format!("Prompt was blocked: {reason}")),
            None => ProviderError::api_error("Model returned no candidates"),
        });
    };

    let text: String = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|part| !part.get("thought").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        let finish = candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(ProviderError::api_error(format!(
            "Model returned no text (finish reason: {finish})"
        )));
    }

    Ok(text)
}

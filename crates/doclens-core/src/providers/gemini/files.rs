//! Gemini Files API: resumable upload, paginated list, delete.

use std::collections::HashSet;

use reqwest::header::HeaderValue;
use serde_json::json;

use super::api::GeminiClient;
use super::shared::{
    FileEnvelope, FileResource, ListFilesPage, build_headers, classify_reqwest_error, read_body,
};
use crate::files::{RemoteFile, normalize_file_id};
use crate::providers::{ProviderError, ProviderResult};

const LIST_PAGE_SIZE: u32 = 100;
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

impl GeminiClient {
    /// Uploads `content` with the resumable protocol (start, then upload+finalize).
    ///
    /// # Errors
    /// Returns an error if either request fails or the start response carries
    /// no upload URL.
    pub async fn upload_file(
        &self,
        content: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> ProviderResult<RemoteFile> {
        let start_url = format!("{}/files", self.config.upload_base_url()?);
        let size = content.len();
        tracing::debug!(url = %start_url, display_name, size, "start upload");

        let response = self
            .http
            .post(&start_url)
            .headers(build_headers(&self.config.api_key))
            .header("x-goog-upload-protocol", "resumable")
            .header("x-goog-upload-command", "start")
            .header("x-goog-upload-header-content-length", size.to_string())
            .header("x-goog-upload-header-content-type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        let session_url = response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .map(str::to_string);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::http_status(status.as_u16(), &body));
        }
        let session_url = session_url.ok_or_else(|| {
            ProviderError::parse("Upload start response is missing the X-Goog-Upload-URL header")
        })?;

        let response = self
            .http
            .post(&session_url)
            .headers(build_headers(&self.config.api_key))
            .header("x-goog-upload-offset", "0")
            .header("x-goog-upload-command", "upload, finalize")
            .header("content-type", mime_type)
            .body(content)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        let body = read_body(response).await?;

        let envelope: FileEnvelope = serde_json::from_str(&body).map_err(|e| {
            ProviderError::parse(format!("Failed to parse upload response JSON: {e}"))
        })?;
        let file = envelope.file.into_remote_file();
        tracing::info!(id = %file.id, display_name = %file.display_name, "uploaded file");
        Ok(file)
    }

    /// Lists every stored file, following `nextPageToken` until exhausted or repeated.
    ///
    /// # Errors
    /// Returns an error if any page request fails.
    pub async fn list_files(&self) -> ProviderResult<Vec<RemoteFile>> {
        let url = format!("{}/files", self.config.base_url);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            tracing::debug!(%url, page_token = ?page_token, "list files");

            let response = self
                .http
                .get(&url)
                .headers(build_headers(&self.config.api_key))
                .query(&query)
                .send()
                .await
                .map_err(|e| classify_reqwest_error(&e))?;
            let body = read_body(response).await?;

            let page: ListFilesPage = if body.trim().is_empty() {
                ListFilesPage::default()
            } else {
                serde_json::from_str(&body).map_err(|e| {
                    ProviderError::parse(format!("Failed to parse file list JSON: {e}"))
                })?
            };
            files.extend(page.files.into_iter().map(FileResource::into_remote_file));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if !seen_tokens.insert(token.clone()) => {
                    tracing::warn!(%token, "list files: page token repeated, stopping");
                    break;
                }
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::info!(count = files.len(), "listed files");
        Ok(files)
    }

    /// Deletes `files/{file_id}`. Accepts a bare id or the `files/<id>` resource name.
    ///
    /// # Errors
    /// Returns an error for a malformed id, on transport failure or a non-2xx status.
    pub async fn delete_file(&self, file_id: &str) -> ProviderResult<()> {
        let file_id = normalize_file_id(file_id);
        let url = self.file_url(file_id)?;
        tracing::debug!(%url, "delete file");

        let response = self
            .http
            .delete(url)
            .headers(build_headers(&self.config.api_key))
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        read_body(response).await?;

        tracing::info!(file_id, "deleted file");
        Ok(())
    }

    /// Builds `{base}/files/{id}` with the id as a single encoded path segment.
    fn file_url(&self, file_id: &str) -> ProviderResult<url::Url> {
        if file_id.is_empty()
            || file_id == "."
            || file_id == ".."
            || file_id.contains(['/', '?', '#', '\\'])
        {
            return Err(ProviderError::invalid_request(format!(
                "Invalid file ID '{file_id}'"
            )));
        }

        let mut url = url::Url::parse(&self.config.base_url).map_err(|e| {
            ProviderError::parse(format!(
                "Invalid Gemini base URL {}: {e}",
                self.config.base_url
            ))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ProviderError::parse(format!(
                    "Gemini base URL cannot hold a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .push("files")
            .push(file_id);
        Ok(url)
    }
}

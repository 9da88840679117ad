//! The remote document/AI service seam.

use async_trait::async_trait;

use crate::files::RemoteFile;
use crate::providers::ProviderResult;

/// One element of a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Reference to an uploaded document.
    File(RemoteFile),
    Text(String),
}

/// Upload, list, delete and generate against a hosted document/AI service.
#[async_trait]
pub trait FileService: Send + Sync {
    /// Uploads `content` and returns the handle the service assigned to it.
    async fn upload(
        &self,
        content: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> ProviderResult<RemoteFile>;

    /// Lists every file stored under the account.
    async fn list(&self) -> ProviderResult<Vec<RemoteFile>>;

    /// Deletes the file with the given id.
    async fn delete(&self, file_id: &str) -> ProviderResult<()>;

    /// Sends `contents` as a single user turn and returns the response text.
    async fn generate(&self, contents: &[Part]) -> ProviderResult<String>;
}

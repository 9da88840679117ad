//! Session controller: file selection, upload, ask, list and delete.
//!
//! A `Session` owns the in-memory state of one interactive run. Operations never
//! print; each returns a report the caller renders. Remote failures are captured
//! in the report and never abort the session.

use std::fmt;
use std::path::Path;

use anyhow::{Result, bail};

use crate::files::{LocalFile, PDF_MIME_TYPE, RemoteFile, normalize_file_id};
use crate::providers::{ProviderError, ProviderResult};
use crate::service::{FileService, Part};

/// Maximum number of documents selected for one upload batch.
pub const MAX_FILES: usize = 3;

/// Precondition failures, reported before any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    NoFilesSelected,
    MissingPromptOrFiles,
    EmptyFileId,
}

impl Warning {
    pub fn message(self) -> &'static str {
        match self {
            Warning::NoFilesSelected => "Please upload documents.",
            Warning::MissingPromptOrFiles => "Please upload files and enter a prompt.",
            Warning::EmptyFileId => "Please enter a file ID.",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Why a single file in an upload batch failed.
#[derive(Debug)]
pub enum UploadError {
    /// The local file could not be read.
    Read(std::io::Error),
    Remote(ProviderError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Read(e) => write!(f, "cannot read file: {e}"),
            UploadError::Remote(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for UploadError {}

#[derive(Debug)]
pub struct UploadOutcome {
    pub display_name: String,
    pub result: Result<RemoteFile, UploadError>,
}

#[derive(Debug)]
pub enum UploadReport {
    Skipped(Warning),
    /// One outcome per selected file, in selection order.
    Completed(Vec<UploadOutcome>),
}

impl UploadReport {
    pub fn uploaded(&self) -> usize {
        match self {
            UploadReport::Skipped(_) => 0,
            UploadReport::Completed(outcomes) => {
                outcomes.iter().filter(|o| o.result.is_ok()).count()
            }
        }
    }

    pub fn failed(&self) -> usize {
        match self {
            UploadReport::Skipped(_) => 0,
            UploadReport::Completed(outcomes) => {
                outcomes.iter().filter(|o| o.result.is_err()).count()
            }
        }
    }
}

#[derive(Debug)]
pub enum AskReport {
    Skipped(Warning),
    /// Model text, verbatim.
    Answered(String),
    Failed(ProviderError),
}

#[derive(Debug)]
pub struct DeleteOutcome {
    pub file_id: String,
    pub result: ProviderResult<()>,
}

#[derive(Debug)]
pub enum DeleteReport {
    Skipped(Warning),
    /// Delete-all could not enumerate files; nothing was deleted.
    ListFailed(ProviderError),
    Completed(Vec<DeleteOutcome>),
}

impl DeleteReport {
    pub fn failed(&self) -> usize {
        match self {
            DeleteReport::Skipped(_) => 0,
            DeleteReport::ListFailed(_) => 1,
            DeleteReport::Completed(outcomes) => {
                outcomes.iter().filter(|o| o.result.is_err()).count()
            }
        }
    }
}

/// Process-local state of one session.
#[derive(Debug, Default)]
pub struct SessionState {
    local_files: Vec<LocalFile>,
    remote_files: Vec<RemoteFile>,
}

/// Sequences user actions against a `FileService`.
pub struct Session<S> {
    service: S,
    state: SessionState,
}

impl<S: FileService> Session<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: SessionState::default(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Files selected for the next upload.
    pub fn selected(&self) -> &[LocalFile] {
        &self.state.local_files
    }

    /// Handles returned by successful uploads in this session.
    pub fn remote_files(&self) -> &[RemoteFile] {
        &self.state.remote_files
    }

    /// Selects a PDF for the next upload.
    ///
    /// # Errors
    /// Returns an error when `MAX_FILES` are already selected or the path is not a PDF.
    pub fn select(&mut self, path: &Path) -> Result<&LocalFile> {
        if self.state.local_files.len() >= MAX_FILES {
            bail!("At most {MAX_FILES} documents can be selected at once");
        }
        let file = LocalFile::from_path(path)?;
        tracing::debug!(path = %file.path.display(), "selected file");
        self.state.local_files.push(file);
        Ok(&self.state.local_files[self.state.local_files.len() - 1])
    }

    /// Removes the selection in 1-based `slot`.
    pub fn unselect(&mut self, slot: usize) -> Option<LocalFile> {
        if slot == 0 || slot > self.state.local_files.len() {
            return None;
        }
        Some(self.state.local_files.remove(slot - 1))
    }

    pub fn clear_selection(&mut self) {
        self.state.local_files.clear();
    }

    /// Uploads every selected file, one remote call each.
    ///
    /// Failures are recorded per file and do not stop the batch. Successful
    /// handles are appended to the session's remote files. The selection is
    /// consumed.
    pub async fn upload(&mut self) -> UploadReport {
        if self.state.local_files.is_empty() {
            return UploadReport::Skipped(Warning::NoFilesSelected);
        }

        let batch = std::mem::take(&mut self.state.local_files);
        let mut outcomes = Vec::with_capacity(batch.len());
        for local in batch {
            let result = match tokio::fs::read(&local.path).await {
                Ok(content) => self
                    .service
                    .upload(content, &local.display_name, PDF_MIME_TYPE)
                    .await
                    .map_err(UploadError::Remote),
                Err(e) => Err(UploadError::Read(e)),
            };

            match &result {
                Ok(remote) => self.state.remote_files.push(remote.clone()),
                Err(e) => {
                    tracing::warn!(display_name = %local.display_name, error = %e, "upload failed");
                }
            }
            outcomes.push(UploadOutcome {
                display_name: local.display_name,
                result,
            });
        }

        UploadReport::Completed(outcomes)
    }

    /// Asks the model about every uploaded file.
    ///
    /// Sends exactly one request: all remote files in upload order, then the prompt.
    pub async fn ask(&self, prompt: &str) -> AskReport {
        if prompt.trim().is_empty() || self.state.remote_files.is_empty() {
            return AskReport::Skipped(Warning::MissingPromptOrFiles);
        }

        let contents: Vec<Part> = self
            .state
            .remote_files
            .iter()
            .cloned()
            .map(Part::File)
            .chain(std::iter::once(Part::Text(prompt.to_string())))
            .collect();

        match self.service.generate(&contents).await {
            Ok(text) => {
                tracing::info!(files = self.state.remote_files.len(), "answer received");
                AskReport::Answered(text)
            }
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                AskReport::Failed(e)
            }
        }
    }

    /// Lists every file stored under the account. Does not touch session state.
    ///
    /// # Errors
    /// Returns the provider error if the listing fails.
    pub async fn list_files(&self) -> ProviderResult<Vec<RemoteFile>> {
        self.service.list().await.inspect_err(|e| {
            tracing::warn!(error = %e, "list files failed");
        })
    }

    /// Deletes a single remote file by id or `files/<id>` resource name.
    pub async fn delete_one(&mut self, file_id: &str) -> DeleteReport {
        let file_id = normalize_file_id(file_id);
        if file_id.is_empty() {
            return DeleteReport::Skipped(Warning::EmptyFileId);
        }

        let outcome = self.delete_id(file_id.to_string()).await;
        DeleteReport::Completed(vec![outcome])
    }

    /// Lists remote files and deletes each one; a failure on one id does not stop the rest.
    pub async fn delete_all(&mut self) -> DeleteReport {
        let files = match self.list_files().await {
            Ok(files) => files,
            Err(e) => return DeleteReport::ListFailed(e),
        };

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(self.delete_id(file.id).await);
        }
        DeleteReport::Completed(outcomes)
    }

    async fn delete_id(&mut self, file_id: String) -> DeleteOutcome {
        let result = self.service.delete(&file_id).await;
        match &result {
            Ok(()) => self.state.remote_files.retain(|f| f.id != file_id),
            Err(e) => tracing::warn!(file_id = %file_id, error = %e, "delete failed"),
        }
        DeleteOutcome { file_id, result }
    }
}

//! Local and remote document handles.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// The only document type accepted for upload.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A document the user picked, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub display_name: String,
}

impl LocalFile {
    /// Validates `path` as a readable PDF and derives its display name from the file name.
    ///
    /// # Errors
    /// Returns an error if the path is not a regular file or its content is not a PDF.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        if !metadata.is_file() {
            bail!("'{}' is not a file", path.display());
        }

        let kind = infer::get_from_path(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        if kind.map(|k| k.mime_type()) != Some(PDF_MIME_TYPE) {
            bail!("'{}' is not a PDF document", path.display());
        }

        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            display_name,
        })
    }
}

/// Service-side record of an uploaded document.
///
/// Only ever built from a service response; the local session list is a cache of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Trailing segment of `uri`.
    pub id: String,
    /// Resource name, `files/<id>`.
    pub name: String,
    pub display_name: String,
    pub uri: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Processing state reported by the service (`PROCESSING`, `ACTIVE`, `FAILED`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Extracts a file id from a file URI: everything after the last `/`.
///
/// `https://host/v1beta/files/abc123` yields `abc123`. A string without `/`
/// is returned unchanged, and a trailing `/` yields an empty id.
pub fn file_id_from_uri(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Accepts a bare file id or the `files/<id>` resource name and returns the bare id.
pub fn normalize_file_id(input: &str) -> &str {
    let id = input.trim();
    id.strip_prefix("files/").unwrap_or(id).trim()
}

/// Normalizes user-provided file paths.
///
/// Handles common drag-and-drop shell escaping (`\ `, `\(`, `\)`), strips
/// surrounding quotes, and expands `~/` to the HOME directory when available.
#[must_use]
pub fn normalize_input_path(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed);

    let unescaped = unquoted
        .replace("\\ ", " ")
        .replace("\\(", "(")
        .replace("\\)", ")");

    if let Some(rest) = unescaped.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }

    PathBuf::from(unescaped)
}

//! Plain-text rendering of session reports.

use std::fmt::Write;

use doclens_core::files::{LocalFile, RemoteFile};
use doclens_core::providers::ProviderError;
use doclens_core::session::{AskReport, DeleteReport, UploadReport, Warning};

pub fn warning(warning: Warning) -> String {
    format!("Warning: {warning}")
}

/// `<display_name>, URI: <uri>` per file.
pub fn file_lines(files: &[RemoteFile]) -> String {
    let mut out = String::new();
    for file in files {
        let _ = writeln!(out, "{}, URI: {}", file.display_name, file.uri);
    }
    out
}

pub fn uploaded_files(files: &[RemoteFile]) -> String {
    if files.is_empty() {
        return "No files uploaded in this session.\n".to_string();
    }
    format!("Uploaded Files:\n{}", file_lines(files))
}

pub fn selected_files(files: &[LocalFile]) -> String {
    if files.is_empty() {
        return "No documents selected.\n".to_string();
    }
    let mut out = String::new();
    for (idx, file) in files.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} ({})",
            idx + 1,
            file.display_name,
            file.path.display()
        );
    }
    out
}

pub fn upload_report(report: &UploadReport) -> String {
    let outcomes = match report {
        UploadReport::Skipped(w) => return format!("{}\n", warning(*w)),
        UploadReport::Completed(outcomes) => outcomes,
    };

    let mut out = String::new();
    for outcome in outcomes {
        if let Err(e) = &outcome.result {
            let _ = writeln!(out, "Failed to upload {}: {e}", outcome.display_name);
        }
    }
    let uploaded = report.uploaded();
    if report.failed() == 0 {
        out.push_str("Files uploaded successfully.\n");
    } else {
        let _ = writeln!(out, "Uploaded {uploaded} of {} files.", outcomes.len());
    }
    out
}

pub fn ask_report(report: &AskReport) -> String {
    match report {
        AskReport::Skipped(w) => format!("{}\n", warning(*w)),
        AskReport::Answered(text) => format!("Response:\n{text}\n"),
        AskReport::Failed(e) => format!("Error generating response: {e}\n"),
    }
}

pub fn list_result(result: &Result<Vec<RemoteFile>, ProviderError>) -> String {
    match result {
        Ok(files) if files.is_empty() => "No files found.\n".to_string(),
        Ok(files) => format!("Files:\n{}", file_lines(files)),
        Err(e) => format!("Error listing files: {e}\n"),
    }
}

pub fn delete_report(report: &DeleteReport) -> String {
    match report {
        DeleteReport::Skipped(w) => format!("{}\n", warning(*w)),
        DeleteReport::ListFailed(e) => format!("Error listing files: {e}\n"),
        DeleteReport::Completed(outcomes) if outcomes.is_empty() => {
            "No files to delete.\n".to_string()
        }
        DeleteReport::Completed(outcomes) => {
            let mut out = String::new();
            for outcome in outcomes {
                match &outcome.result {
                    Ok(()) => {
                        let _ = writeln!(out, "Deleted file with ID: {}", outcome.file_id);
                    }
                    Err(e) => {
                        let _ = writeln!(
                            out,
                            "Error deleting file with ID {}: {e}",
                            outcome.file_id
                        );
                    }
                }
            }
            out
        }
    }
}

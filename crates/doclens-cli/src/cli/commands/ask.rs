//! One-shot ask: upload the given PDFs, ask one question, print the answer.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use doclens_core::files::normalize_input_path;
use doclens_core::service::FileService;
use doclens_core::session::{AskReport, Session, Warning};

use crate::render;

pub async fn run<S: FileService>(
    mut session: Session<S>,
    files: &[PathBuf],
    prompt: &str,
) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!(Warning::MissingPromptOrFiles);
    }

    for path in files {
        let path = normalize_input_path(&path.to_string_lossy());
        session
            .select(&path)
            .with_context(|| format!("select '{}'", path.display()))?;
    }

    let report = session.upload().await;
    print!("{}", render::upload_report(&report));
    if report.failed() > 0 {
        bail!("{} of the documents failed to upload", report.failed());
    }
    print!("{}", render::uploaded_files(session.remote_files()));

    let report = session.ask(prompt).await;
    match report {
        AskReport::Answered(_) => {
            print!("{}", render::ask_report(&report));
            Ok(())
        }
        AskReport::Skipped(warning) => bail!(warning),
        AskReport::Failed(e) => Err(e).context("generate response"),
    }
}

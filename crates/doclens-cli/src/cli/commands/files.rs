//! Remote file management command handlers.

use anyhow::{Context, Result, bail};
use doclens_core::service::FileService;
use doclens_core::session::Session;

use crate::render;

pub async fn list<S: FileService>(session: &Session<S>) -> Result<()> {
    let files = session.list_files().await.context("list files")?;
    print!("{}", render::list_result(&Ok(files)));
    Ok(())
}

pub async fn delete<S: FileService>(mut session: Session<S>, id: &str) -> Result<()> {
    let report = session.delete_one(id).await;
    print!("{}", render::delete_report(&report));
    if report.failed() > 0 {
        bail!("failed to delete file '{}'", id.trim());
    }
    Ok(())
}

pub async fn delete_all<S: FileService>(mut session: Session<S>) -> Result<()> {
    let report = session.delete_all().await;
    print!("{}", render::delete_report(&report));
    let failed = report.failed();
    if failed > 0 {
        bail!("{failed} deletion(s) failed");
    }
    Ok(())
}

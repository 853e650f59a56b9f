// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared "fetch a job-referenced resource" helper. `config`, `source`, and
//! the optional icon/splash URLs on a [`farm_core::Job`] are each either an
//! absolute `http(s)://`/`file://` URL, or — in one-shot mode — a path
//! relative to a CLI-supplied config root.

use std::path::Path;

use crate::error::BuildError;

pub async fn fetch_resource(
    location: &str,
    config_root: Option<&Path>,
    dest: &Path,
) -> Result<(), BuildError> {
    if let Some(rest) = location.strip_prefix("file://") {
        return copy_local(Path::new(rest), dest);
    }
    if location.starts_with("http://") || location.starts_with("https://") {
        return download_http(location, dest).await;
    }
    let root = config_root.ok_or_else(|| {
        BuildError::uniform(format!(
            "no config root supplied to resolve relative path '{location}'"
        ))
    })?;
    copy_local(&root.join(location), dest)
}

fn copy_local(src: &Path, dest: &Path) -> Result<(), BuildError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BuildError::from_stage("fetch", e))?;
    }
    std::fs::copy(src, dest)
        .map_err(|e| BuildError::from_stage("fetch", format!("{}: {e}", src.display())))?;
    Ok(())
}

async fn download_http(url: &str, dest: &Path) -> Result<(), BuildError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| BuildError::from_stage("fetch", e))?
        .error_for_status()
        .map_err(|e| BuildError::from_stage("fetch", e))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| BuildError::from_stage("fetch", e))?;
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| BuildError::from_stage("fetch", e))?;
    }
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| BuildError::from_stage("fetch", e))?;
    Ok(())
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers common to every `PlatformBackend`: certs-folder creation,
//! artifact discovery by regex, and zipping discovered artifacts into
//! `out/{code}_{platform}_{epochmillis}.zip`.

use std::io::Write;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::BuildError;
use crate::pipeline::PipelineContext;

/// Ensure `certs/` exists in the workspace and return its path.
pub fn ensure_certs_dir(ctx: &PipelineContext<'_>) -> Result<PathBuf, BuildError> {
    let dir = ctx.workspace.certs_dir();
    std::fs::create_dir_all(&dir).map_err(|e| BuildError::from_stage("build", e))?;
    Ok(dir)
}

/// Recursively collect every file under `root` whose path (relative to
/// `root`, with platform separators normalized to `/`) matches `pattern`.
pub fn find_artifacts(root: &Path, pattern: &Regex) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if pattern.is_match(&rel_str) {
            found.push(entry.path().to_path_buf());
        }
    }
    found
}

/// Zip the given artifact files (flattened to their basenames) into
/// `out/{code}_{platform}_{epochmillis}.zip`, failing with a user-visible
/// error if `artifacts` is empty.
pub fn pack_artifacts(
    ctx: &PipelineContext<'_>,
    artifacts: &[PathBuf],
    epoch_millis: u64,
) -> Result<PathBuf, BuildError> {
    if artifacts.is_empty() {
        return Err(BuildError::new(
            "no build artifacts found to pack",
            "The build completed but produced no recognizable output artifact.",
        ));
    }

    std::fs::create_dir_all(ctx.workspace.out_dir())
        .map_err(|e| BuildError::from_stage("pack", e))?;
    let zip_path = ctx.workspace.out_dir().join(format!(
        "{}_{}_{}.zip",
        ctx.job.code.as_str(),
        ctx.job.platform.as_str(),
        epoch_millis
    ));

    let file = std::fs::File::create(&zip_path).map_err(|e| BuildError::from_stage("pack", e))?;
    let mut zip = zip::ZipWriter::new(file);
    let opts = zip::write::SimpleFileOptions::default();

    for artifact in artifacts {
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BuildError::uniform("artifact path has no file name"))?;
        zip.start_file(name, opts)
            .map_err(|e| BuildError::from_stage("pack", e))?;
        let bytes = std::fs::read(artifact).map_err(|e| BuildError::from_stage("pack", e))?;
        zip.write_all(&bytes)
            .map_err(|e| BuildError::from_stage("pack", e))?;
    }
    zip.finish().map_err(|e| BuildError::from_stage("pack", e))?;
    Ok(zip_path)
}

#[cfg(test)]
#[path = "shared_tests.rs"]
mod tests;

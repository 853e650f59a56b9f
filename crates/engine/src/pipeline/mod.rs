// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The five-stage build pipeline run by the build child: init, create,
//! prepare, build, pack. Each stage is an ordinary async function
//! returning `Result<_, BuildError>` — the source's per-stage callback
//! chains collapse into sequential statements here.

pub mod create;
pub mod init;
pub mod prepare;

use std::path::{Path, PathBuf};

use farm_core::{Job, WorkspaceLayout};

use crate::error::BuildError;
use crate::platform::PlatformBackend;

/// Everything a pipeline stage needs that isn't already reachable from
/// `job`/`workspace`: the one-shot config root (for relative resource
/// paths) and the shared dependency-cache root the Updater maintains.
pub struct PipelineContext<'a> {
    pub job: &'a Job,
    pub workspace: &'a WorkspaceLayout,
    pub config_root: Option<&'a Path>,
    pub data_root: &'a Path,
}

impl<'a> PipelineContext<'a> {
    /// `data/libs/cordova-lib@{lib_version}`, the native-lib install the
    /// init stage ensures exists before project creation.
    pub fn lib_dir(&self) -> PathBuf {
        self.data_root
            .join("libs")
            .join(format!("cordova-lib@{}", self.job.lib_version))
    }
}

/// Run all five stages for `ctx` against the given platform backend.
/// Returns the path of the single artifact ZIP `pack()` produced.
pub async fn run(ctx: &PipelineContext<'_>, backend: &dyn PlatformBackend) -> Result<PathBuf, BuildError> {
    ctx.workspace
        .ensure_dirs()
        .map_err(|e| BuildError::from_stage("init", e))?;

    init::run(ctx).await?;
    create::run(ctx).await?;
    prepare::run(ctx).await?;

    let descriptor = backend.build_json(ctx).await?;
    backend.build(ctx, &descriptor).await?;
    backend.pack(ctx).await
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

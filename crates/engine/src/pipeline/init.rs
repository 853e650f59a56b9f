// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage 1: fetch `config.xml`/`source.zip` and ensure the job's
//! `cordova-lib` version is importable, installing it via the host package
//! manager if not.

use std::path::Path;

use farm_adapters::subprocess::{run_with_timeout, PACKAGE_MANAGER_TIMEOUT};
use tokio::process::Command;

use super::PipelineContext;
use crate::error::BuildError;
use crate::fetch::fetch_resource;

pub async fn run(ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    fetch_resource(
        &ctx.job.config,
        ctx.config_root,
        &ctx.workspace.config_xml(),
    )
    .await?;
    fetch_resource(
        &ctx.job.source,
        ctx.config_root,
        &ctx.workspace.source_zip(),
    )
    .await?;
    ensure_lib_installed(ctx).await
}

fn is_importable(lib_dir: &Path) -> bool {
    lib_dir
        .join("node_modules")
        .join("cordova-lib")
        .join("package.json")
        .exists()
}

async fn ensure_lib_installed(ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    let lib_dir = ctx.lib_dir();
    if is_importable(&lib_dir) {
        return Ok(());
    }

    tracing::info!(lib_version = %ctx.job.lib_version, "cordova-lib not cached, installing");
    tokio::fs::create_dir_all(&lib_dir)
        .await
        .map_err(|e| BuildError::from_stage("init", e))?;

    let mut cmd = Command::new("npm");
    cmd.arg("install")
        .arg(format!("cordova-lib@{}", ctx.job.lib_version))
        .current_dir(&lib_dir);

    let output = run_with_timeout(cmd, PACKAGE_MANAGER_TIMEOUT, "installing cordova-lib")
        .await
        .map_err(|e| {
            BuildError::new(e, "Failed to install the native build library.")
        })?;

    if !output.status.success() {
        return Err(BuildError::new(
            format!(
                "npm install cordova-lib@{} exited with {:?}: {}",
                ctx.job.lib_version,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            ),
            "Failed to install the native build library.",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ubuntu backend: runs `debuild` and packs the resulting `.deb`. Ubuntu
//! jobs have no signing variant.

use std::path::PathBuf;

use async_trait::async_trait;
use farm_adapters::subprocess::NATIVE_TOOL_TIMEOUT;
use regex::Regex;

use super::shared::{find_artifacts, pack_artifacts};
use super::{BuildDescriptor, PlatformBackend};
use crate::error::BuildError;
use crate::logging::run_logged;
use crate::pipeline::PipelineContext;

pub struct UbuntuBackend;

#[async_trait]
impl PlatformBackend for UbuntuBackend {
    async fn build_json(&self, ctx: &PipelineContext<'_>) -> Result<BuildDescriptor, BuildError> {
        // Ubuntu has no signing descriptor; write an empty marker so
        // `build()` still has a uniform path to report back.
        let path = ctx.workspace.workspace_dir().join("build.json");
        std::fs::write(&path, "{}").map_err(|e| BuildError::from_stage("build", e))?;
        Ok(BuildDescriptor { path })
    }

    async fn build(
        &self,
        ctx: &PipelineContext<'_>,
        _descriptor: &BuildDescriptor,
    ) -> Result<(), BuildError> {
        let workspace_dir = ctx.workspace.workspace_dir().join("platforms/ubuntu");
        let log_path = ctx.workspace.cordova_log();
        run_logged(
            std::path::Path::new("debuild"),
            &["-i", "-us", "-uc", "-b"],
            &workspace_dir,
            &log_path,
            NATIVE_TOOL_TIMEOUT,
            "running debuild",
        )
        .await
    }

    async fn pack(&self, ctx: &PipelineContext<'_>) -> Result<PathBuf, BuildError> {
        let pattern = Regex::new(r"\.deb$")
            .map_err(|e| BuildError::uniform(format!("invalid artifact regex: {e}")))?;
        let artifacts = find_artifacts(&ctx.workspace.workspace_dir().join("platforms/ubuntu"), &pattern);
        let epoch_millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        pack_artifacts(ctx, &artifacts, epoch_millis)
    }
}

#[cfg(test)]
#[path = "ubuntu_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Windows backend: rejects overlong project names, optionally imports a
//! PFX via `certutil`, builds release for x86/x64/arm, and always removes
//! the imported certificate afterward.

use std::path::PathBuf;

use async_trait::async_trait;
use farm_adapters::subprocess::{SHORT_COMMAND_TIMEOUT, NATIVE_TOOL_TIMEOUT};
use farm_core::SigningKey;
use regex::Regex;
use serde_json::json;

use super::shared::{ensure_certs_dir, find_artifacts, pack_artifacts};
use super::{BuildDescriptor, PlatformBackend};
use crate::error::BuildError;
use crate::fetch::fetch_resource;
use crate::logging::{run_logged, run_logged_capture};
use crate::pipeline::PipelineContext;

/// cordova-windows rejects project names past this length.
const MAX_PROJECT_NAME_LEN: usize = 40;

const ARCHITECTURES: &[&str] = &["x86", "x64", "arm"];

pub struct WindowsBackend;

#[async_trait]
impl PlatformBackend for WindowsBackend {
    async fn build_json(&self, ctx: &PipelineContext<'_>) -> Result<BuildDescriptor, BuildError> {
        if ctx.job.code.as_str().len() > MAX_PROJECT_NAME_LEN {
            return Err(BuildError::new(
                format!(
                    "project name '{}' is {} characters, exceeds the {}-character limit",
                    ctx.job.code.as_str(),
                    ctx.job.code.as_str().len(),
                    MAX_PROJECT_NAME_LEN
                ),
                format!(
                    "Windows compilations can't have names longer than {MAX_PROJECT_NAME_LEN} characters. Choose a shorter name."
                ),
            ));
        }

        let descriptor = if let Some(SigningKey::Windows {
            pfx_url,
            thumbprint,
            publisher,
        }) = &ctx.job.key
        {
            let certs_dir = ensure_certs_dir(ctx)?;
            let pfx_path = certs_dir.join("release.pfx");
            fetch_resource(pfx_url, ctx.config_root, &pfx_path).await?;
            import_certificate(&pfx_path, ctx).await?;

            json!({
                "windows": {
                    "release": {
                        "thumbprint": thumbprint,
                        "publisherId": publisher,
                    }
                }
            })
        } else {
            json!({})
        };

        let path = ctx.workspace.workspace_dir().join("build.json");
        std::fs::write(&path, descriptor.to_string())
            .map_err(|e| BuildError::from_stage("build", e))?;
        Ok(BuildDescriptor { path })
    }

    async fn build(
        &self,
        ctx: &PipelineContext<'_>,
        descriptor: &BuildDescriptor,
    ) -> Result<(), BuildError> {
        let cordova_bin = ctx.lib_dir().join("node_modules/.bin/cordova");
        let workspace_dir = ctx.workspace.workspace_dir();
        let log_path = ctx.workspace.cordova_log();

        for arch in ARCHITECTURES {
            let args = vec![
                "build".to_string(),
                "windows".to_string(),
                "--release".to_string(),
                format!("--archs={arch}"),
                "--buildConfig".to_string(),
                descriptor.path.to_string_lossy().into_owned(),
            ];
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            run_logged(
                &cordova_bin,
                &arg_refs,
                &workspace_dir,
                &log_path,
                NATIVE_TOOL_TIMEOUT,
                &format!("building Windows project ({arch})"),
            )
            .await?;
        }

        if let Some(SigningKey::Windows { thumbprint, .. }) = &ctx.job.key {
            remove_certificate(thumbprint, &log_path).await?;
        }
        Ok(())
    }

    async fn pack(&self, ctx: &PipelineContext<'_>) -> Result<PathBuf, BuildError> {
        let pattern = Regex::new(r"\.(appx|msix|appxbundle)$")
            .map_err(|e| BuildError::uniform(format!("invalid artifact regex: {e}")))?;
        let artifacts = find_artifacts(
            &ctx.workspace.workspace_dir().join("platforms/windows/AppPackages"),
            &pattern,
        );
        let epoch_millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        pack_artifacts(ctx, &artifacts, epoch_millis)
    }
}

async fn import_certificate(pfx_path: &std::path::Path, ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    let log_path = ctx.workspace.cordova_log();
    run_logged(
        std::path::Path::new("certutil"),
        &["-f", "-importpfx", &pfx_path.to_string_lossy()],
        ctx.workspace.workspace_dir().as_path(),
        &log_path,
        SHORT_COMMAND_TIMEOUT,
        "importing signing certificate",
    )
    .await
}

/// Removal always runs, even if the build itself failed; callers invoke
/// this from their own cleanup path as needed. Failures here are logged
/// but do not themselves fail the pipeline (the build has either already
/// succeeded or already failed for another reason).
async fn remove_certificate(thumbprint: &str, log_path: &std::path::Path) -> Result<(), BuildError> {
    let cwd = std::env::temp_dir();
    if let Err(e) = run_logged_capture(
        std::path::Path::new("certutil"),
        &["-delstore", "my", thumbprint],
        &cwd,
        log_path,
        SHORT_COMMAND_TIMEOUT,
        "removing imported signing certificate",
    )
    .await
    {
        tracing::warn!(error = %e, "failed to remove imported Windows signing certificate");
    }
    Ok(())
}

#[cfg(test)]
#[path = "windows_tests.rs"]
mod tests;

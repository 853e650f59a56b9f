// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Android backend: accepts SDK licenses, optionally downloads a keystore,
//! runs one or two Gradle builds depending on signing, and packs the
//! resulting APK(s).

use std::path::PathBuf;

use async_trait::async_trait;
use farm_adapters::subprocess::NATIVE_TOOL_TIMEOUT;
use farm_core::SigningKey;
use regex::Regex;
use serde_json::json;

use super::shared::{ensure_certs_dir, find_artifacts, pack_artifacts};
use super::{BuildDescriptor, PlatformBackend};
use crate::env::android_sdk_root;
use crate::error::BuildError;
use crate::fetch::fetch_resource;
use crate::logging::run_logged;
use crate::pipeline::PipelineContext;

/// SDK license hashes accepted on every Android build, matching the
/// hashes `sdkmanager --licenses` writes after an interactive accept.
const SDK_LICENSE_HASHES: &[(&str, &str)] = &[
    ("android-sdk-license", "24333f8a63b6825ea9c5514f83c2829b004d1fee"),
    (
        "android-sdk-preview-license",
        "84831b9409646a918e30573bab4c9c91346d8abd",
    ),
];

pub struct AndroidBackend;

#[async_trait]
impl PlatformBackend for AndroidBackend {
    async fn build_json(&self, ctx: &PipelineContext<'_>) -> Result<BuildDescriptor, BuildError> {
        accept_sdk_licenses()?;

        let descriptor = if let Some(SigningKey::Android {
            keystore_url,
            alias,
            store_password,
            key_password,
        }) = &ctx.job.key
        {
            let certs_dir = ensure_certs_dir(ctx)?;
            let keystore_path = certs_dir.join("release.keystore");
            fetch_resource(keystore_url, ctx.config_root, &keystore_path).await?;

            json!({
                "android": {
                    "release": {
                        "keystore": keystore_path,
                        "storePassword": store_password,
                        "alias": alias,
                        "password": key_password,
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
        let log_path = ctx.workspace.cordova_log();
        let workspace_dir = ctx.workspace.workspace_dir();

        let mut base_args = vec!["build".to_string(), "android".to_string()];
        if descriptor.path.exists() {
            base_args.push("--buildConfig".to_string());
            base_args.push(descriptor.path.to_string_lossy().into_owned());
        }

        if ctx.job.key.is_some() {
            let mut args = base_args.clone();
            args.push("--release".to_string());
            run_build(&cordova_bin, &args, &workspace_dir, &log_path).await?;
        } else {
            run_build(&cordova_bin, &base_args, &workspace_dir, &log_path).await?;

            let mut release_args = base_args;
            release_args.push("--release".to_string());
            run_build(&cordova_bin, &release_args, &workspace_dir, &log_path).await?;
        }
        Ok(())
    }

    async fn pack(&self, ctx: &PipelineContext<'_>) -> Result<PathBuf, BuildError> {
        let pattern = Regex::new(r"outputs/apk/.*\.apk$")
            .map_err(|e| BuildError::uniform(format!("invalid artifact regex: {e}")))?;
        let artifacts = find_artifacts(
            &ctx.workspace
                .workspace_dir()
                .join("platforms/android/app/build"),
            &pattern,
        );
        let epoch_millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        pack_artifacts(ctx, &artifacts, epoch_millis)
    }
}

async fn run_build(
    cordova_bin: &std::path::Path,
    args: &[String],
    cwd: &std::path::Path,
    log_path: &std::path::Path,
) -> Result<(), BuildError> {
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    run_logged(
        cordova_bin,
        &arg_refs,
        cwd,
        log_path,
        NATIVE_TOOL_TIMEOUT,
        "building Android project",
    )
    .await
}

fn accept_sdk_licenses() -> Result<(), BuildError> {
    let licenses_dir = android_sdk_root().join("licenses");
    std::fs::create_dir_all(&licenses_dir).map_err(|e| BuildError::from_stage("build", e))?;
    for (name, hash) in SDK_LICENSE_HASHES {
        std::fs::write(licenses_dir.join(name), format!("{hash}\n"))
            .map_err(|e| BuildError::from_stage("build", e))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "android_tests.rs"]
mod tests;

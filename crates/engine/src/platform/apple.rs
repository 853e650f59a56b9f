// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared iOS/OSX backend: dedicated per-build keychain, p12 import,
//! provisioning-profile install keyed by its UUID, archive + export, and
//! a cleanup step that always runs (profile uninstall + keychain delete)
//! regardless of how the build stage exited.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use farm_adapters::subprocess::{NATIVE_TOOL_TIMEOUT, SHORT_COMMAND_TIMEOUT};
use farm_core::SigningKey;
use regex::Regex;
use serde_json::json;

use super::shared::{ensure_certs_dir, find_artifacts, pack_artifacts};
use super::{BuildDescriptor, PlatformBackend};
use crate::error::BuildError;
use crate::fetch::fetch_resource;
use crate::logging::{run_logged, run_logged_capture};
use crate::pipeline::PipelineContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppleVariant {
    Ios,
    Osx,
}

pub struct AppleBackend {
    variant: AppleVariant,
}

impl AppleBackend {
    pub fn ios() -> Self {
        Self { variant: AppleVariant::Ios }
    }

    pub fn osx() -> Self {
        Self { variant: AppleVariant::Osx }
    }

    fn keychain_name(&self, ctx: &PipelineContext<'_>) -> String {
        format!("build-{}.keychain", ctx.job.code.as_str())
    }
}

#[async_trait]
impl PlatformBackend for AppleBackend {
    async fn build_json(&self, ctx: &PipelineContext<'_>) -> Result<BuildDescriptor, BuildError> {
        let descriptor = if let Some(SigningKey::Apple { .. }) = &ctx.job.key {
            json!({ ctx.job.platform.as_str(): { "release": { "codeSignIdentity": "iPhone Distribution" } } })
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
        let keychain = self.keychain_name(ctx);
        let mut profile_uuid: Option<String> = None;

        let result = self.build_signed(ctx, descriptor, &keychain, &mut profile_uuid).await;
        let cleanup_result = self.cleanup(ctx, &keychain, profile_uuid.as_deref()).await;

        match (result, cleanup_result) {
            (Err(e), _) => Err(e),
            (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    async fn pack(&self, ctx: &PipelineContext<'_>) -> Result<PathBuf, BuildError> {
        let pattern = match self.variant {
            AppleVariant::Ios => Regex::new(r"\.ipa$"),
            AppleVariant::Osx => Regex::new(r"\.(app|pkg)$"),
        }
        .map_err(|e| BuildError::uniform(format!("invalid artifact regex: {e}")))?;

        let search_root = ctx.workspace.workspace_dir().join(format!(
            "platforms/{}/build",
            if self.variant == AppleVariant::Ios { "ios" } else { "osx" }
        ));
        let artifacts = find_artifacts(&search_root, &pattern);
        let epoch_millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        pack_artifacts(ctx, &artifacts, epoch_millis)
    }

    fn create_app_command(&self, ctx: &PipelineContext<'_>) -> Option<String> {
        Some(format!(
            "security create-keychain -p build {}",
            self.keychain_name(ctx)
        ))
    }

    fn find_identity_command(&self) -> Option<&'static str> {
        Some("security find-identity -v -p codesigning")
    }
}

impl AppleBackend {
    async fn build_signed(
        &self,
        ctx: &PipelineContext<'_>,
        descriptor: &BuildDescriptor,
        keychain: &str,
        profile_uuid: &mut Option<String>,
    ) -> Result<(), BuildError> {
        let log_path = ctx.workspace.cordova_log();
        let workspace_dir = ctx.workspace.workspace_dir();

        if let Some(SigningKey::Apple { p12_url, provisioning_profile_url, password }) = &ctx.job.key {
            let create_cmd = self
                .create_app_command(ctx)
                .ok_or_else(|| BuildError::uniform("Apple backend missing create_app_command"))?;
            run_shell(&create_cmd, &workspace_dir, &log_path, SHORT_COMMAND_TIMEOUT, "creating build keychain").await?;

            let certs_dir = ensure_certs_dir(ctx)?;
            let p12_path = certs_dir.join("release.p12");
            fetch_resource(p12_url, ctx.config_root, &p12_path).await?;
            import_p12(&p12_path, password, keychain, &workspace_dir, &log_path).await?;

            let profile_path = certs_dir.join("profile.mobileprovision");
            fetch_resource(provisioning_profile_url, ctx.config_root, &profile_path).await?;
            let uuid = extract_profile_uuid(&profile_path, &workspace_dir, &log_path).await?;
            install_profile(&profile_path, &uuid, &workspace_dir, &log_path).await?;
            *profile_uuid = Some(uuid);

            write_build_scheme(&workspace_dir, ctx.job.code.as_str())?;
            disable_code_signing_in_xcconfigs(&workspace_dir)?;
        }

        run_archive(ctx, &workspace_dir, &log_path).await?;
        run_export(self.variant, ctx, descriptor, &workspace_dir, &log_path).await
    }

    async fn cleanup(
        &self,
        ctx: &PipelineContext<'_>,
        keychain: &str,
        profile_uuid: Option<&str>,
    ) -> Result<(), BuildError> {
        if ctx.job.key.is_none() {
            return Ok(());
        }
        let log_path = ctx.workspace.cordova_log();
        let cwd = ctx.workspace.workspace_dir();

        if let Some(uuid) = profile_uuid {
            if let Err(e) = uninstall_profile(uuid, &cwd, &log_path).await {
                tracing::warn!(error = %e, "failed to uninstall provisioning profile");
            }
        }
        if let Err(e) = delete_keychain(keychain, &cwd, &log_path).await {
            tracing::warn!(error = %e, "failed to delete build keychain");
        }
        Ok(())
    }
}

async fn run_shell(
    command: &str,
    cwd: &Path,
    log_path: &Path,
    timeout: std::time::Duration,
    description: &str,
) -> Result<(), BuildError> {
    run_logged(
        Path::new("sh"),
        &["-c", command],
        cwd,
        log_path,
        timeout,
        description,
    )
    .await
}

async fn import_p12(
    p12_path: &Path,
    password: &str,
    keychain: &str,
    cwd: &Path,
    log_path: &Path,
) -> Result<(), BuildError> {
    run_logged(
        Path::new("security"),
        &[
            "import",
            &p12_path.to_string_lossy(),
            "-k",
            keychain,
            "-P",
            password,
            "-T",
            "/usr/bin/codesign",
        ],
        cwd,
        log_path,
        SHORT_COMMAND_TIMEOUT,
        "importing signing identity",
    )
    .await
}

/// Equivalent of `security cms -D -i profile | grep UUID -A1 | grep -io
/// '[-A-Z0-9]{36}'`: decode the profile's embedded plist and extract the
/// `UUID` key's value.
async fn extract_profile_uuid(profile_path: &Path, cwd: &Path, log_path: &Path) -> Result<String, BuildError> {
    let output = run_logged_capture(
        Path::new("security"),
        &["cms", "-D", "-i", &profile_path.to_string_lossy()],
        cwd,
        log_path,
        SHORT_COMMAND_TIMEOUT,
        "decoding provisioning profile",
    )
    .await?;

    let decoded = String::from_utf8_lossy(&output.stdout);
    find_uuid_in_decoded_profile(&decoded).ok_or_else(|| {
        BuildError::new(
            "provisioning profile decode did not contain a UUID",
            "The provided provisioning profile could not be read.",
        )
    })
}

/// Pure extraction step, split out from [`extract_profile_uuid`] so it can
/// be tested without shelling out to `security`.
fn find_uuid_in_decoded_profile(decoded: &str) -> Option<String> {
    let pattern = Regex::new(r"(?is)<key>UUID</key>\s*<string>([-A-Za-z0-9]{36})</string>").ok()?;
    pattern
        .captures(decoded)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

async fn install_profile(profile_path: &Path, uuid: &str, cwd: &Path, log_path: &Path) -> Result<(), BuildError> {
    let Some(home) = dirs::home_dir() else {
        return Err(BuildError::uniform("could not determine home directory for profile install"));
    };
    let dest_dir = home.join("Library/MobileDevice/Provisioning Profiles");
    std::fs::create_dir_all(&dest_dir).map_err(|e| BuildError::from_stage("build", e))?;
    let dest = dest_dir.join(format!("{uuid}.mobileprovision"));
    std::fs::copy(profile_path, &dest).map_err(|e| BuildError::from_stage("build", e))?;
    let _ = (cwd, log_path);
    Ok(())
}

async fn uninstall_profile(uuid: &str, _cwd: &Path, _log_path: &Path) -> Result<(), BuildError> {
    let Some(home) = dirs::home_dir() else {
        return Ok(());
    };
    let path = home
        .join("Library/MobileDevice/Provisioning Profiles")
        .join(format!("{uuid}.mobileprovision"));
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| BuildError::from_stage("build", e))?;
    }
    Ok(())
}

async fn delete_keychain(keychain: &str, cwd: &Path, log_path: &Path) -> Result<(), BuildError> {
    run_logged(
        Path::new("security"),
        &["delete-keychain", keychain],
        cwd,
        log_path,
        SHORT_COMMAND_TIMEOUT,
        "deleting build keychain",
    )
    .await
}

/// Write a minimal Xcode shared scheme so `xcodebuild archive` can target
/// it without relying on an auto-generated scheme (which Xcode only
/// creates once, interactively, on first project open).
fn write_build_scheme(workspace_dir: &Path, code: &str) -> Result<(), BuildError> {
    let scheme_dir = workspace_dir
        .join("platforms/ios")
        .join(format!("{code}.xcodeproj/xcshareddata/xcschemes"));
    std::fs::create_dir_all(&scheme_dir).map_err(|e| BuildError::from_stage("build", e))?;
    let scheme = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Scheme LastUpgradeVersion="1500" version="1.3">
  <BuildAction><BuildActionEntries>
    <BuildActionEntry><BuildableReference BlueprintName="{code}"/></BuildActionEntry>
  </BuildActionEntries></BuildAction>
  <ArchiveAction buildConfiguration="Release" revealArchiveInOrganizer="YES"/>
</Scheme>
"#
    );
    std::fs::write(scheme_dir.join(format!("{code}.xcscheme")), scheme)
        .map_err(|e| BuildError::from_stage("build", e))?;
    Ok(())
}

/// Disable code-signing in every `.xcconfig` under the project so
/// `xcodebuild archive` doesn't require the keychain during the archive
/// phase (signing happens at export time instead).
fn disable_code_signing_in_xcconfigs(workspace_dir: &Path) -> Result<(), BuildError> {
    for entry in walkdir::WalkDir::new(workspace_dir)
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("xcconfig")
        {
            let mut contents =
                std::fs::read_to_string(entry.path()).map_err(|e| BuildError::from_stage("build", e))?;
            contents.push_str("\nCODE_SIGNING_REQUIRED = NO\nCODE_SIGNING_ALLOWED = NO\n");
            std::fs::write(entry.path(), contents).map_err(|e| BuildError::from_stage("build", e))?;
        }
    }
    Ok(())
}

async fn run_archive(ctx: &PipelineContext<'_>, workspace_dir: &Path, log_path: &Path) -> Result<(), BuildError> {
    let cordova_bin = ctx.lib_dir().join("node_modules/.bin/cordova");
    run_logged(
        &cordova_bin,
        &["build", ctx.job.platform.as_str(), "--release", "--archive"],
        workspace_dir,
        log_path,
        NATIVE_TOOL_TIMEOUT,
        "archiving Apple project",
    )
    .await
}

async fn run_export(
    variant: AppleVariant,
    ctx: &PipelineContext<'_>,
    descriptor: &BuildDescriptor,
    workspace_dir: &Path,
    log_path: &Path,
) -> Result<(), BuildError> {
    match variant {
        AppleVariant::Ios => {
            let options_plist = workspace_dir.join("export_options.plist");
            write_export_options_plist(&options_plist, ctx)?;
            run_logged(
                Path::new("xcodebuild"),
                &[
                    "-exportArchive",
                    "-exportOptionsPlist",
                    &options_plist.to_string_lossy(),
                ],
                workspace_dir,
                log_path,
                NATIVE_TOOL_TIMEOUT,
                "exporting iOS archive",
            )
            .await
        }
        AppleVariant::Osx => {
            let _ = descriptor;
            run_logged(
                Path::new("productbuild"),
                &["--component", "build/Release", "/Applications"],
                workspace_dir,
                log_path,
                NATIVE_TOOL_TIMEOUT,
                "packaging OSX product",
            )
            .await
        }
    }
}

fn write_export_options_plist(path: &Path, ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    let method = if ctx.job.key.is_some() { "app-store" } else { "development" };
    let plist = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>method</key>
  <string>{method}</string>
</dict>
</plist>
"#
    );
    std::fs::write(path, plist).map_err(|e| BuildError::from_stage("build", e))
}

#[cfg(test)]
#[path = "apple_tests.rs"]
mod tests;

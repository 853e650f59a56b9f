// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage 2: create the native project, unpack the job's source ZIP, and
//! place the application's web root, hooks, node_modules, icons, and
//! splashes into the workspace.

use std::path::{Path, PathBuf};

use farm_adapters::subprocess::{run_with_timeout, NATIVE_TOOL_TIMEOUT};
use quick_xml::events::Event as XmlEvent;
use quick_xml::reader::Reader;
use tokio::process::Command;

use super::PipelineContext;
use crate::error::BuildError;
use crate::fetch::fetch_resource;

pub async fn run(ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    create_project(ctx).await?;
    copy_config_xml(ctx)?;
    extract_sources(ctx)?;

    let web_root = locate_web_root(&ctx.workspace.tmp_dir())?;
    copy_tree(&web_root, &ctx.workspace.workspace_dir().join("www"))?;
    copy_optional_subtree(
        &ctx.workspace.tmp_dir().join("hooks"),
        &ctx.workspace.workspace_dir().join("hooks"),
    )?;
    copy_optional_subtree(
        &ctx.workspace.tmp_dir().join("node_modules"),
        &ctx.workspace.workspace_dir().join("node_modules"),
    )?;
    copy_icon_splash_refs(ctx)?;
    fetch_icons_and_splashes(ctx).await?;
    Ok(())
}

async fn create_project(ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    let cordova_bin = ctx.lib_dir().join("node_modules/.bin/cordova");
    let mut cmd = Command::new(cordova_bin);
    cmd.arg("create")
        .arg(ctx.workspace.workspace_dir())
        .arg(ctx.job.code.as_str());

    let output = run_with_timeout(cmd, NATIVE_TOOL_TIMEOUT, "creating native project")
        .await
        .map_err(|e| BuildError::new(e, "Failed to create the native project."))?;

    if !output.status.success() {
        return Err(BuildError::new(
            format!(
                "cordova create exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            ),
            "Failed to create the native project.",
        ));
    }
    Ok(())
}

fn copy_config_xml(ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    std::fs::copy(
        ctx.workspace.config_xml(),
        ctx.workspace.workspace_dir().join("config.xml"),
    )
    .map_err(|e| BuildError::from_stage("create", e))?;
    Ok(())
}

/// Extract `source.zip` into `tmp/`, rejecting any entry whose normalized
/// path would escape the destination (zip-slip).
fn extract_sources(ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    let file = std::fs::File::open(ctx.workspace.source_zip())
        .map_err(|e| BuildError::from_stage("create", e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| BuildError::from_stage("create", e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| BuildError::from_stage("create", e))?;
        let Some(enclosed) = entry.enclosed_name() else {
            tracing::warn!(name = entry.name(), "skipping unsafe zip entry path");
            continue;
        };
        let dest = ctx.workspace.tmp_dir().join(enclosed);
        if entry.is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| BuildError::from_stage("create", e))?;
        } else {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BuildError::from_stage("create", e))?;
            }
            let mut out =
                std::fs::File::create(&dest).map_err(|e| BuildError::from_stage("create", e))?;
            std::io::copy(&mut entry, &mut out).map_err(|e| BuildError::from_stage("create", e))?;
        }
    }
    Ok(())
}

/// Find the directory containing `index.html*` anywhere under `root`; the
/// application's web root is that entry's parent directory.
fn locate_web_root(root: &Path) -> Result<PathBuf, BuildError> {
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with("index.html") {
            return entry
                .path()
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| BuildError::uniform("index.html has no parent directory"));
        }
    }
    Err(BuildError::new(
        "no index.html* found in extracted sources",
        "The project sources do not contain a web entry point (index.html).",
    ))
}

fn copy_tree(src: &Path, dest: &Path) -> Result<(), BuildError> {
    std::fs::create_dir_all(dest).map_err(|e| BuildError::from_stage("create", e))?;
    for entry in walkdir::WalkDir::new(src).into_iter().filter_map(Result::ok) {
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BuildError::from_stage("create", e))?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| BuildError::from_stage("create", e))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| BuildError::from_stage("create", e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| BuildError::from_stage("create", e))?;
        }
    }
    Ok(())
}

fn copy_optional_subtree(src: &Path, dest: &Path) -> Result<(), BuildError> {
    if src.exists() {
        copy_tree(src, dest)?;
    }
    Ok(())
}

/// Parse `config.xml` for `<icon src="...">`/`<splash src="...">`
/// elements, copying each referenced file (relative to the extracted
/// source tree) into the workspace so the native build sees it.
fn copy_icon_splash_refs(ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    let xml_path = ctx.workspace.workspace_dir().join("config.xml");
    let xml = std::fs::read_to_string(&xml_path).map_err(|e| BuildError::from_stage("create", e))?;
    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(XmlEvent::Eof) => break,
            Ok(XmlEvent::Start(e)) | Ok(XmlEvent::Empty(e)) => {
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref()).unwrap_or("");
                if name != "icon" && name != "splash" {
                    continue;
                }
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() != b"src" {
                        continue;
                    }
                    let src_rel = attr
                        .decode_and_unescape_value(reader.decoder())
                        .map_err(|e| BuildError::from_stage("create", e))?;
                    let src_path = ctx.workspace.tmp_dir().join(src_rel.as_ref());
                    if !src_path.exists() {
                        continue;
                    }
                    let dest = ctx.workspace.workspace_dir().join(src_rel.as_ref());
                    if let Some(parent) = dest.parent() {
                        std::fs::create_dir_all(parent)
                            .map_err(|e| BuildError::from_stage("create", e))?;
                    }
                    std::fs::copy(&src_path, &dest)
                        .map_err(|e| BuildError::from_stage("create", e))?;
                }
            }
            Ok(_) => {}
            Err(e) => return Err(BuildError::from_stage("create", e)),
        }
    }
    Ok(())
}

async fn fetch_icons_and_splashes(ctx: &PipelineContext<'_>) -> Result<(), BuildError> {
    if let Some(icon_url) = &ctx.job.icon_url {
        let dest = ctx.workspace.icons_dir().join("icon.png");
        fetch_resource(icon_url, ctx.config_root, &dest).await?;
    }
    if let Some(splash_url) = &ctx.job.splash_url {
        let dest = ctx.workspace.splashes_dir().join("splash.png");
        fetch_resource(splash_url, ctx.config_root, &dest).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;

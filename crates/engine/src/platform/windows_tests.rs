// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use farm_core::{Job, JobId, WorkspaceId, WorkspaceLayout};
use tempfile::tempdir;

fn job_with_code(code: &str) -> Job {
    Job {
        code: JobId::new(code),
        starttime: 0,
        platform: farm_core::PlatformKind::Windows,
        key: None,
        icon_url: None,
        splash_url: None,
        config: "config.xml".into(),
        source: "src.zip".into(),
        lib_version: "8.0.0".into(),
    }
}

#[tokio::test]
async fn build_json_rejects_overlong_project_name() {
    let projects_root = tempdir().unwrap();
    let job = job_with_code(&"a".repeat(41));
    let id = WorkspaceId::for_job(&job.code, job.starttime);
    let workspace = WorkspaceLayout::new(projects_root.path(), &id);
    workspace.ensure_dirs().unwrap();
    let data_root = tempdir().unwrap();
    let ctx = PipelineContext {
        job: &job,
        workspace: &workspace,
        config_root: None,
        data_root: data_root.path(),
    };

    let backend = WindowsBackend;
    let err = backend.build_json(&ctx).await.unwrap_err();
    assert!(err.msg_public.contains("40 characters"));
}

#[tokio::test]
async fn build_json_accepts_forty_character_name() {
    let projects_root = tempdir().unwrap();
    let job = job_with_code(&"a".repeat(40));
    let id = WorkspaceId::for_job(&job.code, job.starttime);
    let workspace = WorkspaceLayout::new(projects_root.path(), &id);
    workspace.ensure_dirs().unwrap();
    let data_root = tempdir().unwrap();
    let ctx = PipelineContext {
        job: &job,
        workspace: &workspace,
        config_root: None,
        data_root: data_root.path(),
    };

    let backend = WindowsBackend;
    assert!(backend.build_json(&ctx).await.is_ok());
}

#[test]
fn artifact_regex_matches_appx_variants() {
    let pattern = Regex::new(r"\.(appx|msix|appxbundle)$").unwrap();
    assert!(pattern.is_match("CordovaApp_1.0.0.0_x64.appx"));
    assert!(pattern.is_match("CordovaApp_1.0.0.0_x86.appxbundle"));
    assert!(!pattern.is_match("CordovaApp_1.0.0.0_x64.appx.map"));
}

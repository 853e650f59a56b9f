// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use farm_core::{Job, JobId, PlatformKind, WorkspaceId, WorkspaceLayout};
use tempfile::tempdir;

fn sample_job(config: String, source: String) -> Job {
    Job {
        code: JobId::new("A1"),
        starttime: 0,
        platform: PlatformKind::Android,
        key: None,
        icon_url: None,
        splash_url: None,
        config,
        source,
        lib_version: "8.0.0".into(),
    }
}

#[tokio::test]
async fn fetches_config_and_source_into_workspace() {
    let fixtures = tempdir().unwrap();
    std::fs::write(fixtures.path().join("config.xml"), b"<widget/>").unwrap();
    std::fs::write(fixtures.path().join("src.zip"), b"PK\x03\x04").unwrap();

    let data_root = tempdir().unwrap();
    let lib_dir = data_root.path().join("libs/cordova-lib@8.0.0/node_modules/cordova-lib");
    std::fs::create_dir_all(&lib_dir).unwrap();
    std::fs::write(lib_dir.join("package.json"), b"{}").unwrap();

    let projects_root = tempdir().unwrap();
    let job = sample_job("config.xml".into(), "src.zip".into());
    let id = WorkspaceId::for_job(&job.code, job.starttime);
    let workspace = WorkspaceLayout::new(projects_root.path(), &id);
    workspace.ensure_dirs().unwrap();

    let ctx = PipelineContext {
        job: &job,
        workspace: &workspace,
        config_root: Some(fixtures.path()),
        data_root: data_root.path(),
    };

    run(&ctx).await.unwrap();

    assert_eq!(std::fs::read(workspace.config_xml()).unwrap(), b"<widget/>");
    assert_eq!(std::fs::read(workspace.source_zip()).unwrap(), b"PK\x03\x04");
}

#[test]
fn is_importable_requires_package_json_present() {
    let dir = tempdir().unwrap();
    assert!(!is_importable(dir.path()));

    let lib_dir = dir.path().join("node_modules/cordova-lib");
    std::fs::create_dir_all(&lib_dir).unwrap();
    std::fs::write(lib_dir.join("package.json"), b"{}").unwrap();
    assert!(is_importable(dir.path()));
}

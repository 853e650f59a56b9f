// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use farm_core::{Job, JobId, WorkspaceId, WorkspaceLayout};
use tempfile::tempdir;

fn sample_job(key: Option<SigningKey>) -> Job {
    Job {
        code: JobId::new("A1"),
        starttime: 0,
        platform: farm_core::PlatformKind::Android,
        key,
        icon_url: None,
        splash_url: None,
        config: "config.xml".into(),
        source: "src.zip".into(),
        lib_version: "8.0.0".into(),
    }
}

#[test]
fn accept_sdk_licenses_writes_known_hashes() {
    let sdk_root = tempdir().unwrap();
    std::env::set_var("FARM_ANDROID_SDK_ROOT", sdk_root.path());

    accept_sdk_licenses().unwrap();

    let license =
        std::fs::read_to_string(sdk_root.path().join("licenses/android-sdk-license")).unwrap();
    assert!(license.contains("24333f8a63b6825ea9c5514f83c2829b004d1fee"));

    std::env::remove_var("FARM_ANDROID_SDK_ROOT");
}

#[tokio::test]
async fn build_json_unsigned_writes_empty_descriptor() {
    let sdk_root = tempdir().unwrap();
    std::env::set_var("FARM_ANDROID_SDK_ROOT", sdk_root.path());

    let projects_root = tempdir().unwrap();
    let job = sample_job(None);
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

    let backend = AndroidBackend;
    let descriptor = backend.build_json(&ctx).await.unwrap();
    let contents = std::fs::read_to_string(&descriptor.path).unwrap();
    assert_eq!(contents, "{}");

    std::env::remove_var("FARM_ANDROID_SDK_ROOT");
}

#[test]
fn pack_uses_expected_output_name_pattern() {
    // The packaging logic itself is covered by `shared_tests`; this just
    // confirms the APK filter regex matches a realistic Gradle path.
    let pattern = Regex::new(r"outputs/apk/.*\.apk$").unwrap();
    assert!(pattern.is_match("app/build/outputs/apk/release/app-release.apk"));
    assert!(!pattern.is_match("app/build/outputs/apk/release/output-metadata.json"));
}

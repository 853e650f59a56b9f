// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn find_uuid_in_decoded_profile_extracts_uuid() {
    let decoded = r#"
    <key>AppIDName</key>
    <string>Example</string>
    <key>UUID</key>
    <string>ABCD1234-5678-90AB-CDEF-1234567890AB</string>
    <key>TeamName</key>
    "#;
    let uuid = find_uuid_in_decoded_profile(decoded).unwrap();
    assert_eq!(uuid, "ABCD1234-5678-90AB-CDEF-1234567890AB");
}

#[test]
fn find_uuid_in_decoded_profile_returns_none_when_absent() {
    let decoded = "<key>AppIDName</key><string>Example</string>";
    assert!(find_uuid_in_decoded_profile(decoded).is_none());
}

#[test]
fn write_export_options_plist_uses_app_store_method_when_signed() {
    let dir = tempdir().unwrap();
    let job = farm_core::Job {
        code: farm_core::JobId::new("A1"),
        starttime: 0,
        platform: farm_core::PlatformKind::Ios,
        key: Some(SigningKey::Apple {
            p12_url: "file:///p.p12".into(),
            provisioning_profile_url: "file:///p.mobileprovision".into(),
            password: "pw".into(),
        }),
        icon_url: None,
        splash_url: None,
        config: "config.xml".into(),
        source: "src.zip".into(),
        lib_version: "8.0.0".into(),
    };
    let workspace = farm_core::WorkspaceLayout::new(
        dir.path(),
        &farm_core::WorkspaceId::for_job(&job.code, job.starttime),
    );
    workspace.ensure_dirs().unwrap();
    let data_root = tempdir().unwrap();
    let ctx = PipelineContext {
        job: &job,
        workspace: &workspace,
        config_root: None,
        data_root: data_root.path(),
    };

    let path = dir.path().join("export_options.plist");
    write_export_options_plist(&path, &ctx).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("app-store"));
}

#[test]
fn disable_code_signing_in_xcconfigs_appends_to_every_xcconfig() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("platforms/ios")).unwrap();
    let xcconfig = dir.path().join("platforms/ios/build.xcconfig");
    std::fs::write(&xcconfig, "SOME_SETTING = 1\n").unwrap();

    disable_code_signing_in_xcconfigs(dir.path()).unwrap();

    let contents = std::fs::read_to_string(&xcconfig).unwrap();
    assert!(contents.contains("CODE_SIGNING_REQUIRED = NO"));
    assert!(contents.contains("CODE_SIGNING_ALLOWED = NO"));
}

#[test]
fn write_build_scheme_creates_xcscheme_file() {
    let dir = tempdir().unwrap();
    write_build_scheme(dir.path(), "A1").unwrap();
    let scheme_path = dir
        .path()
        .join("platforms/ios/A1.xcodeproj/xcshareddata/xcschemes/A1.xcscheme");
    assert!(scheme_path.exists());
}

#[test]
fn create_app_command_names_the_job_specific_keychain() {
    let dir = tempdir().unwrap();
    let job = farm_core::Job {
        code: farm_core::JobId::new("A1"),
        starttime: 0,
        platform: farm_core::PlatformKind::Ios,
        key: None,
        icon_url: None,
        splash_url: None,
        config: "config.xml".into(),
        source: "src.zip".into(),
        lib_version: "8.0.0".into(),
    };
    let workspace = farm_core::WorkspaceLayout::new(
        dir.path(),
        &farm_core::WorkspaceId::for_job(&job.code, job.starttime),
    );
    let data_root = tempdir().unwrap();
    let ctx = PipelineContext {
        job: &job,
        workspace: &workspace,
        config_root: None,
        data_root: data_root.path(),
    };

    let backend = AppleBackend::ios();
    let cmd = backend.create_app_command(&ctx).unwrap();
    assert!(cmd.contains("build-A1.keychain"));
}

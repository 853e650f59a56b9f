// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use farm_core::ManifestEntry;
use std::path::Path;
use tempfile::tempdir;

fn entry(key: &str, last_modified: &str) -> ManifestEntry {
    ManifestEntry {
        key: key.to_string(),
        last_modified: last_modified.to_string(),
        etag: "etag".into(),
        size: 0,
    }
}

#[test]
fn output_dir_derives_platform_compiler_plugin_lib_and_sdk_paths() {
    let root = Path::new("/data");
    assert_eq!(
        output_dir(root, "platforms/android.tar.bz2"),
        Some(root.join("platforms/android"))
    );
    assert_eq!(
        output_dir(root, "compilers/compiler_cordova_9.0.0.tar.bz2"),
        Some(root.join("compilers/9.0.0"))
    );
    assert_eq!(
        output_dir(root, "plugins/cordova-plugin-camera.tar.bz2"),
        Some(root.join("plugins/cordova-plugin-camera"))
    );
    assert_eq!(
        output_dir(root, "libs/cordova-android-9.0.0-linux.tar.bz2"),
        Some(root.join("libs/cordova-android-9.0.0"))
    );
    assert_eq!(
        output_dir(root, "sdks/android-sdk.tar.bz2"),
        Some(root.join("sdks/android-sdk"))
    );
}

#[test]
fn output_dir_returns_none_for_an_untracked_folder() {
    assert_eq!(output_dir(Path::new("/data"), "logs/foo.tar.bz2"), None);
}

#[test]
fn is_relevant_requires_current_os_suffix_for_libs_and_sdks() {
    let matching = format!("cordova-android-9.0.0-{}.tar.bz2", os_tag());
    assert!(is_relevant(&format!("libs/{matching}")));
    assert!(!is_relevant("libs/cordova-android-9.0.0-some-other-os.tar.bz2"));
}

#[test]
fn is_relevant_is_unconditional_for_platforms_plugins_and_compilers() {
    assert!(is_relevant("platforms/android.tar.bz2"));
    assert!(is_relevant("plugins/cordova-plugin-camera.tar.bz2"));
    assert!(is_relevant("compilers/compiler_cordova_9.0.0.tar.bz2"));
}

#[test]
fn sync_status_downloads_when_no_prior_manifest_entry_exists() {
    let e = entry("platforms/android.tar.bz2", "2026-01-01T00:00:00Z");
    assert!(matches!(
        sync_status(&e, None, Path::new("/does/not/matter")),
        SyncStatus::Download
    ));
}

#[test]
fn sync_status_downloads_when_the_output_directory_is_missing() {
    let tmp = tempdir().unwrap();
    let e = entry("platforms/android.tar.bz2", "2026-01-01T00:00:00Z");
    let prior = entry("platforms/android.tar.bz2", "2026-01-01T00:00:00Z");
    let missing_dir = tmp.path().join("not-there");
    assert!(matches!(
        sync_status(&e, Some(&prior), &missing_dir),
        SyncStatus::Download
    ));
}

#[test]
fn sync_status_ignores_unchanged_entries_with_an_existing_output_dir() {
    let tmp = tempdir().unwrap();
    let e = entry("platforms/android.tar.bz2", "2026-01-01T00:00:00.123Z");
    let prior = entry("platforms/android.tar.bz2", "2026-01-01T00:00:00+00:00");
    std::fs::create_dir_all(tmp.path()).unwrap();
    assert!(matches!(
        sync_status(&e, Some(&prior), tmp.path()),
        SyncStatus::Ignore
    ));
}

#[test]
fn sync_status_downloads_when_last_modified_differs() {
    let tmp = tempdir().unwrap();
    let e = entry("platforms/android.tar.bz2", "2026-02-01T00:00:00Z");
    let prior = entry("platforms/android.tar.bz2", "2026-01-01T00:00:00Z");
    std::fs::create_dir_all(tmp.path()).unwrap();
    assert!(matches!(
        sync_status(&e, Some(&prior), tmp.path()),
        SyncStatus::Download
    ));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn is_under_pressure_is_false_for_a_normal_filesystem() {
    let dir = tempdir().unwrap();
    assert!(!is_under_pressure(dir.path()));
}

#[test]
fn is_under_pressure_true_when_min_bytes_floor_set_above_available() {
    std::env::set_var("FARM_DISK_PRESSURE_MIN_BYTES", u64::MAX.to_string());
    let dir = tempdir().unwrap();
    assert!(is_under_pressure(dir.path()));
    std::env::remove_var("FARM_DISK_PRESSURE_MIN_BYTES");
}

#[test]
fn purge_host_tmp_dirs_removes_matching_entries_only() {
    let tmp = tempdir().unwrap();
    std::env::set_var("TMPDIR", tmp.path());

    let npm_entry = tmp.path().join("npm-12345");
    std::fs::create_dir(&npm_entry).unwrap();
    let unrelated = tmp.path().join("something-else");
    std::fs::create_dir(&unrelated).unwrap();

    // std::env::temp_dir() caches nothing on most platforms but respects
    // $TMPDIR at call time on unix.
    if std::env::temp_dir() == tmp.path() {
        purge_host_tmp_dirs();
        assert!(!npm_entry.exists());
        assert!(unrelated.exists());
    }

    std::env::remove_var("TMPDIR");
}

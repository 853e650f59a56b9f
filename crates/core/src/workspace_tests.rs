// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[test]
fn workspace_id_combines_code_and_starttime() {
    let id = WorkspaceId::for_job(&JobId::new("A1"), 1_690_000_000_000);
    assert_eq!(id.as_str(), "A1_1690000000000");
}

#[test]
fn layout_derives_fixed_subpaths() {
    let root = Path::new("/var/lib/farm/projects");
    let id = WorkspaceId::for_job(&JobId::new("A1"), 1);
    let layout = WorkspaceLayout::new(root, &id);

    assert_eq!(layout.root(), Path::new("/var/lib/farm/projects/A1_1"));
    assert_eq!(
        layout.workspace_dir(),
        Path::new("/var/lib/farm/projects/A1_1/workspace")
    );
    assert_eq!(
        layout.out_dir(),
        Path::new("/var/lib/farm/projects/A1_1/out")
    );
    assert_eq!(
        layout.config_json(),
        Path::new("/var/lib/farm/projects/A1_1/config.json")
    );
}

#[test]
fn ensure_dirs_creates_fixed_subtree() {
    let tmp = tempfile::tempdir().unwrap();
    let id = WorkspaceId::for_job(&JobId::new("A1"), 1);
    let layout = WorkspaceLayout::new(tmp.path(), &id);

    layout.ensure_dirs().unwrap();

    assert!(layout.workspace_dir().is_dir());
    assert!(layout.tmp_dir().is_dir());
    assert!(layout.certs_dir().is_dir());
    assert!(layout.icons_dir().is_dir());
    assert!(layout.splashes_dir().is_dir());
    assert!(layout.out_dir().is_dir());
}

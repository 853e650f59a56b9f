// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use farm_core::{Job, JobId, PlatformKind, WorkspaceId, WorkspaceLayout};
use std::io::Write;
use tempfile::tempdir;

fn sample_job() -> Job {
    Job {
        code: JobId::new("A1"),
        starttime: 0,
        platform: PlatformKind::Android,
        key: None,
        icon_url: None,
        splash_url: None,
        config: "config.xml".into(),
        source: "src.zip".into(),
        lib_version: "8.0.0".into(),
    }
}

fn write_sample_zip(path: &Path) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let opts = zip::write::SimpleFileOptions::default();
    zip.start_file("www/index.html", opts).unwrap();
    zip.write_all(b"<html></html>").unwrap();
    zip.start_file("www/app.js", opts).unwrap();
    zip.write_all(b"console.log(1)").unwrap();
    zip.start_file("hooks/before_build.js", opts).unwrap();
    zip.write_all(b"// hook").unwrap();
    zip.finish().unwrap();
}

#[test]
fn extract_sources_unpacks_zip_into_tmp_dir() {
    let projects_root = tempdir().unwrap();
    let job = sample_job();
    let id = WorkspaceId::for_job(&job.code, job.starttime);
    let workspace = WorkspaceLayout::new(projects_root.path(), &id);
    workspace.ensure_dirs().unwrap();
    write_sample_zip(&workspace.source_zip());

    let data_root = tempdir().unwrap();
    let ctx = PipelineContext {
        job: &job,
        workspace: &workspace,
        config_root: None,
        data_root: data_root.path(),
    };

    extract_sources(&ctx).unwrap();

    assert!(workspace.tmp_dir().join("www/index.html").exists());
    assert!(workspace.tmp_dir().join("hooks/before_build.js").exists());
}

#[test]
fn locate_web_root_finds_index_html_parent() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("nested/www")).unwrap();
    std::fs::write(dir.path().join("nested/www/index.html"), b"<html/>").unwrap();

    let root = locate_web_root(dir.path()).unwrap();
    assert_eq!(root, dir.path().join("nested/www"));
}

#[test]
fn locate_web_root_errors_when_absent() {
    let dir = tempdir().unwrap();
    assert!(locate_web_root(dir.path()).is_err());
}

#[test]
fn copy_tree_preserves_relative_structure() {
    let src = tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("a/b")).unwrap();
    std::fs::write(src.path().join("a/b/file.txt"), b"hi").unwrap();

    let dest = tempdir().unwrap();
    copy_tree(src.path(), dest.path()).unwrap();

    assert_eq!(std::fs::read(dest.path().join("a/b/file.txt")).unwrap(), b"hi");
}

#[test]
fn copy_optional_subtree_is_noop_when_source_absent() {
    let src = tempdir().unwrap();
    let missing = src.path().join("does-not-exist");
    let dest = tempdir().unwrap();
    copy_optional_subtree(&missing, dest.path()).unwrap();
    assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
}

#[test]
fn copy_icon_splash_refs_copies_referenced_files() {
    let projects_root = tempdir().unwrap();
    let job = sample_job();
    let id = WorkspaceId::for_job(&job.code, job.starttime);
    let workspace = WorkspaceLayout::new(projects_root.path(), &id);
    workspace.ensure_dirs().unwrap();

    std::fs::write(
        workspace.workspace_dir().join("config.xml"),
        br#"<widget><icon src="res/icon.png"/><splash src="res/splash.png"/></widget>"#,
    )
    .unwrap();
    std::fs::create_dir_all(workspace.tmp_dir().join("res")).unwrap();
    std::fs::write(workspace.tmp_dir().join("res/icon.png"), b"ICON").unwrap();
    std::fs::write(workspace.tmp_dir().join("res/splash.png"), b"SPLASH").unwrap();

    let data_root = tempdir().unwrap();
    let ctx = PipelineContext {
        job: &job,
        workspace: &workspace,
        config_root: None,
        data_root: data_root.path(),
    };

    copy_icon_splash_refs(&ctx).unwrap();

    assert_eq!(
        std::fs::read(workspace.workspace_dir().join("res/icon.png")).unwrap(),
        b"ICON"
    );
    assert_eq!(
        std::fs::read(workspace.workspace_dir().join("res/splash.png")).unwrap(),
        b"SPLASH"
    );
}

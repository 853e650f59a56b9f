// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::platform::{BuildDescriptor, PlatformBackend};
use async_trait::async_trait;
use farm_core::{Job, JobId, PlatformKind, WorkspaceId};
use tempfile::tempdir;

struct UnreachableBackend;

#[async_trait]
impl PlatformBackend for UnreachableBackend {
    async fn build_json(&self, _ctx: &PipelineContext<'_>) -> Result<BuildDescriptor, BuildError> {
        panic!("build_json should not run once an earlier stage has failed");
    }
    async fn build(&self, _ctx: &PipelineContext<'_>, _descriptor: &BuildDescriptor) -> Result<(), BuildError> {
        panic!("build should not run once an earlier stage has failed");
    }
    async fn pack(&self, _ctx: &PipelineContext<'_>) -> Result<PathBuf, BuildError> {
        panic!("pack should not run once an earlier stage has failed");
    }
}

fn sample_job() -> Job {
    Job {
        code: JobId::new("A1"),
        starttime: 0,
        platform: PlatformKind::Android,
        key: None,
        icon_url: None,
        splash_url: None,
        config: "does-not-exist.xml".into(),
        source: "does-not-exist.zip".into(),
        lib_version: "8.0.0".into(),
    }
}

#[test]
fn lib_dir_joins_data_root_with_lib_version() {
    let projects_root = tempdir().unwrap();
    let job = sample_job();
    let workspace = WorkspaceLayout::new(projects_root.path(), &WorkspaceId::for_job(&job.code, job.starttime));
    let data_root = tempdir().unwrap();
    let ctx = PipelineContext {
        job: &job,
        workspace: &workspace,
        config_root: None,
        data_root: data_root.path(),
    };

    assert_eq!(
        ctx.lib_dir(),
        data_root.path().join("libs").join("cordova-lib@8.0.0")
    );
}

#[tokio::test]
async fn run_fails_fast_when_init_stage_fails_without_reaching_the_backend() {
    let projects_root = tempdir().unwrap();
    let job = sample_job();
    let workspace = WorkspaceLayout::new(projects_root.path(), &WorkspaceId::for_job(&job.code, job.starttime));
    let data_root = tempdir().unwrap();
    let ctx = PipelineContext {
        job: &job,
        workspace: &workspace,
        config_root: None,
        data_root: data_root.path(),
    };

    let backend = UnreachableBackend;
    let result = run(&ctx, &backend).await;

    assert!(result.is_err());
    assert!(workspace.workspace_dir().exists(), "ensure_dirs should still have run");
    assert!(!workspace.config_xml().exists(), "init stage should have failed before writing config.xml");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use farm_core::{Environment, JobId, PlatformKind};
use tempfile::tempdir;

fn sample_args(projects_root: std::path::PathBuf, data_root: std::path::PathBuf) -> BuildChildArgs {
    BuildChildArgs {
        job: Job {
            code: JobId::new("A1"),
            starttime: 1_700_000_000_000,
            platform: PlatformKind::Ubuntu,
            key: None,
            icon_url: None,
            splash_url: None,
            config: "file:///nonexistent/config.xml".into(),
            source: "file:///nonexistent/source.zip".into(),
            lib_version: "8.0.0".into(),
        },
        projects_root,
        config_root: None,
        data_root,
        environment: Environment::Develop,
        log_level: "info".into(),
    }
}

#[tokio::test]
async fn run_build_child_reports_an_init_stage_failure_as_a_message_not_a_panic() {
    let dir = tempdir().unwrap();
    let args = sample_args(dir.path().join("projects"), dir.path().join("data"));

    let message = run_build_child(&args).await;

    let failure = message.expect("missing config.xml source must fail the pipeline");
    assert!(failure.message.contains("fetch"));
}

#[test]
fn build_child_failure_serializes_msg_public_as_msg_public_camel_case() {
    let failure = BuildChildFailure {
        message: "internal detail".into(),
        msg_public: "Something went wrong.".into(),
    };
    let json = serde_json::to_string(&failure).unwrap();
    assert!(json.contains("\"msgPublic\":\"Something went wrong.\""));
}

#[test]
fn success_message_serializes_to_the_literal_null() {
    let message: BuildChildMessage = None;
    assert_eq!(serde_json::to_string(&message).unwrap(), "null");
}

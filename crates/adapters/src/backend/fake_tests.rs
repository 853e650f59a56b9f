// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_job() -> Job {
    Job {
        code: "A1".into(),
        starttime: 0,
        platform: PlatformKind::Android,
        key: None,
        icon_url: None,
        splash_url: None,
        config: "file:///config.xml".into(),
        source: "file:///source.zip".into(),
        lib_version: "8.0.0".into(),
    }
}

#[tokio::test]
async fn fetch_job_returns_queued_job_then_errors_when_empty() {
    let backend = FakeBackendClient::new();
    backend.push_job(sample_job());

    let job = backend.fetch_job(&[PlatformKind::Android]).await.unwrap();
    assert_eq!(job.code, "A1");

    let err = backend.fetch_job(&[PlatformKind::Android]).await.unwrap_err();
    assert!(matches!(err, BackendError::Status { status: 204, .. }));
}

#[tokio::test]
async fn fail_next_fetch_fails_exactly_once() {
    let backend = FakeBackendClient::new();
    backend.push_job(sample_job());
    backend.fail_next_fetch();

    assert!(backend.fetch_job(&[PlatformKind::Android]).await.is_err());
    assert!(backend.fetch_job(&[PlatformKind::Android]).await.is_ok());
}

#[tokio::test]
async fn post_result_records_success_flag() {
    let backend = FakeBackendClient::new();
    let payload = ResultPayload {
        platform: PlatformKind::Android,
        user_error: None,
        staff_error: None,
        machine: "worker-1".into(),
        result_path: None,
        log_path: None,
    };
    backend.post_result("A1", payload).await.unwrap();

    let calls = backend.calls();
    assert!(matches!(
        calls.as_slice(),
        [BackendCall::PostResult { is_success: true, .. }]
    ));
}

#[tokio::test]
async fn set_fail_post_result_makes_every_call_fail() {
    let backend = FakeBackendClient::new();
    backend.set_fail_post_result(true);
    let payload = ResultPayload {
        platform: PlatformKind::Android,
        user_error: None,
        staff_error: None,
        machine: "worker-1".into(),
        result_path: None,
        log_path: None,
    };

    assert!(backend.post_result("A1", payload.clone()).await.is_err());
    assert!(backend.post_result("A1", payload).await.is_err());
}

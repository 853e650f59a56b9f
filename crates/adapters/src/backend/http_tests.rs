// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_job_json() -> serde_json::Value {
    serde_json::json!({
        "code": "A1",
        "platform": "android",
        "config": "file:///tmp/config.xml",
        "source": "file:///tmp/source.zip",
        "libVersion": "8.0.0",
    })
}

#[tokio::test]
async fn fetch_job_posts_platforms_and_parses_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/compilation"))
        .and(bearer_token("secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_job_json()))
        .mount(&server)
        .await;

    let client = HttpBackendClient::new(server.uri(), "secret").unwrap();
    let job = client.fetch_job(&[PlatformKind::Android]).await.unwrap();

    assert_eq!(job.code, "A1");
    assert_eq!(job.platform, PlatformKind::Android);
}

#[tokio::test]
async fn fetch_job_surfaces_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/compilation"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let client = HttpBackendClient::new(server.uri(), "secret").unwrap();
    let err = client.fetch_job(&[PlatformKind::Ios]).await.unwrap_err();

    match err {
        BackendError::Status { status, .. } => assert_eq!(status, 503),
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn post_result_sends_multipart_without_attachments_when_files_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/compilation/A1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = HttpBackendClient::new(server.uri(), "secret").unwrap();
    let payload = ResultPayload {
        platform: PlatformKind::Android,
        user_error: None,
        staff_error: None,
        machine: "worker-1".into(),
        result_path: None,
        log_path: None,
    };

    client.post_result("A1", payload).await.unwrap();
}

#[tokio::test]
async fn heartbeat_and_deregister_hit_expected_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/compilers/10.0.0.1/builder/heartbeat"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/compilers/10.0.0.1/builder"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = HttpBackendClient::new(server.uri(), "secret").unwrap();
    let service_id = ServiceId::new("builder");

    client.heartbeat("10.0.0.1", &service_id).await.unwrap();
    client.deregister("10.0.0.1", &service_id).await.unwrap();
}

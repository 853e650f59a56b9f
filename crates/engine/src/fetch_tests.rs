// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use wiremock::matchers::{method, path as wm_path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetches_file_url_by_copying() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("config.xml");
    std::fs::write(&src, b"<widget/>").unwrap();
    let dest = dir.path().join("out/config.xml");

    fetch_resource(&format!("file://{}", src.display()), None, &dest)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"<widget/>");
}

#[tokio::test]
async fn fetches_relative_path_against_config_root() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("config.xml"), b"<widget/>").unwrap();
    let dest = dir.path().join("out/config.xml");

    fetch_resource("config.xml", Some(dir.path()), &dest)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"<widget/>");
}

#[tokio::test]
async fn relative_path_without_config_root_errors() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out/config.xml");
    let err = fetch_resource("config.xml", None, &dest).await.unwrap_err();
    assert!(err.message.contains("config root"));
}

#[tokio::test]
async fn fetches_http_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(wm_path("/source.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zipbytes".to_vec()))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("source.zip");
    fetch_resource(&format!("{}/source.zip", server.uri()), None, &dest)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"zipbytes");
}

#[tokio::test]
async fn http_error_status_surfaces_as_build_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(wm_path("/missing.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("missing.zip");
    let err = fetch_resource(&format!("{}/missing.zip", server.uri()), None, &dest)
        .await
        .unwrap_err();
    assert!(!err.message.is_empty());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend HTTP API: job fetch, result upload, service registration.

mod http;

pub use http::HttpBackendClient;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeBackendClient};

use async_trait::async_trait;
use farm_core::{Job, PlatformKind, ServiceId};
use std::path::Path;
use thiserror::Error;

/// Errors from backend API operations.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The outcome payload posted for one job, carrying both an internal
/// (staff-facing) and a public (end-user-facing) message on failure.
#[derive(Debug, Clone)]
pub struct ResultPayload<'a> {
    pub platform: PlatformKind,
    pub user_error: Option<String>,
    pub staff_error: Option<String>,
    pub machine: String,
    /// Path to the produced artifact ZIP, attached as `result`. Skipped if absent.
    pub result_path: Option<&'a Path>,
    /// Path to the captured build log, attached as `log`. Skipped if absent.
    pub log_path: Option<&'a Path>,
}

/// Client for the backend's job-fetch, result-upload, and registration API.
#[async_trait]
pub trait BackendClient: Send + Sync + 'static {
    /// `POST /api/v1/compilation` — fetch the next queued job for one of the
    /// given platforms. The backend returns the job body directly.
    async fn fetch_job(&self, platforms: &[PlatformKind]) -> Result<Job, BackendError>;

    /// `POST /api/v1/compilation/{code}` — multipart result upload.
    async fn post_result(&self, code: &str, payload: ResultPayload<'_>) -> Result<(), BackendError>;

    /// `POST /api/v1/compilers` — announce this host.
    async fn register_host(&self, host: &str, ip: &str, os: &str) -> Result<(), BackendError>;

    /// `POST /api/v1/compilers/{ip}` — announce one service on this host.
    async fn register_service(&self, ip: &str, service_id: &ServiceId) -> Result<(), BackendError>;

    /// `POST /api/v1/compilers/{ip}/{service_id}/heartbeat`.
    async fn heartbeat(&self, ip: &str, service_id: &ServiceId) -> Result<(), BackendError>;

    /// `DELETE /api/v1/compilers/{ip}/{service_id}`.
    async fn deregister(&self, ip: &str, service_id: &ServiceId) -> Result<(), BackendError>;
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Admin API: a local HTTPS server exposing read-only status of the
//! four sibling services, bearer-token-authenticated.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use farm_core::{FarmRoot, ServiceId};
use farm_storage::WorkingLock;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::ServiceError;
use crate::service::{Service, ServiceContext};

/// The four services the Admin API knows how to report on.
const SIBLING_SERVICES: [&str; 4] = ["updater", "builder", "notifier", "admin"];

const LOG_TAIL_LINES: usize = 100;

struct AdminState {
    root: FarmRoot,
    bearer_token: String,
}

#[derive(Debug, Serialize)]
struct Identity {
    name: &'static str,
    version: &'static str,
}

/// One service's reported status. `started`, `cpu`, and `memory` are owned
/// by the external process supervisor, which this crate has no handle to;
/// they are always reported absent here.
#[derive(Debug, Serialize)]
struct ServiceStatus {
    name: String,
    started: Option<u64>,
    working: bool,
    cpu: Option<f64>,
    memory: Option<u64>,
    version: &'static str,
}

impl ServiceStatus {
    fn for_service(root: &FarmRoot, name: &str) -> Self {
        Self {
            name: name.to_string(),
            started: None,
            working: WorkingLock::is_working(&root.service_lock_path(name)),
            cpu: None,
            memory: None,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

fn authorized(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {token}"))
        .unwrap_or(false)
}

async fn get_identity(State(state): State<Arc<AdminState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers, &state.bearer_token) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(Identity {
        name: "farm-worker admin api",
        version: env!("CARGO_PKG_VERSION"),
    })
    .into_response()
}

async fn list_services(State(state): State<Arc<AdminState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers, &state.bearer_token) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let statuses: Vec<ServiceStatus> = SIBLING_SERVICES
        .iter()
        .map(|name| ServiceStatus::for_service(&state.root, name))
        .collect();
    Json(statuses).into_response()
}

async fn get_service(State(state): State<Arc<AdminState>>, headers: HeaderMap, AxumPath(id): AxumPath<String>) -> Response {
    if !authorized(&headers, &state.bearer_token) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !SIBLING_SERVICES.contains(&id.as_str()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(ServiceStatus::for_service(&state.root, &id)).into_response()
}

async fn get_service_log(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Response {
    if !authorized(&headers, &state.bearer_token) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !SIBLING_SERVICES.contains(&id.as_str()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let path = state.root.service_log_path(&id);
    let contents = tokio::fs::read_to_string(&path).await.unwrap_or_default();
    let tail: Vec<&str> = contents.lines().rev().take(LOG_TAIL_LINES).collect();
    let tail: String = tail.into_iter().rev().collect::<Vec<_>>().join("\n");
    tail.into_response()
}

fn build_router(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/api/", get(get_identity))
        .route("/api/services", get(list_services))
        .route("/api/services/:id", get(get_service))
        .route("/api/services/:id/log", get(get_service_log))
        .with_state(state)
}

pub struct AdminApiService {
    bearer_token: String,
    tls_cert_path: PathBuf,
    tls_key_path: PathBuf,
    server: Option<JoinHandle<()>>,
}

impl AdminApiService {
    pub fn new(bearer_token: impl Into<String>, tls_cert_path: PathBuf, tls_key_path: PathBuf) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            tls_cert_path,
            tls_key_path,
            server: None,
        }
    }
}

#[async_trait]
impl Service for AdminApiService {
    fn id(&self) -> ServiceId {
        ServiceId::new("admin")
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn on_start(&mut self, ctx: &ServiceContext) -> Result<(), ServiceError> {
        let config = RustlsConfig::from_pem_file(&self.tls_cert_path, &self.tls_key_path)
            .await
            .map_err(|e| ServiceError::Init(format!("failed to load admin API TLS certificate: {e}")))?;

        let state = Arc::new(AdminState {
            root: ctx.root.clone(),
            bearer_token: self.bearer_token.clone(),
        });
        let app = build_router(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], crate::env::admin_api_port()));

        info!(%addr, "starting admin api");
        self.server = Some(tokio::spawn(async move {
            if let Err(err) = axum_server::bind_rustls(addr, config).serve(app.into_make_service()).await {
                error!(%err, "admin api server exited");
            }
        }));
        Ok(())
    }

    async fn run_iteration(&mut self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        if let Some(handle) = &self.server {
            if handle.is_finished() {
                return Err(ServiceError::Init("admin api server task exited unexpectedly".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;

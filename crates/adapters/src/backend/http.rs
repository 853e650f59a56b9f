// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! reqwest-based [`BackendClient`].

use super::{BackendClient, BackendError, ResultPayload};
use async_trait::async_trait;
use farm_core::{Job, PlatformKind, ServiceId};
use std::time::Duration;

/// All backend HTTP calls respect this timeout (spec: 10s for backend I/O).
const BACKEND_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to the real backend over HTTPS, authenticated with a fixed bearer
/// credential shared by every request.
pub struct HttpBackendClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl HttpBackendClient {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(BACKEND_HTTP_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(BackendError::Status { status, body })
        }
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn fetch_job(&self, platforms: &[PlatformKind]) -> Result<Job, BackendError> {
        let response = self
            .client
            .post(self.url("/api/v1/compilation"))
            .bearer_auth(&self.bearer_token)
            .json(&serde_json::json!({ "platforms": platforms }))
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let response = Self::check_status(response).await?;
        response
            .json::<Job>()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))
    }

    async fn post_result(&self, code: &str, payload: ResultPayload<'_>) -> Result<(), BackendError> {
        let data = serde_json::json!({
            "platform": payload.platform,
            "user_error": payload.user_error,
            "staff_error": payload.staff_error,
            "machine": payload.machine,
        });

        let mut form = reqwest::multipart::Form::new()
            .text("data", data.to_string());

        if let Some(path) = payload.result_path {
            if let Ok(bytes) = tokio::fs::read(path).await {
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("result.zip")
                    .to_string();
                form = form.part("result", reqwest::multipart::Part::bytes(bytes).file_name(file_name));
            }
        }
        if let Some(path) = payload.log_path {
            if let Ok(bytes) = tokio::fs::read(path).await {
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("stdout.log")
                    .to_string();
                form = form.part("log", reqwest::multipart::Part::bytes(bytes).file_name(file_name));
            }
        }

        let response = self
            .client
            .post(self.url(&format!("/api/v1/compilation/{code}")))
            .bearer_auth(&self.bearer_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn register_host(&self, host: &str, ip: &str, os: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/api/v1/compilers"))
            .bearer_auth(&self.bearer_token)
            .json(&serde_json::json!({ "host": host, "ip": ip, "os": os }))
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn register_service(&self, ip: &str, service_id: &ServiceId) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url(&format!("/api/v1/compilers/{ip}")))
            .bearer_auth(&self.bearer_token)
            .json(&serde_json::json!({ "service_id": service_id }))
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn heartbeat(&self, ip: &str, service_id: &ServiceId) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url(&format!("/api/v1/compilers/{ip}/{service_id}/heartbeat")))
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn deregister(&self, ip: &str, service_id: &ServiceId) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/v1/compilers/{ip}/{service_id}")))
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

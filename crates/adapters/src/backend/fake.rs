// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake backend client for testing

use super::{BackendClient, BackendError, ResultPayload};
use async_trait::async_trait;
use farm_core::{Job, PlatformKind, ServiceId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Recorded backend call, for assertions in tests of callers.
#[derive(Debug, Clone)]
pub enum BackendCall {
    FetchJob { platforms: Vec<PlatformKind> },
    PostResult { code: String, is_success: bool },
    RegisterHost { host: String, ip: String, os: String },
    RegisterService { ip: String, service_id: String },
    Heartbeat { ip: String, service_id: String },
    Deregister { ip: String, service_id: String },
}

struct FakeBackendState {
    jobs: VecDeque<Job>,
    calls: Vec<BackendCall>,
    fail_fetch: bool,
    fail_post_result: bool,
}

/// In-memory [`BackendClient`] for testing the Builder/Notifier/service
/// lifecycle without a real HTTP server.
#[derive(Clone)]
pub struct FakeBackendClient {
    inner: Arc<Mutex<FakeBackendState>>,
}

impl Default for FakeBackendClient {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeBackendState {
                jobs: VecDeque::new(),
                calls: Vec::new(),
                fail_fetch: false,
                fail_post_result: false,
            })),
        }
    }
}

impl FakeBackendClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a job to be returned by the next `fetch_job` call.
    pub fn push_job(&self, job: Job) {
        self.inner.lock().jobs.push_back(job);
    }

    /// Make the next `fetch_job` call fail with a transient error.
    pub fn fail_next_fetch(&self) {
        self.inner.lock().fail_fetch = true;
    }

    /// Make every `post_result` call fail until reset.
    pub fn set_fail_post_result(&self, fail: bool) {
        self.inner.lock().fail_post_result = fail;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl BackendClient for FakeBackendClient {
    async fn fetch_job(&self, platforms: &[PlatformKind]) -> Result<Job, BackendError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BackendCall::FetchJob {
            platforms: platforms.to_vec(),
        });
        if std::mem::take(&mut inner.fail_fetch) {
            return Err(BackendError::Request("fake: simulated failure".into()));
        }
        inner
            .jobs
            .pop_front()
            .ok_or_else(|| BackendError::Status {
                status: 204,
                body: "no job queued".into(),
            })
    }

    async fn post_result(&self, code: &str, payload: ResultPayload<'_>) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BackendCall::PostResult {
            code: code.to_string(),
            is_success: payload.user_error.is_none() && payload.staff_error.is_none(),
        });
        if inner.fail_post_result {
            return Err(BackendError::Status {
                status: 500,
                body: "fake: simulated failure".into(),
            });
        }
        Ok(())
    }

    async fn register_host(&self, host: &str, ip: &str, os: &str) -> Result<(), BackendError> {
        self.inner.lock().calls.push(BackendCall::RegisterHost {
            host: host.to_string(),
            ip: ip.to_string(),
            os: os.to_string(),
        });
        Ok(())
    }

    async fn register_service(&self, ip: &str, service_id: &ServiceId) -> Result<(), BackendError> {
        self.inner.lock().calls.push(BackendCall::RegisterService {
            ip: ip.to_string(),
            service_id: service_id.to_string(),
        });
        Ok(())
    }

    async fn heartbeat(&self, ip: &str, service_id: &ServiceId) -> Result<(), BackendError> {
        self.inner.lock().calls.push(BackendCall::Heartbeat {
            ip: ip.to_string(),
            service_id: service_id.to_string(),
        });
        Ok(())
    }

    async fn deregister(&self, ip: &str, service_id: &ServiceId) -> Result<(), BackendError> {
        self.inner.lock().calls.push(BackendCall::Deregister {
            ip: ip.to_string(),
            service_id: service_id.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

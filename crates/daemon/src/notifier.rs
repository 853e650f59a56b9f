// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Notifier: drains the durable notification queue one message per
//! iteration, uploads the job's outcome and artifacts to the backend, and
//! cleans up the workspace.

use std::time::Duration;

use async_trait::async_trait;
use farm_adapters::backend::ResultPayload;
use farm_core::{ServiceId, WorkspaceId, WorkspaceLayout};
use farm_storage::NotificationQueue;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::network::hostname;
use crate::service::{Service, ServiceContext};

/// Visibility timeout granted to a dequeued message before it is eligible
/// for redelivery.
const VISIBILITY: Duration = Duration::from_secs(1800);

/// Deliveries beyond this are discarded rather than retried forever.
const MAX_RETRIES_NUMBER: u32 = 20;

pub struct NotifierService;

impl NotifierService {
    pub fn new() -> Self {
        Self
    }

    /// The first file in `out/`, if any — the artifact the Notifier
    /// attaches as `result`.
    async fn first_artifact(workspace: &WorkspaceLayout) -> Option<std::path::PathBuf> {
        let mut entries = tokio::fs::read_dir(workspace.out_dir()).await.ok()?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.path().is_file() {
                return Some(entry.path());
            }
        }
        None
    }

    async fn clean_workspace(workspace: &WorkspaceLayout) {
        if workspace.root().exists() {
            if let Err(err) = tokio::fs::remove_dir_all(workspace.root()).await {
                warn!(path = %workspace.root().display(), %err, "failed to clean job workspace");
            }
        }
    }
}

impl Default for NotifierService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for NotifierService {
    fn id(&self) -> ServiceId {
        ServiceId::new("notifier")
    }

    fn interval(&self) -> Duration {
        farm_adapters::env::notifier_poll_interval_ms()
    }

    async fn run_iteration(&mut self, ctx: &ServiceContext) -> Result<(), ServiceError> {
        let mut queue = NotificationQueue::open(ctx.root.notification_queue_path())
            .map_err(|e| ServiceError::Init(e.to_string()))?;

        let now_ms = ctx.clock.epoch_ms();
        let Some(dequeued) = queue
            .dequeue(now_ms, VISIBILITY)
            .map_err(|e| ServiceError::Init(e.to_string()))?
        else {
            return Ok(());
        };

        let workspace_id = WorkspaceId::for_job(&dequeued.notification.code, dequeued.notification.starttime);
        let workspace = WorkspaceLayout::new(&ctx.root.projects_dir(), &workspace_id);

        if dequeued.tries > MAX_RETRIES_NUMBER {
            warn!(
                code = %dequeued.notification.code,
                tries = dequeued.tries,
                "discarding notification after exceeding max retries"
            );
            queue.ack(&dequeued.id).map_err(|e| ServiceError::Init(e.to_string()))?;
            Self::clean_workspace(&workspace).await;
            return Ok(());
        }

        queue
            .ping(&dequeued.id, now_ms, VISIBILITY)
            .map_err(|e| ServiceError::Init(e.to_string()))?;

        let artifact = Self::first_artifact(&workspace).await;
        let log_path = workspace.stdout_log();
        let log_path = log_path.exists().then_some(log_path.as_path());

        let payload = ResultPayload {
            platform: dequeued.notification.platform,
            user_error: dequeued.notification.msg_public.clone(),
            staff_error: dequeued.notification.msg_internal.clone(),
            machine: hostname(),
            result_path: artifact.as_deref(),
            log_path,
        };

        match ctx.backend.post_result(dequeued.notification.code.as_str(), payload).await {
            Ok(()) => {
                queue.ack(&dequeued.id).map_err(|e| ServiceError::Init(e.to_string()))?;
                if !ctx.environment.preserves_workspaces() {
                    Self::clean_workspace(&workspace).await;
                }
                info!(code = %dequeued.notification.code, "notification delivered");
            }
            Err(err) => {
                warn!(code = %dequeued.notification.code, %err, "result upload failed, leaving in-flight");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;

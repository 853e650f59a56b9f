// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use farm_adapters::FakeBackendClient;
use farm_core::{Environment, FakeClock, FarmRoot, JobId, Notification, NotificationId, PlatformKind, UuidIdGen};
use std::sync::Arc;
use tempfile::tempdir;

fn test_ctx(root: &tempfile::TempDir, backend: FakeBackendClient, environment: Environment) -> ServiceContext {
    ServiceContext {
        root: FarmRoot::new(root.path()),
        environment,
        backend: Arc::new(backend),
        clock: Arc::new(FakeClock::new(1_700_000_000_000)),
        id_gen: Arc::new(UuidIdGen),
    }
}

#[tokio::test]
async fn run_iteration_is_a_no_op_when_the_queue_is_empty() {
    let dir = tempdir().unwrap();
    let ctx = test_ctx(&dir, FakeBackendClient::new(), Environment::Testing);
    let mut service = NotifierService::new();
    service.run_iteration(&ctx).await.unwrap();
    assert!(ctx.backend.calls().is_empty());
}

#[tokio::test]
async fn run_iteration_acks_and_cleans_the_workspace_on_successful_upload() {
    let dir = tempdir().unwrap();
    let backend = FakeBackendClient::new();
    let ctx = test_ctx(&dir, backend, Environment::Testing);

    let mut queue = NotificationQueue::open(ctx.root.notification_queue_path()).unwrap();
    let notification = Notification::success(JobId::new("A1"), PlatformKind::Android, 42);
    queue
        .enqueue(notification.clone(), NotificationId::new("n1"), ctx.clock.epoch_ms())
        .unwrap();
    drop(queue);

    let workspace_id = WorkspaceId::for_job(&notification.code, notification.starttime);
    let workspace = WorkspaceLayout::new(&ctx.root.projects_dir(), &workspace_id);
    workspace.ensure_dirs().unwrap();
    tokio::fs::write(workspace.out_dir().join("app.apk"), b"artifact").await.unwrap();

    let mut service = NotifierService::new();
    service.run_iteration(&ctx).await.unwrap();

    assert!(!workspace.root().exists());
    let calls = ctx.backend.calls();
    assert_eq!(calls.len(), 1);
}

#[tokio::test]
async fn run_iteration_preserves_the_workspace_in_develop() {
    let dir = tempdir().unwrap();
    let backend = FakeBackendClient::new();
    let ctx = test_ctx(&dir, backend, Environment::Develop);

    let mut queue = NotificationQueue::open(ctx.root.notification_queue_path()).unwrap();
    let notification = Notification::success(JobId::new("A1"), PlatformKind::Android, 42);
    queue
        .enqueue(notification.clone(), NotificationId::new("n1"), ctx.clock.epoch_ms())
        .unwrap();
    drop(queue);

    let workspace_id = WorkspaceId::for_job(&notification.code, notification.starttime);
    let workspace = WorkspaceLayout::new(&ctx.root.projects_dir(), &workspace_id);
    workspace.ensure_dirs().unwrap();

    let mut service = NotifierService::new();
    service.run_iteration(&ctx).await.unwrap();

    assert!(workspace.root().exists());
}

#[tokio::test]
async fn run_iteration_leaves_the_message_in_flight_when_the_upload_fails() {
    let dir = tempdir().unwrap();
    let backend = FakeBackendClient::new();
    backend.set_fail_post_result(true);
    let ctx = test_ctx(&dir, backend, Environment::Testing);

    let mut queue = NotificationQueue::open(ctx.root.notification_queue_path()).unwrap();
    let notification = Notification::success(JobId::new("A1"), PlatformKind::Android, 42);
    queue
        .enqueue(notification.clone(), NotificationId::new("n1"), ctx.clock.epoch_ms())
        .unwrap();
    drop(queue);

    let mut service = NotifierService::new();
    service.run_iteration(&ctx).await.unwrap();

    let mut queue = NotificationQueue::open(ctx.root.notification_queue_path()).unwrap();
    assert_eq!(queue.tries(&NotificationId::new("n1")), Some(1));
}

#[tokio::test]
async fn run_iteration_discards_a_message_past_the_max_retry_count() {
    let dir = tempdir().unwrap();
    let backend = FakeBackendClient::new();
    backend.set_fail_post_result(true);
    let ctx = test_ctx(&dir, backend, Environment::Testing);

    let id = NotificationId::new("n1");
    let notification = Notification::success(JobId::new("A1"), PlatformKind::Android, 42);
    {
        let mut queue = NotificationQueue::open(ctx.root.notification_queue_path()).unwrap();
        queue.enqueue(notification.clone(), id.clone(), ctx.clock.epoch_ms()).unwrap();
        for _ in 0..MAX_RETRIES_NUMBER {
            queue.dequeue(ctx.clock.epoch_ms(), Duration::from_secs(0)).unwrap();
        }
    }

    let mut service = NotifierService::new();
    service.run_iteration(&ctx).await.unwrap();

    let queue = NotificationQueue::open(ctx.root.notification_queue_path()).unwrap();
    assert!(queue.is_empty());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! farm-storage: durable on-host state for the build-farm worker.
//!
//! Three filesystem artifacts, matching the invariants in the data model:
//! the notification queue (JSONL, visibility-timeout semantics), the
//! manifest mirror (`s3_structure.json`), and the per-service working lock.

pub mod atomic_file;
pub mod manifest_store;
pub mod notification_queue;
pub mod working_lock;

pub use manifest_store::{ManifestStore, ManifestStoreError};
pub use notification_queue::{DequeuedNotification, NotificationQueue, QueueError};
pub use working_lock::WorkingLock;

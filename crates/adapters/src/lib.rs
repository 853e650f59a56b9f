// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the backend HTTP API, the dependency-cache
//! object store, and subprocess execution.

pub mod env;
pub mod backend;
pub mod object_store;
pub mod subprocess;

pub use backend::{BackendClient, BackendError, HttpBackendClient, ResultPayload};
pub use object_store::{ObjectStoreClient, ObjectStoreError, S3ObjectStoreClient};

#[cfg(any(test, feature = "test-support"))]
pub use backend::{BackendCall, FakeBackendClient};
#[cfg(any(test, feature = "test-support"))]
pub use object_store::FakeObjectStoreClient;

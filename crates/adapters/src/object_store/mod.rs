// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote object-store listing and download (the Updater's upstream).

mod s3;

pub use s3::S3ObjectStoreClient;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeObjectStoreClient;

use async_trait::async_trait;
use farm_core::ManifestEntry;
use std::path::Path;
use thiserror::Error;

/// Errors from object-store operations.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("list failed: {0}")]
    List(String),
    #[error("download failed for {key}: {source}")]
    Download { key: String, source: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Client for listing and downloading objects from the dependency-cache bucket.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync + 'static {
    /// List every object currently in `bucket`.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ManifestEntry>, ObjectStoreError>;

    /// Stream-download `key` from `bucket` into `dest`, overwriting it.
    async fn download_to(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), ObjectStoreError>;
}

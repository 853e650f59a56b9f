// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `aws-sdk-s3`-backed [`ObjectStoreClient`].

use super::{ObjectStoreClient, ObjectStoreError};
use async_trait::async_trait;
use aws_sdk_s3::primitives::DateTimeFormat;
use aws_sdk_s3::Client;
use farm_core::ManifestEntry;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Talks to the dependency-cache bucket via the AWS S3 API.
pub struct S3ObjectStoreClient {
    client: Client,
}

impl S3ObjectStoreClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS config (environment / instance
    /// profile / shared credentials file), matching whatever the host's
    /// default provider chain resolves.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl ObjectStoreClient for S3ObjectStoreClient {
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ManifestEntry>, ObjectStoreError> {
        let mut entries = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| ObjectStoreError::List(e.to_string()))?;
            for object in page.contents() {
                let key = match object.key() {
                    Some(key) => key.to_string(),
                    None => continue,
                };
                let last_modified = object
                    .last_modified()
                    .and_then(|dt| dt.fmt(DateTimeFormat::DateTime).ok())
                    .unwrap_or_default();
                let etag = object.e_tag().unwrap_or_default().trim_matches('"').to_string();
                let size = object.size().unwrap_or(0).max(0) as u64;
                entries.push(ManifestEntry {
                    key,
                    last_modified,
                    etag,
                    size,
                });
            }
        }

        Ok(entries)
    }

    async fn download_to(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), ObjectStoreError> {
        let mut object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Download {
                key: key.to_string(),
                source: e.to_string(),
            })?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = object.body.next().await {
            let chunk = chunk.map_err(|e| ObjectStoreError::Download {
                key: key.to_string(),
                source: e.to_string(),
            })?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake object-store client for testing the Updater without a real bucket.

use super::{ObjectStoreClient, ObjectStoreError};
use async_trait::async_trait;
use farm_core::ManifestEntry;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Default)]
struct FakeObjectStoreState {
    entries: Vec<ManifestEntry>,
    objects: HashMap<String, Vec<u8>>,
}

/// In-memory object store: `entries` is the listing the Updater will see;
/// `objects` is the byte content each key downloads to.
#[derive(Clone, Default)]
pub struct FakeObjectStoreClient {
    inner: Arc<Mutex<FakeObjectStoreState>>,
}

impl FakeObjectStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listing(&self, entries: Vec<ManifestEntry>) {
        self.inner.lock().entries = entries;
    }

    pub fn put_object(&self, key: impl Into<String>, content: Vec<u8>) {
        self.inner.lock().objects.insert(key.into(), content);
    }
}

#[async_trait]
impl ObjectStoreClient for FakeObjectStoreClient {
    async fn list_objects(&self, _bucket: &str) -> Result<Vec<ManifestEntry>, ObjectStoreError> {
        Ok(self.inner.lock().entries.clone())
    }

    async fn download_to(&self, _bucket: &str, key: &str, dest: &Path) -> Result<(), ObjectStoreError> {
        let content = self
            .inner
            .lock()
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::Download {
                key: key.to_string(),
                source: "fake: no such object".into(),
            })?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, content)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

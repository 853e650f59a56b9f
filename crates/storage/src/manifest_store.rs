// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence for the object-store manifest mirror (`s3_structure.json`).

use crate::atomic_file;
use farm_core::Manifest;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads and atomically persists the manifest mirror at a fixed path.
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the last-persisted manifest. Returns `None` if no manifest has
    /// ever been persisted (first Updater run, cold start).
    pub fn load(&self) -> Result<Option<Manifest>, ManifestStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)?;
        let manifest: Manifest = serde_json::from_slice(&bytes)?;
        Ok(Some(manifest))
    }

    /// Persist the given manifest, replacing any prior one atomically.
    pub fn save(&self, manifest: &Manifest) -> Result<(), ManifestStoreError> {
        let bytes = serde_json::to_vec_pretty(manifest)?;
        atomic_file::write_atomic(&self.path, &bytes)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "manifest_store_tests.rs"]
mod tests;

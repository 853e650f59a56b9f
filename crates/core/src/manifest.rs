// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote object-store manifest mirror (`s3_structure.json`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single object entry as listed from the remote bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub key: String,
    /// ISO-8601 last-modified timestamp, compared as a normalized string
    /// (not parsed to an `Instant`) per the Updater's sync-status rule.
    pub last_modified: String,
    pub etag: String,
    pub size: u64,
}

/// The local mirror of the last-seen remote listing. Single source of truth
/// for what is currently in the dependency cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Lookup by key, for sync-status comparison against a freshly-listed entry.
    pub fn by_key(&self) -> HashMap<&str, &ManifestEntry> {
        self.entries.iter().map(|e| (e.key.as_str(), e)).collect()
    }

    /// Normalize an ISO-8601 timestamp for string-equality comparison
    /// (trims fractional seconds and a trailing `Z`/`+00:00` to a common form).
    pub fn normalize_timestamp(raw: &str) -> String {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix("+00:00").unwrap_or(trimmed);
        match trimmed.split_once('.') {
            Some((head, _fraction)) => head.to_string(),
            None => trimmed.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;

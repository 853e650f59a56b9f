// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job (compilation request) identifier and data.

use crate::platform::PlatformKind;
use crate::signing::SigningKey;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a job instance. This is the `code` field on the
    /// wire; it is used verbatim in every workspace path.
    pub struct JobId;
}

/// A single build request, as accepted from the backend or a one-shot
/// `config.json` file.
///
/// `(code, starttime)` uniquely identifies a workspace for the lifetime of
/// the job (see [`crate::workspace::WorkspaceLayout`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque job identifier, used verbatim in all workspace paths.
    pub code: JobId,
    /// Monotonic-ish acquisition timestamp (ms since epoch), assigned by the
    /// Builder when the job is fetched — not part of the wire payload.
    #[serde(default)]
    pub starttime: u64,
    pub platform: PlatformKind,
    #[serde(default)]
    pub key: Option<SigningKey>,
    #[serde(default, rename = "iconUrl")]
    pub icon_url: Option<String>,
    #[serde(default, rename = "splashUrl")]
    pub splash_url: Option<String>,
    /// URL (or, in one-shot mode, a path relative to the config root) of the
    /// project manifest XML.
    pub config: String,
    /// URL (or path) of the project sources ZIP.
    pub source: String,
    /// Version string of the native-build library to use.
    #[serde(rename = "libVersion")]
    pub lib_version: String,
}

/// Errors constructing a [`Job`] from an untrusted wire payload.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JobValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("signing key shape does not match platform {0}")]
    KeyPlatformMismatch(PlatformKind),
}

impl Job {
    /// Whether this is a signed build (has a `key`).
    pub fn is_signed(&self) -> bool {
        self.key.is_some()
    }

    /// Validate cross-field invariants that `serde` alone cannot express:
    /// a present `key` must match `platform`'s expected shape.
    pub fn validate(&self) -> Result<(), JobValidationError> {
        if let Some(key) = &self.key {
            if !key.matches(self.platform) {
                return Err(JobValidationError::KeyPlatformMismatch(self.platform));
            }
        }
        Ok(())
    }

    /// Assign the acquisition timestamp. Called by the Builder exactly once,
    /// right after the job is fetched.
    pub fn with_starttime(mut self, starttime_ms: u64) -> Self {
        self.starttime = starttime_ms;
        self
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform-specific signing key shapes.

use serde::{Deserialize, Serialize};

/// A signing key attached to a job. The shape is platform-specific; a job
/// whose `key` does not match its `platform` is rejected at parse time by
/// [`crate::job::Job::from_wire`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SigningKey {
    Android {
        keystore_url: String,
        alias: String,
        store_password: String,
        key_password: String,
    },
    Apple {
        p12_url: String,
        provisioning_profile_url: String,
        password: String,
    },
    Windows {
        pfx_url: String,
        thumbprint: String,
        publisher: String,
    },
}

impl SigningKey {
    /// Whether this key shape is valid for the given platform.
    pub fn matches(&self, platform: crate::platform::PlatformKind) -> bool {
        use crate::platform::PlatformKind;
        match (self, platform) {
            (SigningKey::Android { .. }, PlatformKind::Android) => true,
            (SigningKey::Apple { .. }, PlatformKind::Ios | PlatformKind::Osx) => true,
            (SigningKey::Windows { .. }, PlatformKind::Windows) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "signing_tests.rs"]
mod tests;

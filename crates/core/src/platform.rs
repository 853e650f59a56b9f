// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target platform tag.

use std::fmt;
use std::str::FromStr;

/// One of the five target platforms a job can build for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Android,
    Ios,
    Osx,
    Windows,
    Ubuntu,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 5] = [
        PlatformKind::Android,
        PlatformKind::Ios,
        PlatformKind::Osx,
        PlatformKind::Windows,
        PlatformKind::Ubuntu,
    ];

    /// Whether this platform's toolchain runs under the Apple build backend
    /// (shares keychain/provisioning-profile handling).
    pub fn is_apple(&self) -> bool {
        matches!(self, PlatformKind::Ios | PlatformKind::Osx)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Android => "android",
            PlatformKind::Ios => "ios",
            PlatformKind::Osx => "osx",
            PlatformKind::Windows => "windows",
            PlatformKind::Ubuntu => "ubuntu",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlatformKind {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(PlatformKind::Android),
            "ios" => Ok(PlatformKind::Ios),
            "osx" | "macos" => Ok(PlatformKind::Osx),
            "windows" => Ok(PlatformKind::Windows),
            "ubuntu" | "linux" => Ok(PlatformKind::Ubuntu),
            other => Err(PlatformParseError(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct PlatformParseError(String);

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment environment tag and the values it selects.

use std::fmt;
use std::str::FromStr;

/// Discriminated deployment tag. Selects backend hostname, object-store
/// bucket, database name, and workspace retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Develop,
    Testing,
    Production,
}

impl Environment {
    /// Backend API hostname for this environment.
    pub fn backend_host(&self) -> &'static str {
        match self {
            Environment::Develop => "develop-api.buildfarm.internal",
            Environment::Testing => "testing-api.buildfarm.internal",
            Environment::Production => "api.buildfarm.internal",
        }
    }

    /// Object-store bucket name for this environment.
    pub fn bucket_name(&self) -> &'static str {
        match self {
            Environment::Develop => "buildfarm-cache-develop",
            Environment::Testing => "buildfarm-cache-testing",
            Environment::Production => "buildfarm-cache-production",
        }
    }

    /// Logical database name, used for namespacing persisted state.
    pub fn database_name(&self) -> &'static str {
        match self {
            Environment::Develop => "develop",
            Environment::Testing => "testing",
            Environment::Production => "production",
        }
    }

    /// Whether a successfully-notified job workspace should be preserved on
    /// disk. Only DEVELOP preserves; other environments purge.
    pub fn preserves_workspaces(&self) -> bool {
        matches!(self, Environment::Develop)
    }

    /// Whether the service-lifecycle registration protocol should run.
    /// Skipped in DEVELOP.
    pub fn registers_with_backend(&self) -> bool {
        !matches!(self, Environment::Develop)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Develop => write!(f, "develop"),
            Environment::Testing => write!(f, "testing"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = EnvironmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "develop" | "dev" => Ok(Environment::Develop),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(EnvironmentParseError(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown environment: {0}")]
pub struct EnvironmentParseError(String);

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;

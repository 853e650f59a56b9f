// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The build pipeline's one error type.
//!
//! Every stage boundary returns `Result<_, BuildError>`. `message` is for
//! the server-side log only; `msg_public` is what the end user sees in the
//! terminal notification (see `farm_core::Notification`).

use std::fmt;

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct BuildError {
    pub message: String,
    pub msg_public: String,
}

impl BuildError {
    pub fn new(message: impl Into<String>, msg_public: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            msg_public: msg_public.into(),
        }
    }

    /// Both strings identical — used when there is no meaningfully different
    /// user-facing summary (e.g. an internal invariant violation that should
    /// never happen in practice but still needs a public message).
    pub fn uniform(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            msg_public: message.clone(),
            message,
        }
    }

    /// Wrap an underlying error whose `Display` is safe to show to the user
    /// verbatim, tagging the log message with `stage` for triage.
    pub fn from_stage(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("{stage}: {err}"),
            msg_public: err.to_string(),
        }
    }

    /// Append the tail of the native build log, per spec — always shown to
    /// the user, prefixed so the backend can distinguish it from the rest of
    /// `msg_public`.
    pub fn with_log_tail(mut self, tail: &str) -> Self {
        if !tail.is_empty() {
            self.msg_public = format!("{}\nCORDOVA LOG:{}", self.msg_public, tail);
        }
        self
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

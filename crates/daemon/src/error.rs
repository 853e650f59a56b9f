// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors that can terminate a service process outright. Per-iteration
//! failures never reach this type — they're logged and swallowed by the
//! runtime loop (see `service.rs`).

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("initialization failed: {0}")]
    Init(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

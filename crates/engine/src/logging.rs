// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helper for running a native-tool subprocess and appending its
//! combined stdout/stderr to a workspace's `cordova.log`, used by every
//! pipeline stage and platform backend so the log always has a full
//! record of what ran regardless of which step failed.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use farm_adapters::subprocess::run_with_timeout;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::BuildError;

/// Run `bin args...` in `cwd`, append its output to `log_path`, and error
/// (with `msg_public` set to a generic "failed while {description}") if
/// it exits non-zero or times out.
pub async fn run_logged(
    bin: &Path,
    args: &[&str],
    cwd: &Path,
    log_path: &Path,
    timeout: Duration,
    description: &str,
) -> Result<(), BuildError> {
    let output = run_logged_capture(bin, args, cwd, log_path, timeout, description).await?;
    if !output.status.success() {
        return Err(BuildError::new(
            format!("{description} exited with {:?}", output.status.code()),
            format!("Failed while {description}."),
        ));
    }
    Ok(())
}

/// Same as [`run_logged`], but returns the captured `Output` even on a
/// non-zero exit rather than erroring, for callers that need to inspect
/// stdout themselves (e.g. extracting a provisioning profile UUID).
pub async fn run_logged_capture(
    bin: &Path,
    args: &[&str],
    cwd: &Path,
    log_path: &Path,
    timeout: Duration,
    description: &str,
) -> Result<Output, BuildError> {
    let mut cmd = Command::new(bin);
    cmd.args(args).current_dir(cwd);
    let output = run_with_timeout(cmd, timeout, description)
        .await
        .map_err(|e| BuildError::new(e, format!("Failed while {description}.")))?;

    append_log(log_path, &output.stdout).await?;
    append_log(log_path, &output.stderr).await?;
    Ok(output)
}

async fn append_log(log_path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    if bytes.is_empty() {
        return Ok(());
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .await
        .map_err(|e| BuildError::from_stage("build", e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| BuildError::from_stage("build", e))?;
    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;

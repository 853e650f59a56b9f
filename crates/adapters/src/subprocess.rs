// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for archive extraction (`tar -jxf` / `bsdtar -xf`).
pub const ARCHIVE_EXTRACT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default timeout for host package manager operations (installing a
/// `cordova-lib` version when not already present in the cache).
pub const PACKAGE_MANAGER_TIMEOUT: Duration = Duration::from_secs(120);

/// Default timeout for a single native build-tool invocation (gradle,
/// xcodebuild, msbuild, debuild). This is independent of the Builder's
/// 45-minute whole-child watchdog — it bounds one step within a pipeline
/// stage, not the pipeline as a whole.
pub const NATIVE_TOOL_TIMEOUT: Duration = Duration::from_secs(1800);

/// Default timeout for short bookkeeping commands (certutil import,
/// keychain creation, profile install).
pub const SHORT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses (via the tokio `Child`
/// drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Zero-byte `{service_id}.lock` marker: its existence means the owning
//! service is currently inside a job iteration. Observable by the Admin API
//! and by a cooperative `stop()`.

use std::path::{Path, PathBuf};

/// RAII guard over a service's working lockfile. Creating the guard creates
/// the file; dropping it (or calling [`WorkingLock::clear`]) removes it.
/// Using a guard means a panicking iteration can never leave a stale lock
/// behind — `working(false)` is not a step that can be skipped.
pub struct WorkingLock {
    path: PathBuf,
    held: bool,
}

impl WorkingLock {
    /// Path to the lockfile for `service_id` inside `workspace_root`.
    pub fn path_for(workspace_root: &Path, service_id: &str) -> PathBuf {
        workspace_root.join(format!("{service_id}.lock"))
    }

    /// Construct a (not-yet-held) guard for the given lockfile path.
    pub fn new(path: PathBuf) -> Self {
        Self { path, held: false }
    }

    /// Whether the lockfile currently exists on disk.
    pub fn is_working(path: &Path) -> bool {
        path.exists()
    }

    /// Create the lockfile. Idempotent.
    pub fn acquire(&mut self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::File::create(&self.path)?;
        self.held = true;
        Ok(())
    }

    /// Remove the lockfile. Idempotent — tolerates the file already being gone.
    pub fn clear(&mut self) {
        if self.held {
            let _ = std::fs::remove_file(&self.path);
            self.held = false;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkingLock {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
#[path = "working_lock_tests.rs"]
mod tests;

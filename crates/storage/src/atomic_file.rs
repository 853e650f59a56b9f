// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic file write: write to a `.tmp` sibling, fsync it, then rename over
//! the destination. Prevents readers from ever observing a partially
//! written file, including across a crash mid-write.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Write `data` atomically to `path`.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp_path = tmp_path_for(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;

    if let Some(parent) = path.parent() {
        // Best-effort directory fsync so the rename itself is durable
        // across a crash. Not supported on all platforms (e.g. some
        // Windows filesystems); ignore failures.
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut tmp = path.to_path_buf();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("tmp");
    tmp.set_file_name(format!("{file_name}.tmp"));
    tmp
}

#[cfg(test)]
#[path = "atomic_file_tests.rs"]
mod tests;

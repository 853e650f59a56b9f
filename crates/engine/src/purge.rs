// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disk-pressure detection and the host tmp-dir / package-manager-cache
//! purge it triggers, run once at the top of every Builder iteration.

use std::path::{Path, PathBuf};

use crate::env::{disk_pressure_min_bytes, disk_pressure_min_fraction};

/// Whether `path`'s filesystem is under pressure: free space below the
/// fixed byte floor, or below the fixed fraction of total capacity.
pub fn is_under_pressure(path: &Path) -> bool {
    let (free, total) = match (fs2::available_space(path), fs2::total_space(path)) {
        (Ok(free), Ok(total)) => (free, total),
        _ => {
            tracing::warn!(path = %path.display(), "could not read filesystem stats, assuming no pressure");
            return false;
        }
    };
    if free < disk_pressure_min_bytes() {
        return true;
    }
    if total == 0 {
        return false;
    }
    (free as f64 / total as f64) < disk_pressure_min_fraction()
}

/// Whether either the root filesystem or the home filesystem is under
/// pressure, per spec (checked before every Builder iteration).
pub fn host_under_pressure() -> bool {
    let root = PathBuf::from("/");
    if is_under_pressure(&root) {
        return true;
    }
    if let Some(home) = dirs::home_dir() {
        if is_under_pressure(&home) {
            return true;
        }
    }
    false
}

/// Whether `entry` was created by this process's owning user, on POSIX.
/// Compared against the owner of the user's home directory rather than a
/// direct `getuid()` call, to avoid pulling in a libc binding for one
/// field.
#[cfg(unix)]
fn owned_by_current_user(entry: &std::path::Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    let Some(home) = dirs::home_dir() else {
        return false;
    };
    let (Ok(home_meta), Ok(entry_meta)) = (home.metadata(), entry.metadata()) else {
        return false;
    };
    home_meta.uid() == entry_meta.uid()
}

#[cfg(not(unix))]
fn owned_by_current_user(_entry: &std::path::Path) -> bool {
    true
}

/// Remove host-level tmp-dir entries whose name starts with `npm-` or
/// `git`, owned by the current user on POSIX. Best-effort: a single
/// removal failure is logged and skipped, not propagated.
pub fn purge_host_tmp_dirs() {
    let tmp = std::env::temp_dir();
    let Ok(read_dir) = std::fs::read_dir(&tmp) else {
        return;
    };
    for entry in read_dir.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !(name.starts_with("npm-") || name.starts_with("git")) {
            continue;
        }
        let path = entry.path();
        if !owned_by_current_user(&path) {
            continue;
        }
        let result = if entry.path().is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        if let Err(err) = result {
            tracing::warn!(path = %path.display(), %err, "failed to purge tmp entry");
        } else {
            tracing::info!(path = %path.display(), "purged tmp entry under disk pressure");
        }
    }
}

/// Remove the host package manager's download/build cache (`npm`'s cache
/// directory). Best-effort, identical failure handling to
/// [`purge_host_tmp_dirs`].
pub fn purge_package_manager_cache() {
    let Some(cache_dir) = dirs::cache_dir() else {
        return;
    };
    let npm_cache = cache_dir.join("npm");
    if !npm_cache.exists() {
        return;
    }
    if let Err(err) = std::fs::remove_dir_all(&npm_cache) {
        tracing::warn!(path = %npm_cache.display(), %err, "failed to purge package manager cache");
    } else {
        tracing::info!(path = %npm_cache.display(), "purged package manager cache under disk pressure");
    }
}

/// Run the full disk-pressure check-and-purge, as the Builder does before
/// each iteration. No-op when neither filesystem is under pressure.
pub fn purge_if_under_pressure() {
    if !host_under_pressure() {
        return;
    }
    tracing::warn!("host filesystem under disk pressure, purging tmp dirs and caches");
    purge_host_tmp_dirs();
    purge_package_manager_cache();
}

#[cfg(test)]
#[path = "purge_tests.rs"]
mod tests;

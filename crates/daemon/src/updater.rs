// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Updater: syncs the shared dependency cache (`data/{platforms,
//! compilers, plugins, libs, sdks}/`) from the object store, one iteration
//! per fixed interval.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use farm_adapters::object_store::ObjectStoreClient;
use farm_adapters::subprocess::{run_with_timeout, ARCHIVE_EXTRACT_TIMEOUT};
use farm_core::{Manifest, ManifestEntry, ServiceId};
use farm_storage::ManifestStore;
use tokio::process::Command;

use crate::error::ServiceError;
use crate::network::os_tag;
use crate::service::{Service, ServiceContext};

enum SyncStatus {
    Download,
    Ignore,
}

/// Where a relevant key's archive is extracted to, derived from its
/// `{folder}/{filename}` shape.
fn output_dir(root: &Path, key: &str) -> Option<PathBuf> {
    let (folder, filename) = key.split_once('/')?;
    match folder {
        "platforms" => {
            let name = filename.strip_suffix(".tar.bz2")?;
            Some(root.join("platforms").join(name))
        }
        "compilers" => {
            let version = filename
                .strip_prefix("compiler_cordova_")?
                .strip_suffix(".tar.bz2")?;
            Some(root.join("compilers").join(version))
        }
        "plugins" => {
            let name = filename.strip_suffix(".tar.bz2")?;
            Some(root.join("plugins").join(name))
        }
        "libs" => {
            let rest = filename.strip_suffix(".tar.bz2")?;
            let version = rest.rsplit_once('-')?.0;
            Some(root.join("libs").join(version))
        }
        "sdks" => {
            let name = filename.strip_suffix(".tar.bz2")?;
            Some(root.join("sdks").join(name))
        }
        _ => None,
    }
}

/// Whether `key` is relevant to this host: OS-suffixed folders only match
/// the current host's suffix, everything else tracked is unconditional.
fn is_relevant(key: &str) -> bool {
    let Some((folder, filename)) = key.split_once('/') else {
        return false;
    };
    match folder {
        "libs" | "sdks" => filename.ends_with(&format!("-{}.tar.bz2", os_tag())),
        "platforms" | "plugins" | "compilers" => true,
        _ => false,
    }
}

fn sync_status(entry: &ManifestEntry, prior: Option<&ManifestEntry>, out_dir: &Path) -> SyncStatus {
    if !out_dir.exists() {
        return SyncStatus::Download;
    }
    match prior {
        None => SyncStatus::Download,
        Some(prior) => {
            let remote = Manifest::normalize_timestamp(&entry.last_modified);
            let local = Manifest::normalize_timestamp(&prior.last_modified);
            if remote == local {
                SyncStatus::Ignore
            } else {
                SyncStatus::Download
            }
        }
    }
}

pub struct UpdaterService {
    object_store: std::sync::Arc<dyn ObjectStoreClient>,
}

impl UpdaterService {
    pub fn new(object_store: std::sync::Arc<dyn ObjectStoreClient>) -> Self {
        Self { object_store }
    }

    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ServiceError> {
        if dest.exists() {
            tokio::fs::remove_dir_all(dest).await?;
        }
        tokio::fs::create_dir_all(dest).await?;

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("bsdtar");
            c.arg("-xf").arg(archive);
            c
        } else {
            let mut c = Command::new("tar");
            c.arg("-jxf").arg(archive);
            c
        };
        cmd.current_dir(dest);

        let output = run_with_timeout(cmd, ARCHIVE_EXTRACT_TIMEOUT, "extracting cache archive")
            .await
            .map_err(ServiceError::Init)?;
        if !output.status.success() {
            return Err(ServiceError::Init(format!(
                "archive extraction exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Service for UpdaterService {
    fn id(&self) -> ServiceId {
        ServiceId::new("updater")
    }

    fn interval(&self) -> std::time::Duration {
        farm_adapters::env::updater_interval_ms()
    }

    async fn on_start(&mut self, ctx: &ServiceContext) -> Result<(), ServiceError> {
        tokio::fs::create_dir_all(ctx.root.data_dir()).await?;
        Ok(())
    }

    async fn run_iteration(&mut self, ctx: &ServiceContext) -> Result<(), ServiceError> {
        let sync_dir = ctx.root.sync_dir();
        if sync_dir.exists() {
            tokio::fs::remove_dir_all(&sync_dir).await?;
        }
        tokio::fs::create_dir_all(&sync_dir).await?;

        let manifest_store = ManifestStore::new(ctx.root.manifest_path());
        let prior = manifest_store
            .load()
            .map_err(|e| ServiceError::Init(e.to_string()))?
            .unwrap_or_default();
        let prior_by_key = prior.by_key();

        let bucket = ctx.environment.bucket_name();
        let listing = self
            .object_store
            .list_objects(bucket)
            .await
            .map_err(|e| ServiceError::Init(e.to_string()))?;

        let relevant: Vec<ManifestEntry> = listing.into_iter().filter(|e| is_relevant(&e.key)).collect();

        for entry in &relevant {
            let Some(out_dir) = output_dir(&ctx.root.data_dir(), &entry.key) else {
                continue;
            };
            let status = sync_status(entry, prior_by_key.get(entry.key.as_str()).copied(), &out_dir);
            if matches!(status, SyncStatus::Ignore) {
                continue;
            }

            let basename = entry
                .key
                .rsplit_once('/')
                .map(|(_, name)| name)
                .unwrap_or(&entry.key);
            let archive_path = sync_dir.join(basename);
            self.object_store
                .download_to(bucket, &entry.key, &archive_path)
                .await
                .map_err(|e| ServiceError::Init(e.to_string()))?;

            self.extract(&archive_path, &out_dir).await?;
        }

        let new_keys: std::collections::HashSet<&str> = relevant.iter().map(|e| e.key.as_str()).collect();
        for key in prior_by_key.keys().copied() {
            if !new_keys.contains(key) {
                if let Some(stale_dir) = output_dir(&ctx.root.data_dir(), key) {
                    if stale_dir.exists() {
                        tokio::fs::remove_dir_all(&stale_dir).await?;
                    }
                }
            }
        }

        let manifest = Manifest::new(relevant.clone());
        manifest_store
            .save(&manifest)
            .map_err(|e| ServiceError::Init(e.to_string()))?;

        if sync_dir.exists() {
            tokio::fs::remove_dir_all(&sync_dir).await?;
        }

        if !relevant.is_empty() {
            tokio::fs::File::create(ctx.root.ready_lock()).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "updater_tests.rs"]
mod tests;

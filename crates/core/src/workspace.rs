// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job workspace directory layout.

use crate::job::JobId;
use std::path::{Path, PathBuf};

crate::define_id! {
    /// Unique identifier for a workspace directory, derived from
    /// `(code, starttime)`.
    pub struct WorkspaceId;
}

impl WorkspaceId {
    /// Build the canonical `{code}_{starttime}` workspace id.
    pub fn for_job(code: &JobId, starttime: u64) -> Self {
        Self::new(format!("{}_{}", code, starttime))
    }
}

/// The fixed directory layout of a job workspace, rooted at
/// `projects/{code}_{starttime}/`.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    /// `projects_root` is the shared `projects/` directory; `id` selects
    /// this job's subtree within it.
    pub fn new(projects_root: &Path, id: &WorkspaceId) -> Self {
        Self {
            root: projects_root.join(id.as_str()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The native project copy, mutated only by the build child.
    pub fn workspace_dir(&self) -> PathBuf {
        self.root.join("workspace")
    }

    /// Zip-extraction staging area.
    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    pub fn certs_dir(&self) -> PathBuf {
        self.root.join("certs")
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.root.join("icons")
    }

    pub fn splashes_dir(&self) -> PathBuf {
        self.root.join("splashes")
    }

    /// Final artifact directory; pack() writes exactly one ZIP here.
    pub fn out_dir(&self) -> PathBuf {
        self.root.join("out")
    }

    pub fn config_json(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn config_xml(&self) -> PathBuf {
        self.root.join("config.xml")
    }

    pub fn source_zip(&self) -> PathBuf {
        self.root.join("source.zip")
    }

    pub fn cordova_log(&self) -> PathBuf {
        self.root.join("cordova.log")
    }

    pub fn stdout_log(&self) -> PathBuf {
        self.root.join("stdout.log")
    }

    /// Create the fixed subdirectory tree. Idempotent.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [
            self.workspace_dir(),
            self.tmp_dir(),
            self.certs_dir(),
            self.icons_dir(),
            self.splashes_dir(),
            self.out_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;

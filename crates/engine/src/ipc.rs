// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The build child's process contract: the arguments it's launched with
//! and the single terminal message it prints to stdout before exiting.
//! Shared between the Builder (which spawns the child) and the child
//! binary itself, so the two sides can never drift.

use std::path::PathBuf;

use farm_core::{Environment, Job, WorkspaceId, WorkspaceLayout};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::pipeline::{self, PipelineContext};
use crate::platform::backend_for;

/// Everything the child needs to reconstruct a [`PipelineContext`] without
/// depending on the parent's in-memory state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildChildArgs {
    pub job: Job,
    pub projects_root: PathBuf,
    pub config_root: Option<PathBuf>,
    pub data_root: PathBuf,
    pub environment: Environment,
    pub log_level: String,
}

/// The failure shape printed on the wire when the pipeline errors.
/// `msg_public` serializes as `msgPublic` per the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildChildFailure {
    pub message: String,
    #[serde(rename = "msgPublic")]
    pub msg_public: String,
}

impl From<BuildError> for BuildChildFailure {
    fn from(err: BuildError) -> Self {
        Self {
            message: err.message,
            msg_public: err.msg_public,
        }
    }
}

/// `None` on success, serializing to the literal `null` the parent expects
/// as its one terminal IPC message.
pub type BuildChildMessage = Option<BuildChildFailure>;

/// Run the five-stage pipeline for `args` and return the terminal message
/// the child should print to stdout. Never panics: every failure mode
/// becomes `Some(BuildChildFailure)`.
pub async fn run_build_child(args: &BuildChildArgs) -> BuildChildMessage {
    let workspace_id = WorkspaceId::for_job(&args.job.code, args.job.starttime);
    let workspace = WorkspaceLayout::new(&args.projects_root, &workspace_id);
    let ctx = PipelineContext {
        job: &args.job,
        workspace: &workspace,
        config_root: args.config_root.as_deref(),
        data_root: &args.data_root,
    };
    let backend = backend_for(args.job.platform);

    match pipeline::run(&ctx, backend.as_ref()).await {
        Ok(_zip_path) => None,
        Err(err) => Some(err.into()),
    }
}

#[cfg(test)]
#[path = "ipc_tests.rs"]
mod tests;

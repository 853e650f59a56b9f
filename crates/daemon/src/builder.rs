// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Builder: fetches one job, spawns the build-child pipeline process,
//! races its exit against a 45-minute watchdog, and enqueues the terminal
//! notification.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use farm_core::{Job, JobId, Notification, PlatformKind, ServiceId, WorkspaceId, WorkspaceLayout};
use farm_engine::BuildChildArgs;
use farm_storage::NotificationQueue;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::service::{Service, ServiceContext};

/// Hard limit on one build child's lifetime (spec: 45 minutes).
const BUILD_CHILD_TIMEOUT: Duration = Duration::from_millis(2_700_000);

/// Last bytes of `cordova.log` appended to a failure's public message.
const LOG_TAIL_BYTES: u64 = 10_000;

/// Replace the workspace root's and the current user's home directory's
/// absolute paths in captured build-child output before it's written to
/// disk, per spec step 4: neither belongs in a log an operator might share.
fn redact_paths(output: &str, workspace_root: &Path) -> String {
    let mut redacted = output.to_string();
    if let Some(workspace) = workspace_root.to_str() {
        redacted = redacted.replace(workspace, "<workspace>");
    }
    if let Some(home) = dirs::home_dir().as_deref().and_then(Path::to_str) {
        redacted = redacted.replace(home, "<home>");
    }
    redacted
}

/// Raw wire shape of a one-shot `config.json`, before the first-of-`platforms`
/// extraction collapses it to a [`Job`].
#[derive(Debug, Deserialize)]
struct RawJobPayload {
    code: Option<JobId>,
    platforms: Option<Vec<PlatformKind>>,
    config: Option<String>,
    source: Option<String>,
    #[serde(rename = "libVersion")]
    lib_version: Option<String>,
    #[serde(default)]
    key: Option<farm_core::SigningKey>,
    #[serde(default, rename = "iconUrl")]
    icon_url: Option<String>,
    #[serde(default, rename = "splashUrl")]
    splash_url: Option<String>,
}

impl RawJobPayload {
    fn into_job(self) -> Result<Job, ServiceError> {
        let code = self
            .code
            .ok_or_else(|| ServiceError::Init("missing required field: code".into()))?;
        let platforms = self
            .platforms
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ServiceError::Init("missing required field: platforms".into()))?;
        let config = self
            .config
            .ok_or_else(|| ServiceError::Init("missing required field: config".into()))?;
        let source = self
            .source
            .ok_or_else(|| ServiceError::Init("missing required field: source".into()))?;
        let lib_version = self
            .lib_version
            .ok_or_else(|| ServiceError::Init("missing required field: libVersion".into()))?;
        Ok(Job {
            code,
            starttime: 0,
            platform: platforms[0],
            key: self.key,
            icon_url: self.icon_url,
            splash_url: self.splash_url,
            config,
            source,
            lib_version,
        })
    }
}

/// The set of platforms this host's toolchain can build, announced to the
/// backend when requesting a job.
pub fn local_platforms() -> Vec<PlatformKind> {
    if cfg!(target_os = "macos") {
        vec![PlatformKind::Android, PlatformKind::Ios, PlatformKind::Osx]
    } else if cfg!(target_os = "windows") {
        vec![PlatformKind::Android, PlatformKind::Windows]
    } else {
        vec![PlatformKind::Android, PlatformKind::Ubuntu]
    }
}

enum RaceOutcome {
    Exited(std::io::Result<Output>),
    TimedOut,
}

pub struct BuilderService {
    one_shot_config_path: Option<PathBuf>,
    /// Path of this process's own executable, re-invoked as the build
    /// child with a `build-child` subcommand. Overridable for tests.
    child_exe: Option<PathBuf>,
    /// Outcome of the most recently enqueued notification. `None` until an
    /// iteration has actually enqueued one (e.g. it returned early because
    /// `ready.lock` was absent). One-shot callers use this to pick an exit
    /// code; the long-running daemon loop never reads it.
    last_outcome: Option<bool>,
}

impl BuilderService {
    pub fn new() -> Self {
        Self {
            one_shot_config_path: None,
            child_exe: None,
            last_outcome: None,
        }
    }

    pub fn one_shot(config_path: PathBuf) -> Self {
        Self {
            one_shot_config_path: Some(config_path),
            child_exe: None,
            last_outcome: None,
        }
    }

    /// Whether the job run by the most recently completed iteration
    /// succeeded. `None` if no notification has been enqueued yet.
    pub fn last_outcome(&self) -> Option<bool> {
        self.last_outcome
    }

    #[cfg(test)]
    fn with_child_exe(mut self, exe: PathBuf) -> Self {
        self.child_exe = Some(exe);
        self
    }

    async fn fetch_job(&self, ctx: &ServiceContext) -> Result<Job, ServiceError> {
        match &self.one_shot_config_path {
            Some(path) => {
                let bytes = tokio::fs::read(path).await?;
                let raw: RawJobPayload = serde_json::from_slice(&bytes)
                    .map_err(|e| ServiceError::Init(format!("malformed config.json: {e}")))?;
                raw.into_job()
            }
            None => ctx
                .backend
                .fetch_job(&local_platforms())
                .await
                .map_err(|e| ServiceError::Init(e.to_string())),
        }
    }

    async fn run_child(&self, args_path: &Path, workspace: &WorkspaceLayout) -> RaceOutcome {
        let exe = match &self.child_exe {
            Some(exe) => exe.clone(),
            None => match std::env::current_exe() {
                Ok(exe) => exe,
                Err(err) => return RaceOutcome::Exited(Err(err)),
            },
        };

        let mut cmd = Command::new(exe);
        cmd.arg("build-child").arg("--args").arg(args_path);
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => return RaceOutcome::Exited(Err(err)),
        };

        let stdout_log = workspace.stdout_log();
        let stdout_copy: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        if let Some(mut stdout) = child.stdout.take() {
            let stdout_copy = stdout_copy.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = stdout.read_to_end(&mut buf).await;
                *stdout_copy.lock() = buf;
            });
        }
        if let Some(mut stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf).await;
            });
        }

        tokio::select! {
            status = child.wait() => {
                let stdout = stdout_copy.lock().clone();
                let redacted = redact_paths(&String::from_utf8_lossy(&stdout), workspace.root());
                let _ = tokio::fs::write(&stdout_log, redacted.as_bytes()).await;
                match status {
                    Ok(status) => RaceOutcome::Exited(Ok(Output {
                        status,
                        stdout,
                        stderr: Vec::new(),
                    })),
                    Err(err) => RaceOutcome::Exited(Err(err)),
                }
            }
            _ = tokio::time::sleep(BUILD_CHILD_TIMEOUT) => {
                warn!("build child exceeded 45 minute watchdog, killing");
                let _ = child.start_kill();
                let _ = child.wait().await;
                let stdout = stdout_copy.lock().clone();
                let redacted = redact_paths(&String::from_utf8_lossy(&stdout), workspace.root());
                let _ = tokio::fs::write(&stdout_log, redacted.as_bytes()).await;
                RaceOutcome::TimedOut
            }
        }
    }

    async fn cordova_log_tail(workspace: &WorkspaceLayout) -> String {
        let path = workspace.cordova_log();
        let Ok(bytes) = tokio::fs::read(&path).await else {
            return String::new();
        };
        let start = bytes.len().saturating_sub(LOG_TAIL_BYTES as usize);
        String::from_utf8_lossy(&bytes[start..]).to_string()
    }
}

impl Default for BuilderService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for BuilderService {
    fn id(&self) -> ServiceId {
        ServiceId::new("builder")
    }

    fn interval(&self) -> Duration {
        farm_adapters::env::builder_poll_interval_ms()
    }

    async fn on_start(&mut self, ctx: &ServiceContext) -> Result<(), ServiceError> {
        tokio::fs::create_dir_all(ctx.root.projects_dir()).await?;
        Ok(())
    }

    async fn run_iteration(&mut self, ctx: &ServiceContext) -> Result<(), ServiceError> {
        if self.one_shot_config_path.is_none() && !ctx.root.ready_lock().exists() {
            return Ok(());
        }

        farm_engine::purge::purge_if_under_pressure();

        let job = self.fetch_job(ctx).await?;
        job.validate()
            .map_err(|e| ServiceError::Init(format!("invalid job: {e}")))?;
        let job = job.with_starttime(ctx.clock.epoch_ms());

        let workspace_id = WorkspaceId::for_job(&job.code, job.starttime);
        let workspace = WorkspaceLayout::new(&ctx.root.projects_dir(), &workspace_id);
        workspace.ensure_dirs()?;

        let job_json = serde_json::to_vec_pretty(&job)
            .map_err(|e| ServiceError::Init(format!("failed to serialize job: {e}")))?;
        tokio::fs::write(workspace.config_json(), &job_json).await?;

        let child_args = BuildChildArgs {
            job: job.clone(),
            projects_root: ctx.root.projects_dir(),
            config_root: self
                .one_shot_config_path
                .as_ref()
                .and_then(|p| p.parent().map(Path::to_path_buf)),
            data_root: ctx.root.data_dir(),
            environment: ctx.environment,
            log_level: "info".to_string(),
        };
        let args_path = workspace.root().join("build-child-args.json");
        let args_json = serde_json::to_vec(&child_args)
            .map_err(|e| ServiceError::Init(format!("failed to serialize build-child args: {e}")))?;
        tokio::fs::write(&args_path, &args_json).await?;

        let outcome = self.run_child(&args_path, &workspace).await;

        let notification = match outcome {
            RaceOutcome::TimedOut => Notification::failure(
                job.code.clone(),
                job.platform,
                job.starttime,
                "Compilation took too long, killing...",
                "The compilation exceed the designated time.",
            ),
            RaceOutcome::Exited(Err(io_err)) => Notification::failure(
                job.code.clone(),
                job.platform,
                job.starttime,
                format!("failed to spawn build child: {io_err}"),
                "Failed to start the build process.",
            ),
            RaceOutcome::Exited(Ok(output)) => {
                let terminal_line = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .last()
                    .unwrap_or("")
                    .to_string();
                match serde_json::from_str::<farm_engine::BuildChildMessage>(&terminal_line) {
                    Ok(None) => Notification::success(job.code.clone(), job.platform, job.starttime),
                    Ok(Some(failure)) => {
                        let tail = Self::cordova_log_tail(&workspace).await;
                        let msg_public = if tail.is_empty() {
                            failure.msg_public
                        } else {
                            format!("{}\nCORDOVA LOG:{}", failure.msg_public, tail)
                        };
                        Notification::failure(
                            job.code.clone(),
                            job.platform,
                            job.starttime,
                            failure.message,
                            msg_public,
                        )
                    }
                    Err(_) if output.status.success() => {
                        Notification::success(job.code.clone(), job.platform, job.starttime)
                    }
                    Err(_) => {
                        let tail = Self::cordova_log_tail(&workspace).await;
                        let message = format!(
                            "Process exited abnormally ({:?}): no terminal message",
                            output.status.code()
                        );
                        let msg_public = if tail.is_empty() {
                            message.clone()
                        } else {
                            format!("{message}\nCORDOVA LOG:{tail}")
                        };
                        Notification::failure(job.code.clone(), job.platform, job.starttime, message, msg_public)
                    }
                }
            }
        };

        self.last_outcome = Some(notification.is_success());

        let mut queue = NotificationQueue::open(ctx.root.notification_queue_path())
            .map_err(|e| ServiceError::Init(e.to_string()))?;
        queue
            .enqueue(notification, farm_core::NotificationId::new(ctx.id_gen.next()), ctx.clock.epoch_ms())
            .map_err(|e| ServiceError::Init(e.to_string()))?;

        if self.one_shot_config_path.is_some() {
            info!(code = %job.code, "one-shot build complete");
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;

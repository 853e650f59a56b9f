// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `farm-worker`: the entry point for all four sibling services plus the
//! internal `build-child` subcommand the Builder re-invokes itself as.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use farm_adapters::backend::HttpBackendClient;
use farm_adapters::object_store::S3ObjectStoreClient;
use farm_core::{Environment, FarmRoot, SystemClock, UuidIdGen};
use farm_daemon::admin::AdminApiService;
use farm_daemon::builder::BuilderService;
use farm_daemon::notifier::NotifierService;
use farm_daemon::updater::UpdaterService;
use farm_daemon::{Service, ServiceContext, ServiceRuntime};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "farm-worker", about = "Mobile-app build-farm worker services")]
struct Cli {
    /// Root of this environment's persisted state, `workspace/{env}/`.
    #[arg(long, env = "FARM_ROOT", default_value = "workspace")]
    root: PathBuf,

    /// Deployment environment: develop, testing, or production.
    #[arg(long, env = "FARM_ENVIRONMENT", default_value = "develop")]
    environment: Environment,

    /// Backend API base URL; defaults to the environment's fixed hostname.
    #[arg(long, env = "FARM_BACKEND_URL")]
    backend_url: Option<String>,

    /// Backend API bearer credential.
    #[arg(long, env = "FARM_BACKEND_TOKEN", default_value = "")]
    backend_token: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync the shared dependency cache from the object store.
    Updater,
    /// Poll for and build jobs.
    Builder {
        /// Build exactly one job from a local config.json instead of
        /// polling the backend.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Drain the notification queue and upload results to the backend.
    Notifier,
    /// Serve read-only sibling-service status over local HTTPS.
    Admin {
        #[arg(long, env = "FARM_ADMIN_TOKEN")]
        token: String,
        #[arg(long, env = "FARM_ADMIN_TLS_CERT")]
        tls_cert: PathBuf,
        #[arg(long, env = "FARM_ADMIN_TLS_KEY")]
        tls_key: PathBuf,
    },
    /// Internal: run one build in-process. The Builder spawns this as a
    /// subprocess; not meant to be invoked directly.
    BuildChild {
        #[arg(long)]
        args: PathBuf,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// `build-child` has its own exit convention (success iff the pipeline
/// produced no failure message), so it bypasses `run()`'s anyhow flow.
async fn run_build_child(args_path: &std::path::Path) -> anyhow::Result<std::process::ExitCode> {
    let bytes = tokio::fs::read(args_path)
        .await
        .with_context(|| format!("failed to read build-child args at {}", args_path.display()))?;
    let args: farm_engine::BuildChildArgs =
        serde_json::from_slice(&bytes).context("malformed build-child args")?;

    let message = farm_engine::run_build_child(&args).await;
    let is_success = message.is_none();
    let line = serde_json::to_string(&message).context("failed to serialize build-child message")?;
    println!("{line}");

    Ok(if is_success {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    })
}

async fn run_service<S: Service>(service: S, ctx: ServiceContext) -> anyhow::Result<()> {
    ServiceRuntime::new(service, ctx).run().await.context("service exited with an error")
}

async fn run_once<S: Service>(service: S, ctx: ServiceContext) -> anyhow::Result<S> {
    ServiceRuntime::new(service, ctx).run_once().await.context("one-shot run failed")
}

async fn run(cli: Cli) -> anyhow::Result<std::process::ExitCode> {
    if let Command::BuildChild { args } = &cli.command {
        return run_build_child(args).await;
    }

    init_logging();

    let root = FarmRoot::new(cli.root.clone());
    let backend_url = cli
        .backend_url
        .clone()
        .unwrap_or_else(|| format!("https://{}", cli.environment.backend_host()));
    let backend = Arc::new(
        HttpBackendClient::new(backend_url, cli.backend_token.clone())
            .context("failed to build backend client")?,
    );

    let ctx = ServiceContext {
        root,
        environment: cli.environment,
        backend,
        clock: Arc::new(SystemClock),
        id_gen: Arc::new(UuidIdGen),
    };

    let exit_code = match cli.command {
        Command::Updater => {
            let object_store = Arc::new(S3ObjectStoreClient::from_env().await);
            run_service(UpdaterService::new(object_store), ctx).await?;
            std::process::ExitCode::SUCCESS
        }
        Command::Builder { path: None } => {
            run_service(BuilderService::new(), ctx).await?;
            std::process::ExitCode::SUCCESS
        }
        Command::Builder { path: Some(path) } => {
            let service = run_once(BuilderService::one_shot(path), ctx).await?;
            // Spec: one-shot mode exits -1 (255 on an 8-bit POSIX exit status)
            // when the one job it ran failed, 0 otherwise.
            match service.last_outcome() {
                Some(false) => std::process::ExitCode::from(255),
                _ => std::process::ExitCode::SUCCESS,
            }
        }
        Command::Notifier => {
            run_service(NotifierService::new(), ctx).await?;
            std::process::ExitCode::SUCCESS
        }
        Command::Admin { token, tls_cert, tls_key } => {
            run_service(AdminApiService::new(token, tls_cert, tls_key), ctx).await?;
            std::process::ExitCode::SUCCESS
        }
        Command::BuildChild { .. } => unreachable!("handled above"),
    };

    Ok(exit_code)
}

/// Deduplicate an anyhow chain: thiserror variants built with `#[from]`
/// usually already fold the source's message into their own `Display`, so
/// only render "Caused by" when the chain adds information the top-level
/// message doesn't already contain.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for cause in err.chain().skip(1) {
        buf.push_str(&format!("\n\nCaused by: {cause}"));
    }
    buf
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", format_error(&err));
            std::process::ExitCode::FAILURE
        }
    }
}

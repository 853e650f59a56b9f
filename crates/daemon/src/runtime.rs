// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives one [`Service`] through `Created -> Starting -> Looping ->
//! Stopping -> Stopped`: working-lock bookkeeping, heartbeats, best-effort
//! registration, and crash isolation for per-iteration failures.

use crate::network::{hostname, local_ip, os_tag};
use crate::service::{Service, ServiceContext};
use farm_storage::WorkingLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuntimeState {
    Created,
    Starting,
    Looping,
    Stopping,
    Stopped,
}

/// Owns a service's lifecycle. Construct with [`ServiceRuntime::new`], then
/// call [`ServiceRuntime::run`] (loops until shutdown) or
/// [`ServiceRuntime::run_once`] (single iteration, for one-shot CLI modes).
pub struct ServiceRuntime<S: Service> {
    service: S,
    ctx: ServiceContext,
    state: RuntimeState,
    working: Arc<AtomicBool>,
}

impl<S: Service> ServiceRuntime<S> {
    pub fn new(service: S, ctx: ServiceContext) -> Self {
        Self {
            service,
            ctx,
            state: RuntimeState::Created,
            working: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run until a ctrl-c/SIGTERM shutdown signal arrives, looping
    /// `run_iteration` at `service.interval()` and heartbeating in the
    /// background.
    pub async fn run(mut self) -> Result<(), crate::error::ServiceError> {
        self.start().await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let heartbeat_handle = self.spawn_heartbeat(shutdown_rx.clone());

        self.state = RuntimeState::Looping;
        let mut shutdown_rx_loop = shutdown_rx;
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            let _ = shutdown_tx.send(true);
        });

        loop {
            if *shutdown_rx_loop.borrow() {
                break;
            }
            self.run_locked_iteration().await;

            tokio::select! {
                _ = tokio::time::sleep(self.service.interval()) => {}
                _ = shutdown_rx_loop.changed() => {
                    if *shutdown_rx_loop.borrow() {
                        break;
                    }
                }
            }
        }

        self.stop().await;
        heartbeat_handle.abort();
        Ok(())
    }

    /// Run exactly one iteration and return the service, without entering
    /// the loop or registering with the backend. Used for one-shot
    /// invocations (e.g. the Builder's `--path` flag), where the caller
    /// needs to inspect the service afterward (e.g. whether the one job it
    /// ran came out a success or a failure).
    pub async fn run_once(mut self) -> Result<S, crate::error::ServiceError> {
        self.service.on_start(&self.ctx).await?;
        self.run_locked_iteration().await;
        Ok(self.service)
    }

    async fn start(&mut self) -> Result<(), crate::error::ServiceError> {
        self.state = RuntimeState::Starting;
        self.service.on_start(&self.ctx).await?;
        self.register().await;
        Ok(())
    }

    /// Cooperative shutdown: wait for any in-flight iteration to finish
    /// before deregistering, polling at `stop_poll_interval_ms`.
    async fn stop(&mut self) {
        self.state = RuntimeState::Stopping;
        while self.working.load(Ordering::SeqCst) {
            tokio::time::sleep(crate::env::stop_poll_interval_ms()).await;
        }
        self.deregister().await;
        self.state = RuntimeState::Stopped;
    }

    async fn run_locked_iteration(&mut self) {
        let lock_path = WorkingLock::path_for(self.ctx.root.root(), &self.service.id().to_string());
        let mut lock = WorkingLock::new(lock_path);
        if let Err(err) = lock.acquire() {
            error!(service = %self.service.id(), "failed to acquire working lock: {err}");
            return;
        }
        self.working.store(true, Ordering::SeqCst);

        if let Err(err) = self.service.run_iteration(&self.ctx).await {
            error!(service = %self.service.id(), "iteration failed: {err}");
        }

        self.working.store(false, Ordering::SeqCst);
        lock.clear();
    }

    async fn register(&self) {
        if !self.ctx.environment.registers_with_backend() {
            return;
        }
        let ip = match local_ip() {
            Ok(ip) => ip.to_string(),
            Err(err) => {
                warn!("could not determine local ip, skipping registration: {err}");
                return;
            }
        };
        let host = hostname();
        let service_id = self.service.id();
        if let Err(err) = self.ctx.backend.register_host(&host, &ip, os_tag()).await {
            warn!("register_host failed: {err}");
        }
        if let Err(err) = self.ctx.backend.register_service(&ip, &service_id).await {
            warn!("register_service failed: {err}");
        }
    }

    async fn deregister(&self) {
        if !self.ctx.environment.registers_with_backend() {
            return;
        }
        let ip = match local_ip() {
            Ok(ip) => ip.to_string(),
            Err(err) => {
                warn!("could not determine local ip, skipping deregistration: {err}");
                return;
            }
        };
        if let Err(err) = self.ctx.backend.deregister(&ip, &self.service.id()).await {
            warn!("deregister failed: {err}");
        }
    }

    fn spawn_heartbeat(&self, mut shutdown_rx: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        let ctx = self.ctx.clone();
        let service_id = self.service.id();
        let registers = ctx.environment.registers_with_backend();
        tokio::spawn(async move {
            if !registers {
                return;
            }
            let mut interval = tokio::time::interval(crate::env::heartbeat_interval_ms());
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let ip = match local_ip() {
                            Ok(ip) => ip.to_string(),
                            Err(_) => continue,
                        };
                        if let Err(err) = ctx.backend.heartbeat(&ip, &service_id).await {
                            warn!("heartbeat failed: {err}");
                        } else {
                            info!(service = %service_id, "heartbeat sent");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;

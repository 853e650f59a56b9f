// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Service` contract every sibling process (Updater, Builder,
//! Notifier) implements, and the shared context they run against.

use crate::error::ServiceError;
use async_trait::async_trait;
use farm_adapters::BackendClient;
use farm_core::{Clock, Environment, FarmRoot, IdGen, ServiceId};
use std::sync::Arc;
use std::time::Duration;

/// Object-safe facade over [`IdGen`]: `IdGen` requires `Clone`, which rules
/// out `dyn IdGen` directly. Anything implementing `IdGen` gets this for
/// free via the blanket impl below.
pub trait DynIdGen: Send + Sync {
    fn next(&self) -> String;
}

impl<T: IdGen> DynIdGen for T {
    fn next(&self) -> String {
        IdGen::next(self)
    }
}

/// Everything a service needs to run one iteration: the persisted-state
/// root, the environment it's running in, and its backend/clock/id-gen
/// dependencies.
#[derive(Clone)]
pub struct ServiceContext {
    pub root: FarmRoot,
    pub environment: Environment,
    pub backend: Arc<dyn BackendClient>,
    pub clock: Arc<dyn Clock>,
    pub id_gen: Arc<dyn DynIdGen>,
}

/// One sibling process's run loop. `ServiceRuntime` drives this trait:
/// acquiring/releasing the working lock, heartbeating, and translating
/// an `Err` from `run_iteration` into a logged-and-swallowed failure
/// rather than a crash.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Stable identifier used for the working lock, registration, and log
    /// file naming.
    fn id(&self) -> ServiceId;

    /// Fixed delay between the end of one iteration and the start of the
    /// next.
    fn interval(&self) -> Duration;

    /// Run one iteration of this service's algorithm. Called with the
    /// working lock already held. An `Err` is logged at error level and
    /// does not stop the runtime from scheduling the next iteration.
    async fn run_iteration(&mut self, ctx: &ServiceContext) -> Result<(), ServiceError>;

    /// One-time setup before the first iteration (e.g. ensuring fixed
    /// directories exist). Failure here is fatal to the process.
    async fn on_start(&mut self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        Ok(())
    }
}

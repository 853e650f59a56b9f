// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! farm-engine: the build-child's five-stage pipeline (init, create,
//! prepare, build, pack), its per-platform backends, the build-child
//! watchdog race, and host disk-pressure cache purging.

pub mod env;
pub mod error;
pub mod fetch;
pub mod ipc;
pub mod logging;
pub mod pipeline;
pub mod platform;
pub mod purge;
pub mod watchdog;

pub use error::BuildError;
pub use ipc::{run_build_child, BuildChildArgs, BuildChildFailure, BuildChildMessage};
pub use pipeline::PipelineContext;
pub use platform::{backend_for, BuildDescriptor, PlatformBackend};
pub use watchdog::{spawn_watchdog, OnceLatch};

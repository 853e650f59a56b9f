// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PlatformBackend`: the capability set every target platform implements
//! for the build/pack stages of the pipeline. The source's `Builder` base
//! class with per-platform subclasses becomes this trait plus five
//! concrete implementations and a `shared` module of helpers common to
//! all of them (certs-folder creation, zip-output, artifact discovery).

pub mod android;
pub mod apple;
pub mod shared;
pub mod ubuntu;
pub mod windows;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::BuildError;
use crate::pipeline::PipelineContext;

pub use android::AndroidBackend;
pub use apple::AppleBackend;
pub use ubuntu::UbuntuBackend;
pub use windows::WindowsBackend;

/// Where `build_json` wrote the platform's signing/build descriptor, for
/// `build()` to consume.
#[derive(Debug, Clone)]
pub struct BuildDescriptor {
    pub path: PathBuf,
}

/// One target platform's build/pack implementation. `create_app_command`
/// and `find_identity_command` are Apple-only hooks (used by the shared
/// iOS/OSX backend's cleanup path); every other backend inherits the
/// default no-op.
#[async_trait]
pub trait PlatformBackend: Send + Sync {
    /// Emit the signing descriptor file the native tool consumes.
    async fn build_json(&self, ctx: &PipelineContext<'_>) -> Result<BuildDescriptor, BuildError>;

    /// Run the platform-specific build sequence.
    async fn build(
        &self,
        ctx: &PipelineContext<'_>,
        descriptor: &BuildDescriptor,
    ) -> Result<(), BuildError>;

    /// Locate produced artifacts and zip them into
    /// `out/{code}_{platform}_{epochmillis}.zip`.
    async fn pack(&self, ctx: &PipelineContext<'_>) -> Result<PathBuf, BuildError>;

    /// Apple-only: the shell command used to create the dedicated
    /// per-build keychain. `None` for non-Apple backends.
    fn create_app_command(&self, _ctx: &PipelineContext<'_>) -> Option<String> {
        None
    }

    /// Apple-only: the shell command used to extract the provisioning
    /// profile's UUID. `None` for non-Apple backends.
    fn find_identity_command(&self) -> Option<&'static str> {
        None
    }
}

/// Select the concrete backend for a job's platform.
pub fn backend_for(platform: farm_core::PlatformKind) -> Box<dyn PlatformBackend> {
    use farm_core::PlatformKind;
    match platform {
        PlatformKind::Android => Box::new(AndroidBackend),
        PlatformKind::Ios => Box::new(AppleBackend::ios()),
        PlatformKind::Osx => Box::new(AppleBackend::osx()),
        PlatformKind::Windows => Box::new(WindowsBackend),
        PlatformKind::Ubuntu => Box::new(UbuntuBackend),
    }
}

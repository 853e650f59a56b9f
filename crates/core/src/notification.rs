// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal job-outcome notification, enqueued by the Builder and drained by
//! the Notifier.

use crate::job::JobId;
use crate::platform::PlatformKind;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Opaque identifier assigned by the durable queue on enqueue.
    pub struct NotificationId;
}

/// Terminal record of a job's outcome. Absence of `msg_internal`/`msg_public`
/// means success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub code: JobId,
    pub platform: PlatformKind,
    pub starttime: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_internal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_public: Option<String>,
}

impl Notification {
    pub fn success(code: JobId, platform: PlatformKind, starttime: u64) -> Self {
        Self {
            code,
            platform,
            starttime,
            msg_internal: None,
            msg_public: None,
        }
    }

    pub fn failure(
        code: JobId,
        platform: PlatformKind,
        starttime: u64,
        msg_internal: impl Into<String>,
        msg_public: impl Into<String>,
    ) -> Self {
        Self {
            code,
            platform,
            starttime,
            msg_internal: Some(msg_internal.into()),
            msg_public: Some(msg_public.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.msg_public.is_none() && self.msg_internal.is_none()
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Once-latch and watchdog timer primitives used by the Builder to resolve
//! the race between a build child's terminal IPC message, its exit, and a
//! 45-minute hard timeout. The first of these to fire wins; the rest are
//! suppressed.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// A single-fire gate: the first caller to `fire()` wins, every later call
/// is a no-op. `wait()` resolves once some caller has won.
pub struct OnceLatch<T> {
    state: parking_lot::Mutex<Option<T>>,
    notify: Notify,
}

impl<T: Clone> Default for OnceLatch<T> {
    fn default() -> Self {
        Self {
            state: parking_lot::Mutex::new(None),
            notify: Notify::new(),
        }
    }
}

impl<T: Clone> OnceLatch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to resolve the latch with `value`. Returns `true` if this
    /// call was the one that won the race.
    pub fn fire(&self, value: T) -> bool {
        let mut guard = self.state.lock();
        if guard.is_some() {
            return false;
        }
        *guard = Some(value);
        self.notify.notify_waiters();
        true
    }

    pub fn is_resolved(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Wait for the latch to resolve, returning the winning value.
    pub async fn wait(&self) -> T {
        loop {
            if let Some(v) = self.state.lock().clone() {
                return v;
            }
            self.notify.notified().await;
        }
    }
}

/// Spawn a single-shot timer that fires `value` into `latch` after `timeout`
/// elapses, unless the latch has already been resolved by then. The
/// returned handle should be aborted once the caller observes the latch
/// resolved by some other means, to avoid an idle task outliving the job.
pub fn spawn_watchdog<T: Clone + Send + 'static>(
    latch: Arc<OnceLatch<T>>,
    timeout: Duration,
    value: T,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        if latch.fire(value) {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "watchdog fired");
        }
    })
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;

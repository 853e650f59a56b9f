// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Override for the Updater's fixed 60s sync interval (default: 60000ms).
pub fn updater_interval_ms() -> Duration {
    parse_duration_ms("FARM_UPDATER_INTERVAL_MS").unwrap_or(Duration::from_secs(60))
}

/// Override for the Builder's fixed 5s poll interval (default: 5000ms).
pub fn builder_poll_interval_ms() -> Duration {
    parse_duration_ms("FARM_BUILDER_POLL_INTERVAL_MS").unwrap_or(Duration::from_secs(5))
}

/// Override for the Notifier's fixed 5s drain interval (default: 5000ms).
pub fn notifier_poll_interval_ms() -> Duration {
    parse_duration_ms("FARM_NOTIFIER_POLL_INTERVAL_MS").unwrap_or(Duration::from_secs(5))
}

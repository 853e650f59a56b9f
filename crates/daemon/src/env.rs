// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Fixed heartbeat interval for every service (default: 60s).
pub fn heartbeat_interval_ms() -> Duration {
    parse_duration_ms("FARM_HEARTBEAT_INTERVAL_MS").unwrap_or(Duration::from_secs(60))
}

/// How often a busy service re-checks whether it can stop (default: 5s).
pub fn stop_poll_interval_ms() -> Duration {
    parse_duration_ms("FARM_STOP_POLL_INTERVAL_MS").unwrap_or(Duration::from_secs(5))
}

/// Fixed Admin API port.
pub fn admin_api_port() -> u16 {
    std::env::var("FARM_ADMIN_API_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(55555)
}

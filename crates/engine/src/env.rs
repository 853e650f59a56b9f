// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::path::PathBuf;
use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Override for the build-child watchdog (default: 2,700,000ms / 45min).
pub fn watchdog_timeout_ms() -> Duration {
    parse_duration_ms("FARM_WATCHDOG_TIMEOUT_MS").unwrap_or(Duration::from_millis(2_700_000))
}

/// Override for the low-disk-space purge threshold, in bytes (default: 1GiB).
pub fn disk_pressure_min_bytes() -> u64 {
    std::env::var("FARM_DISK_PRESSURE_MIN_BYTES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1024 * 1024 * 1024)
}

/// Override for the low-disk-space purge threshold, as a fraction of total
/// capacity (default: 0.25).
pub fn disk_pressure_min_fraction() -> f64 {
    std::env::var("FARM_DISK_PRESSURE_MIN_FRACTION")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.25)
}

/// Root of the Android SDK install, consulted by the Android backend to
/// accept licenses and locate `sdkmanager`/build tools.
pub fn android_sdk_root() -> PathBuf {
    std::env::var("FARM_ANDROID_SDK_ROOT")
        .or_else(|_| std::env::var("ANDROID_HOME"))
        .or_else(|_| std::env::var("ANDROID_SDK_ROOT"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/opt/android-sdk"))
}

/// Root of the Xcode developer tools, consulted by the Apple backend.
pub fn developer_dir() -> PathBuf {
    std::env::var("DEVELOPER_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/Applications/Xcode.app/Contents/Developer"))
}

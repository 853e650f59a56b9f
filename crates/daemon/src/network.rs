// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal host-identity lookups used by the registration protocol:
//! this host's outbound IP and its hostname, with no external service
//! dependency.

use std::net::{IpAddr, UdpSocket};

/// The IP this host would use to reach the outside world, discovered by
/// opening a UDP "connection" (no packet is actually sent) and reading
/// back the local address the kernel picked for the route.
pub fn local_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip())
}

/// Best-effort hostname lookup, falling back through `/etc/hostname`, the
/// `HOSTNAME` env var, and finally a fixed placeholder.
pub fn hostname() -> String {
    if let Ok(contents) = std::fs::read_to_string("/etc/hostname") {
        let trimmed = contents.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown-host".to_string())
}

/// Coarse OS tag for registration (`darwin`, `linux`, `win32`), matching
/// the suffix convention the Updater's cache keys use.
pub fn os_tag() -> &'static str {
    if cfg!(target_os = "macos") {
        "darwin"
    } else if cfg!(target_os = "windows") {
        "win32"
    } else {
        "linux"
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;

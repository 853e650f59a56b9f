// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service identifier, used to name the per-service working lockfile.

crate::define_id! {
    /// Identifies one of the four sibling services (`updater`, `builder`,
    /// `notifier`, `admin`) for lockfile naming and Admin API reporting.
    pub struct ServiceId;
}

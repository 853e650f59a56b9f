// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn success_notification_has_no_messages() {
    let n = Notification::success(JobId::new("A1"), PlatformKind::Android, 1);
    assert!(n.is_success());
}

#[test]
fn failure_notification_carries_both_messages() {
    let n = Notification::failure(
        JobId::new("A1"),
        PlatformKind::Android,
        1,
        "staff detail",
        "user-facing detail",
    );
    assert!(!n.is_success());
    assert_eq!(n.msg_internal.as_deref(), Some("staff detail"));
    assert_eq!(n.msg_public.as_deref(), Some("user-facing detail"));
}

#[test]
fn serializes_without_message_fields_when_absent() {
    let n = Notification::success(JobId::new("A1"), PlatformKind::Android, 1);
    let json = serde_json::to_value(&n).unwrap();
    assert!(json.get("msg_internal").is_none());
    assert!(json.get("msg_public").is_none());
}

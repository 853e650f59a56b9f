// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn uniform_copies_message_into_public() {
    let err = BuildError::uniform("disk full");
    assert_eq!(err.message, "disk full");
    assert_eq!(err.msg_public, "disk full");
}

#[test]
fn with_log_tail_appends_prefixed_tail() {
    let err = BuildError::new("gradle failed", "Build failed").with_log_tail("stack trace here");
    assert_eq!(err.msg_public, "Build failed\nCORDOVA LOG:stack trace here");
}

#[test]
fn with_log_tail_is_noop_on_empty_tail() {
    let err = BuildError::new("gradle failed", "Build failed").with_log_tail("");
    assert_eq!(err.msg_public, "Build failed");
}

#[test]
fn from_stage_tags_log_message_with_stage() {
    let err = BuildError::from_stage("init", "connection refused");
    assert_eq!(err.message, "init: connection refused");
    assert_eq!(err.msg_public, "connection refused");
}

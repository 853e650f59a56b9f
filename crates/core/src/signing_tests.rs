// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::platform::PlatformKind;

fn android_key() -> SigningKey {
    SigningKey::Android {
        keystore_url: "file:///k.keystore".into(),
        alias: "release".into(),
        store_password: "s".into(),
        key_password: "k".into(),
    }
}

#[test]
fn android_key_matches_only_android() {
    let key = android_key();
    assert!(key.matches(PlatformKind::Android));
    assert!(!key.matches(PlatformKind::Ios));
    assert!(!key.matches(PlatformKind::Windows));
}

#[test]
fn apple_key_matches_ios_and_osx() {
    let key = SigningKey::Apple {
        p12_url: "file:///c.p12".into(),
        provisioning_profile_url: "file:///p.mobileprovision".into(),
        password: "p".into(),
    };
    assert!(key.matches(PlatformKind::Ios));
    assert!(key.matches(PlatformKind::Osx));
    assert!(!key.matches(PlatformKind::Android));
}

#[test]
fn windows_key_matches_only_windows() {
    let key = SigningKey::Windows {
        pfx_url: "file:///c.pfx".into(),
        thumbprint: "ABC123".into(),
        publisher: "CN=Acme".into(),
    };
    assert!(key.matches(PlatformKind::Windows));
    assert!(!key.matches(PlatformKind::Ubuntu));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Ipc,
    Watchdog,
}

#[tokio::test]
async fn first_fire_wins_second_is_ignored() {
    let latch: OnceLatch<Outcome> = OnceLatch::new();
    assert!(latch.fire(Outcome::Ipc));
    assert!(!latch.fire(Outcome::Watchdog));
    assert_eq!(latch.wait().await, Outcome::Ipc);
}

#[tokio::test]
async fn wait_blocks_until_fired() {
    let latch = Arc::new(OnceLatch::<Outcome>::new());
    let waiter = {
        let latch = latch.clone();
        tokio::spawn(async move { latch.wait().await })
    };
    tokio::task::yield_now().await;
    assert!(!latch.is_resolved());
    latch.fire(Outcome::Ipc);
    assert_eq!(waiter.await.unwrap(), Outcome::Ipc);
}

#[tokio::test(start_paused = true)]
async fn watchdog_fires_after_timeout_if_not_already_resolved() {
    let latch = Arc::new(OnceLatch::<Outcome>::new());
    let handle = spawn_watchdog(latch.clone(), Duration::from_millis(100), Outcome::Watchdog);
    tokio::time::advance(Duration::from_millis(150)).await;
    handle.await.unwrap();
    assert_eq!(latch.wait().await, Outcome::Watchdog);
}

#[tokio::test(start_paused = true)]
async fn watchdog_is_suppressed_by_earlier_resolution() {
    let latch = Arc::new(OnceLatch::<Outcome>::new());
    latch.fire(Outcome::Ipc);
    let handle = spawn_watchdog(latch.clone(), Duration::from_millis(100), Outcome::Watchdog);
    tokio::time::advance(Duration::from_millis(150)).await;
    handle.await.unwrap();
    assert_eq!(latch.wait().await, Outcome::Ipc);
}

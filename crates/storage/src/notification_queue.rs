// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable host-local notification queue with visibility-timeout semantics.
//!
//! Modeled on the group-commit JSONL write-ahead log idiom: every state
//! change is appended as one JSON line before it takes effect in memory, so
//! the queue can be replayed to an identical state after a crash. Unlike a
//! replay-only event log, entries here are periodically compacted (dead
//! acked entries dropped, live entries folded to their latest state) since
//! the queue is consumed, not replayed end-to-end.

use crate::atomic_file;
use farm_core::{Notification, NotificationId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum LogOp {
    Enqueue {
        id: NotificationId,
        notification: Notification,
        enqueued_at_ms: u64,
    },
    Dequeue {
        id: NotificationId,
        tries: u32,
        visible_at_ms: u64,
    },
    Ping {
        id: NotificationId,
        visible_at_ms: u64,
    },
    Ack {
        id: NotificationId,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    notification: Notification,
    enqueued_at_ms: u64,
    tries: u32,
    /// 0 means immediately visible.
    visible_at_ms: u64,
}

/// One message handed back by [`NotificationQueue::dequeue`].
#[derive(Debug, Clone)]
pub struct DequeuedNotification {
    pub id: NotificationId,
    pub notification: Notification,
    /// Number of times this message has now been delivered, including this one.
    pub tries: u32,
}

/// A durable, crash-safe FIFO-ish queue of [`Notification`]s.
///
/// Dequeued messages are hidden from further `dequeue` calls until either
/// `ack`ed (permanent removal) or the visibility window passes, at which
/// point they become visible again for redelivery.
pub struct NotificationQueue {
    path: PathBuf,
    log: File,
    /// Insertion order, oldest first; entries are never reordered, only removed.
    order: Vec<NotificationId>,
    entries: HashMap<NotificationId, Entry>,
    ops_since_compact: u32,
}

/// Compact the log after this many appended ops, bounding unbounded growth
/// from repeated ping/dequeue cycles on long-lived retries.
const COMPACT_THRESHOLD: u32 = 256;

impl NotificationQueue {
    /// Open (creating if absent) the queue log at `path`, replaying any
    /// existing entries into memory.
    pub fn open(path: PathBuf) -> Result<Self, QueueError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (order, entries) = Self::replay(&path)?;

        let log = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            log,
            order,
            entries,
            ops_since_compact: 0,
        })
    }

    fn replay(path: &Path) -> Result<(Vec<NotificationId>, HashMap<NotificationId, Entry>), QueueError> {
        let mut order = Vec::new();
        let mut entries: HashMap<NotificationId, Entry> = HashMap::new();

        if !path.exists() {
            return Ok((order, entries));
        }

        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let op: LogOp = match serde_json::from_str(&line) {
                Ok(op) => op,
                Err(err) => {
                    // A malformed line is almost always a torn write from a
                    // crash mid-append; treat it as the truncated tail and
                    // keep whatever was durably written before it.
                    warn!(path = %path.display(), %err, "discarding truncated notification queue tail");
                    break;
                }
            };
            match op {
                LogOp::Enqueue {
                    id,
                    notification,
                    enqueued_at_ms,
                } => {
                    if !entries.contains_key(&id) {
                        order.push(id.clone());
                    }
                    entries.insert(
                        id,
                        Entry {
                            notification,
                            enqueued_at_ms,
                            tries: 0,
                            visible_at_ms: 0,
                        },
                    );
                }
                LogOp::Dequeue {
                    id,
                    tries,
                    visible_at_ms,
                } => {
                    if let Some(entry) = entries.get_mut(&id) {
                        entry.tries = tries;
                        entry.visible_at_ms = visible_at_ms;
                    }
                }
                LogOp::Ping { id, visible_at_ms } => {
                    if let Some(entry) = entries.get_mut(&id) {
                        entry.visible_at_ms = visible_at_ms;
                    }
                }
                LogOp::Ack { id } => {
                    entries.remove(&id);
                    order.retain(|existing| existing != &id);
                }
            }
        }

        Ok((order, entries))
    }

    fn append(&mut self, op: &LogOp) -> Result<(), QueueError> {
        let mut line = serde_json::to_string(op)?;
        line.push('\n');
        self.log.write_all(line.as_bytes())?;
        self.log.flush()?;
        self.ops_since_compact += 1;
        if self.ops_since_compact >= COMPACT_THRESHOLD {
            self.compact()?;
        }
        Ok(())
    }

    /// Enqueue a notification, immediately visible to the next `dequeue`.
    pub fn enqueue(&mut self, notification: Notification, id: NotificationId, now_ms: u64) -> Result<(), QueueError> {
        let op = LogOp::Enqueue {
            id: id.clone(),
            notification: notification.clone(),
            enqueued_at_ms: now_ms,
        };
        self.append(&op)?;
        self.order.push(id.clone());
        self.entries.insert(
            id,
            Entry {
                notification,
                enqueued_at_ms: now_ms,
                tries: 0,
                visible_at_ms: 0,
            },
        );
        Ok(())
    }

    /// Pop the oldest currently-visible message, hiding it for `visibility`.
    pub fn dequeue(
        &mut self,
        now_ms: u64,
        visibility: Duration,
    ) -> Result<Option<DequeuedNotification>, QueueError> {
        let Some(id) = self
            .order
            .iter()
            .find(|id| {
                self.entries
                    .get(*id)
                    .is_some_and(|e| e.visible_at_ms <= now_ms)
            })
            .cloned()
        else {
            return Ok(None);
        };

        let visible_at_ms = now_ms + visibility.as_millis() as u64;
        let Some(entry) = self.entries.get_mut(&id) else {
            // `id` came straight from `self.order`, so this is unreachable in
            // practice; treat it the same as "nothing visible" rather than panic.
            return Ok(None);
        };
        entry.tries += 1;
        entry.visible_at_ms = visible_at_ms;
        let tries = entry.tries;
        let notification = entry.notification.clone();

        self.append(&LogOp::Dequeue {
            id: id.clone(),
            tries,
            visible_at_ms,
        })?;

        Ok(Some(DequeuedNotification {
            id,
            notification,
            tries,
        }))
    }

    /// Extend the visibility window for an in-flight message.
    pub fn ping(&mut self, id: &NotificationId, now_ms: u64, visibility: Duration) -> Result<(), QueueError> {
        let visible_at_ms = now_ms + visibility.as_millis() as u64;
        if let Some(entry) = self.entries.get_mut(id) {
            entry.visible_at_ms = visible_at_ms;
        }
        self.append(&LogOp::Ping {
            id: id.clone(),
            visible_at_ms,
        })
    }

    /// Permanently remove a message (successful delivery or discard-after-retries).
    pub fn ack(&mut self, id: &NotificationId) -> Result<(), QueueError> {
        self.entries.remove(id);
        self.order.retain(|existing| existing != id);
        self.append(&LogOp::Ack { id: id.clone() })
    }

    /// Current tries count for a message still in the queue.
    pub fn tries(&self, id: &NotificationId) -> Option<u32> {
        self.entries.get(id).map(|e| e.tries)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rewrite the log keeping only the live entries' current state,
    /// dropping acked history. Safe to interrupt: uses an atomic rename.
    pub fn compact(&mut self) -> Result<(), QueueError> {
        let mut buf = Vec::new();
        for id in &self.order {
            let entry = &self.entries[id];
            let enqueue = LogOp::Enqueue {
                id: id.clone(),
                notification: entry.notification.clone(),
                enqueued_at_ms: entry.enqueued_at_ms,
            };
            buf.extend_from_slice(serde_json::to_string(&enqueue)?.as_bytes());
            buf.push(b'\n');
            if entry.visible_at_ms > 0 || entry.tries > 0 {
                let dequeue = LogOp::Dequeue {
                    id: id.clone(),
                    tries: entry.tries,
                    visible_at_ms: entry.visible_at_ms,
                };
                buf.extend_from_slice(serde_json::to_string(&dequeue)?.as_bytes());
                buf.push(b'\n');
            }
        }
        atomic_file::write_atomic(&self.path, &buf)?;
        self.log = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.ops_since_compact = 0;
        Ok(())
    }
}

#[cfg(test)]
#[path = "notification_queue_tests.rs"]
mod tests;

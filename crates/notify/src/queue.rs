// SPDX-License-Identifier: MIT

//! Retry queue for notifications deferred by DND, filters, or throttling
//! (spec §4.8 "Queue").

use chrono::{DateTime, Utc};
use mcpweaver_core::Priority;

use crate::models::{SystemNotification, Toast};

#[derive(Debug, Clone)]
pub enum QueuedKind {
    Toast(Toast),
    System(SystemNotification),
}

#[derive(Debug, Clone)]
pub struct QueuedNotification {
    pub kind: QueuedKind,
    pub queued_at: DateTime<Utc>,
    pub priority: Priority,
    pub attempts: u32,
    pub max_attempts: u32,
}

impl QueuedNotification {
    pub fn new_toast(toast: Toast, queued_at: DateTime<Utc>, max_attempts: u32) -> Self {
        Self { priority: toast.priority, kind: QueuedKind::Toast(toast), queued_at, attempts: 0, max_attempts }
    }

    pub fn new_system(notif: SystemNotification, queued_at: DateTime<Utc>, max_attempts: u32) -> Self {
        let priority = notif.urgency.to_priority();
        Self { priority, kind: QueuedKind::System(notif), queued_at, attempts: 0, max_attempts }
    }
}

/// Bounded ring, re-sorted by priority descending after every push; the
/// oldest entry (by `queued_at`) is dropped to make room when full.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    items: Vec<QueuedNotification>,
    max_size: usize,
}

impl NotificationQueue {
    pub fn new(max_size: usize) -> Self {
        Self { items: Vec::new(), max_size }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: QueuedNotification) {
        if self.max_size == 0 {
            return;
        }
        if self.items.len() >= self.max_size {
            if let Some(oldest_idx) = self.items.iter().enumerate().min_by_key(|(_, q)| q.queued_at).map(|(i, _)| i) {
                self.items.remove(oldest_idx);
            }
        }
        self.items.push(item);
        // Stable sort: ties keep insertion order, preserving FIFO within a
        // priority (spec §5 "within a single category/priority, delivery
        // preserves enqueue order").
        self.items.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn pop_front(&mut self) -> Option<QueuedNotification> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    pub fn peek_front(&self) -> Option<&QueuedNotification> {
        self.items.first()
    }

    pub fn requeue(&mut self, mut item: QueuedNotification) -> bool {
        item.attempts += 1;
        if item.attempts >= item.max_attempts {
            return false;
        }
        self.items.push(item);
        self.items.sort_by(|a, b| b.priority.cmp(&a.priority));
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

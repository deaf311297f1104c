// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mcpweaver-notify: Notification Service (C8) — toast and system delivery,
//! DND, throttling, filters, a bounded retry queue, stats, and durable
//! history (spec §4.8).

pub mod config;
pub mod dnd;
pub mod filter;
pub mod models;
pub mod queue;
pub mod service;
pub mod stats;
pub mod throttle;
pub mod ui_bridge;

pub use config::NotificationConfig;
pub use dnd::DndSchedule;
pub use filter::{FilterAction, FilterCondition, FilterOutcome, NotificationFilter};
pub use models::{
    HistoryRecord, HistorySource, NewSystemNotification, NewToast, NotificationAction, SystemNotification,
    SystemNotificationId, Toast, ToastId, ToastType,
};
pub use queue::{NotificationQueue, QueuedKind, QueuedNotification};
pub use service::{NotificationService, SystemOutcome, ToastOutcome};
pub use stats::{Bucket, NotificationStats};
pub use throttle::{ThrottleConfig, ThrottleRule, ThrottleTracker};
pub use ui_bridge::{DialogType, NativeDialogRequest, UiBridge};

// SPDX-License-Identifier: MIT

//! Notification data model (spec §3 "Toast", "SystemNotification",
//! "HistoryRecord").

use chrono::{DateTime, Utc};
use mcpweaver_core::{Metadata, Priority, Urgency};
use std::time::Duration;

mcpweaver_core::define_hex_id! {
    /// Unique identifier for a toast notification.
    pub struct ToastId("toast_", 16);
}

mcpweaver_core::define_hex_id! {
    /// Unique identifier for a system (desktop) notification.
    pub struct SystemNotificationId("sysnotif_", 16);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastType {
    Info,
    Success,
    Warning,
    Error,
    Loading,
    Custom,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NotificationAction {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub data: Metadata,
}

/// A transient, UI-presented toast notification (spec §3 "Toast").
/// Invariant: `persistent ⇒ !auto_dismiss`; if `!persistent` then
/// `expires_at = created_at + duration`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastType,
    pub title: String,
    pub message: String,
    pub icon: Option<String>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    pub position: String,
    pub actions: Vec<NotificationAction>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub persistent: bool,
    pub auto_dismiss: bool,
    pub priority: Priority,
    pub category: String,
    pub progress: Option<f64>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Caller-supplied fields for a new toast; defaults and derived fields
/// (`id`, `created_at`, `expires_at`, `auto_dismiss`) are stamped by the
/// service (spec §4.8 "ShowToast" step 5).
#[derive(Debug, Clone)]
pub struct NewToast {
    pub kind: ToastType,
    pub title: String,
    pub message: String,
    pub icon: Option<String>,
    pub duration: Duration,
    pub position: String,
    pub actions: Vec<NotificationAction>,
    pub persistent: bool,
    pub priority: Priority,
    pub category: String,
    pub progress: Option<f64>,
    pub metadata: Metadata,
}

impl Default for NewToast {
    fn default() -> Self {
        Self {
            kind: ToastType::Info,
            title: String::new(),
            message: String::new(),
            icon: None,
            duration: Duration::ZERO,
            position: "top-right".to_string(),
            actions: Vec::new(),
            persistent: false,
            priority: Priority::Medium,
            category: "general".to_string(),
            progress: None,
            metadata: Metadata::new(),
        }
    }
}

impl NewToast {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), ..Default::default() }
    }

    mcpweaver_core::setters! {
        into { category: String, position: String }
        set { kind: ToastType, duration: Duration, persistent: bool, priority: Priority, progress: Option<f64> }
    }
}

/// A persistent, OS-presented notification (spec §3 "SystemNotification").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SystemNotification {
    pub id: SystemNotificationId,
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub urgency: Urgency,
    pub actions: Vec<NotificationAction>,
    pub category: String,
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    pub silent: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone)]
pub struct NewSystemNotification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub urgency: Urgency,
    pub actions: Vec<NotificationAction>,
    pub category: String,
    pub timeout: Duration,
    pub silent: bool,
    pub metadata: Metadata,
}

impl Default for NewSystemNotification {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            icon: None,
            urgency: Urgency::Normal,
            actions: Vec::new(),
            category: "general".to_string(),
            timeout: Duration::from_secs(10),
            silent: false,
            metadata: Metadata::new(),
        }
    }
}

impl NewSystemNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into(), ..Default::default() }
    }

    mcpweaver_core::setters! {
        into { category: String }
        set { urgency: Urgency, timeout: Duration, silent: bool }
    }
}

/// The delivery channel a history row originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    Toast,
    System,
}

/// Union projection of a delivered Toast/System notification plus lifecycle
/// timestamps (spec §3 "HistoryRecord"). Transitions unread→read and
/// present→dismissed/interacted are monotonic (set once).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub source: HistorySource,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub icon: Option<String>,
    pub actions: Vec<NotificationAction>,
    pub category: String,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub interacted_at: Option<DateTime<Utc>>,
    pub action_taken: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl HistoryRecord {
    pub fn from_toast(toast: &Toast) -> Self {
        Self {
            id: toast.id.as_str().to_string(),
            source: HistorySource::Toast,
            kind: format!("{:?}", toast.kind).to_lowercase(),
            title: toast.title.clone(),
            message: toast.message.clone(),
            icon: toast.icon.clone(),
            actions: toast.actions.clone(),
            category: toast.category.clone(),
            priority: toast.priority,
            created_at: toast.created_at,
            read_at: None,
            dismissed_at: None,
            interacted_at: None,
            action_taken: None,
            metadata: toast.metadata.clone(),
        }
    }

    pub fn from_system(notif: &SystemNotification) -> Self {
        Self {
            id: notif.id.as_str().to_string(),
            source: HistorySource::System,
            kind: "system".to_string(),
            title: notif.title.clone(),
            message: notif.body.clone(),
            icon: notif.icon.clone(),
            actions: notif.actions.clone(),
            category: notif.category.clone(),
            priority: notif.urgency.to_priority(),
            created_at: notif.created_at,
            read_at: None,
            dismissed_at: None,
            interacted_at: None,
            action_taken: None,
            metadata: notif.metadata.clone(),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

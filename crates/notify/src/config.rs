// SPDX-License-Identifier: MIT

//! Notification Service configuration: delivery toggles, admission limits,
//! throttling, filters, and DND (spec §4.8).

use std::time::Duration;

use crate::dnd::DndSchedule;
use crate::filter::NotificationFilter;
use crate::throttle::ThrottleConfig;

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub notifications_enabled: bool,
    pub toasts_enabled: bool,
    pub system_enabled: bool,
    pub max_toast_notifications: usize,
    pub default_duration: Duration,
    pub history_retention: chrono::Duration,
    pub history_cache_cap: usize,
    pub drain_rate: Duration,
    pub max_queue_size: usize,
    pub max_attempts: u32,
    pub dnd_mode: bool,
    pub dnd_schedule: Option<DndSchedule>,
    pub throttle: ThrottleConfig,
    pub filters: Vec<NotificationFilter>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            toasts_enabled: true,
            system_enabled: true,
            max_toast_notifications: 5,
            default_duration: Duration::from_secs(5),
            history_retention: chrono::Duration::days(30),
            history_cache_cap: 1000,
            drain_rate: Duration::from_secs(1),
            max_queue_size: 100,
            max_attempts: 3,
            dnd_mode: false,
            dnd_schedule: None,
            throttle: ThrottleConfig::default(),
            filters: Vec::new(),
        }
    }
}

impl NotificationConfig {
    mcpweaver_core::setters! {
        set {
            notifications_enabled: bool,
            toasts_enabled: bool,
            system_enabled: bool,
            max_toast_notifications: usize,
            default_duration: Duration,
            history_retention: chrono::Duration,
            drain_rate: Duration,
            max_queue_size: usize,
            max_attempts: u32,
            dnd_mode: bool,
            dnd_schedule: Option<DndSchedule>,
            throttle: ThrottleConfig,
            filters: Vec<NotificationFilter>
        }
    }
}

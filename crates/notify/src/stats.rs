// SPDX-License-Identifier: MIT

//! Notification statistics (spec §4.8 "Statistics"): monotonic counters,
//! per-category/priority buckets, and hour-of-day/weekday distributions.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Timelike, Utc};
use mcpweaver_core::Priority;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Bucket {
    pub sent: u64,
    pub read: u64,
    pub dismissed: u64,
    pub interacted: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total_sent: u64,
    pub total_toast: u64,
    pub total_system: u64,
    pub total_read: u64,
    pub total_dismissed: u64,
    pub total_interacted: u64,
    pub by_category: HashMap<String, Bucket>,
    pub by_priority: HashMap<Priority, Bucket>,
    /// Index 0..23, count of sends in that hour of day.
    pub by_hour_of_day: [u64; 24],
    /// Index 0..6, `Weekday::num_days_from_sunday()` convention.
    pub by_weekday: [u64; 7],
}

impl NotificationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_toast_sent(&mut self, category: &str, priority: Priority, at: DateTime<Utc>) {
        self.total_sent += 1;
        self.total_toast += 1;
        self.by_category.entry(category.to_string()).or_default().sent += 1;
        self.by_priority.entry(priority).or_default().sent += 1;
        self.by_hour_of_day[at.hour() as usize] += 1;
        self.by_weekday[at.weekday().num_days_from_sunday() as usize] += 1;
    }

    pub fn record_system_sent(&mut self, category: &str, priority: Priority, at: DateTime<Utc>) {
        self.total_sent += 1;
        self.total_system += 1;
        self.by_category.entry(category.to_string()).or_default().sent += 1;
        self.by_priority.entry(priority).or_default().sent += 1;
        self.by_hour_of_day[at.hour() as usize] += 1;
        self.by_weekday[at.weekday().num_days_from_sunday() as usize] += 1;
    }

    pub fn record_read(&mut self, category: &str, priority: Priority) {
        self.total_read += 1;
        self.by_category.entry(category.to_string()).or_default().read += 1;
        self.by_priority.entry(priority).or_default().read += 1;
    }

    pub fn record_dismissed(&mut self, category: &str, priority: Priority) {
        self.total_dismissed += 1;
        self.by_category.entry(category.to_string()).or_default().dismissed += 1;
        self.by_priority.entry(priority).or_default().dismissed += 1;
    }

    pub fn record_interacted(&mut self, category: &str, priority: Priority) {
        self.total_interacted += 1;
        self.by_category.entry(category.to_string()).or_default().interacted += 1;
        self.by_priority.entry(priority).or_default().interacted += 1;
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;

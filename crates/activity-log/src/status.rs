// SPDX-License-Identifier: MIT

//! `GetApplicationStatus` (spec §4.4 "Status").

use chrono::{DateTime, Utc};

use crate::entry::LogEntry;
use mcpweaver_core::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    Idle,
    Working,
    Warning,
    Error,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SystemHealth {
    pub error_count_5m: usize,
    pub warn_count_5m: usize,
    pub entries_total: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ApplicationStatus {
    pub status: AppStatus,
    pub message: String,
    pub active_operations: usize,
    pub last_update: DateTime<Utc>,
    pub system_health: SystemHealth,
}

/// Derive application status from a buffer snapshot, newest-first ordering
/// not required (spec §4.4 "Status"):
/// - `Error` if any `Error`+ entry in the last 5 minutes.
/// - else `Warning` if any `Warn` entry in the last 5 minutes.
/// - else `Working` if any user-action entry in the last minute.
/// - else `Idle`.
pub fn derive_status(entries: &[LogEntry], now: DateTime<Utc>) -> ApplicationStatus {
    let five_min_ago = now - chrono::Duration::minutes(5);
    let one_min_ago = now - chrono::Duration::minutes(1);

    let error_count_5m = entries.iter().filter(|e| e.ts >= five_min_ago && e.level >= Level::Error).count();
    let warn_count_5m = entries.iter().filter(|e| e.ts >= five_min_ago && e.level == Level::Warn).count();
    let active_operations = entries.iter().filter(|e| e.ts >= one_min_ago && e.user_action).count();

    let (status, message) = if error_count_5m > 0 {
        (AppStatus::Error, format!("{error_count_5m} error(s) in the last 5 minutes"))
    } else if warn_count_5m > 0 {
        (AppStatus::Warning, format!("{warn_count_5m} warning(s) in the last 5 minutes"))
    } else if active_operations > 0 {
        (AppStatus::Working, format!("{active_operations} active operation(s)"))
    } else {
        (AppStatus::Idle, "idle".to_string())
    };

    ApplicationStatus {
        status,
        message,
        active_operations,
        last_update: now,
        system_health: SystemHealth { error_count_5m, warn_count_5m, entries_total: entries.len() },
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Log entry type and filters (spec §3 "LogEntry", §4.4 "Filter").

use chrono::{DateTime, Utc};
use mcpweaver_core::{Level, Metadata};

mcpweaver_core::define_hex_id! {
    /// Unique identifier for a log entry. Collisions are tolerated
    /// at-most-one-per-buffer given 8 bytes of randomness (spec §3).
    pub struct LogEntryId("log_", 16);
}

/// Immutable-after-append structured log entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,
    pub ts: DateTime<Utc>,
    pub level: Level,
    pub component: String,
    pub operation: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub user_action: bool,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Caller-supplied fields for a new entry; `id`/`ts` are stamped by the
/// service on append.
#[derive(Debug, Clone, Default)]
pub struct NewLogEntry {
    pub level: Level,
    pub component: String,
    pub operation: String,
    pub message: String,
    pub details: Option<String>,
    pub duration_ms: Option<u64>,
    pub project_id: Option<String>,
    pub user_action: bool,
    pub metadata: Metadata,
}

impl NewLogEntry {
    pub fn new(component: impl Into<String>, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            component: component.into(),
            operation: operation.into(),
            message: message.into(),
            details: None,
            duration_ms: None,
            project_id: None,
            user_action: false,
            metadata: Metadata::new(),
        }
    }

    mcpweaver_core::setters! {
        set { level: Level, user_action: bool }
        option { details: String, project_id: String }
    }

    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Filter applied after a buffer snapshot (spec §4.4). An empty filter
/// matches all entries.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub level: Option<Level>,
    pub component: Option<String>,
    pub operation: Option<String>,
    pub project_id: Option<String>,
    pub user_action: Option<bool>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl LogFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = self.level {
            if entry.level != level {
                return false;
            }
        }
        if let Some(component) = &self.component {
            if !entry.component.to_lowercase().contains(&component.to_lowercase()) {
                return false;
            }
        }
        if let Some(operation) = &self.operation {
            if !entry.operation.to_lowercase().contains(&operation.to_lowercase()) {
                return false;
            }
        }
        if let Some(project_id) = &self.project_id {
            if entry.project_id.as_deref() != Some(project_id.as_str()) {
                return false;
            }
        }
        if let Some(user_action) = self.user_action {
            if entry.user_action != user_action {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if entry.ts < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if entry.ts > end {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hay_message = entry.message.to_lowercase();
            let hay_details = entry.details.as_deref().unwrap_or("").to_lowercase();
            if !hay_message.contains(&needle) && !hay_details.contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Activity Log Service (C4, spec §4.4): the circular buffer wired up with
//! config, filtering, search, export, maintenance, error reports, and
//! application status.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mcpweaver_core::{AppError, Clock, EventSink, Level, Metadata};
use parking_lot::RwLock;

use crate::buffer::CircularBuffer;
use crate::config::ActivityLogConfig;
use crate::entry::{LogEntry, LogEntryId, LogFilter, NewLogEntry};
use crate::error_report::{ErrorReport, ErrorReportId, ErrorType, HostInfo, ReportSeverity};
use crate::export::{self, ExportFormat, ExportResult};
use crate::status::{self, ApplicationStatus};

struct State {
    buffer: CircularBuffer<LogEntry>,
    config: ActivityLogConfig,
}

/// Circular-buffer activity log with level filtering, search, export, and
/// periodic retention sweeps (spec §4.4).
pub struct ActivityLogService<C: Clock, S: EventSink> {
    clock: C,
    sink: S,
    state: RwLock<State>,
}

/// Search results, paginated (spec §4.4 "Search").
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub entries: Vec<LogEntry>,
    pub total: usize,
    pub has_more: bool,
}

impl<C: Clock, S: EventSink> ActivityLogService<C, S> {
    pub fn new(clock: C, sink: S, config: ActivityLogConfig) -> Self {
        let buffer = CircularBuffer::new(config.buffer_size.max(1));
        Self { clock, sink, state: RwLock::new(State { buffer, config }) }
    }

    pub fn config(&self) -> ActivityLogConfig {
        self.state.read().config.clone()
    }

    /// Append a new entry. Silently rejected if below the configured level
    /// (spec §4.4 "Append").
    pub fn append(&self, new: NewLogEntry) {
        let mut state = self.state.write();
        if new.level < state.config.level {
            return;
        }

        let entry = LogEntry {
            id: LogEntryId::new(),
            ts: self.clock.now_utc(),
            level: new.level,
            component: new.component,
            operation: new.operation,
            message: new.message,
            details: new.details,
            duration_ms: new.duration_ms,
            project_id: new.project_id,
            user_action: new.user_action,
            metadata: new.metadata,
        };

        if state.config.enable_console {
            println!(
                "{} [{}] {}/{}: {}",
                entry.ts.format("%Y-%m-%d %H:%M:%S"),
                entry.level,
                entry.component,
                entry.operation,
                entry.message
            );
        }

        tracing::event!(
            tracing::Level::DEBUG,
            component = %entry.component,
            operation = %entry.operation,
            level = %entry.level,
            "activity log entry"
        );

        state.buffer.push(entry.clone());
        drop(state);

        self.sink.emit("log:entry", entry_to_metadata(&entry));
    }

    /// Copy of the full buffer, insertion order (oldest first).
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.state.read().buffer.snapshot()
    }

    /// Filtered + sorted (newest first) + limited view (spec §4.4 "Filter",
    /// "Retrieval sort").
    pub fn get_logs(&self, filter: &LogFilter) -> Vec<LogEntry> {
        let mut entries: Vec<LogEntry> = self.snapshot().into_iter().filter(|e| filter.matches(e)).collect();
        entries.sort_by(|a, b| b.ts.cmp(&a.ts));
        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }
        entries
    }

    /// Substring search across message/details/component/operation, newest
    /// first, paginated (spec §4.4 "Search").
    pub fn search(&self, query: &str, offset: usize, limit: usize) -> SearchResult {
        let needle = query.to_lowercase();
        let mut matches: Vec<LogEntry> = self
            .snapshot()
            .into_iter()
            .filter(|e| {
                e.message.to_lowercase().contains(&needle)
                    || e.details.as_deref().unwrap_or("").to_lowercase().contains(&needle)
                    || e.component.to_lowercase().contains(&needle)
                    || e.operation.to_lowercase().contains(&needle)
            })
            .collect();
        matches.sort_by(|a, b| b.ts.cmp(&a.ts));

        let total = matches.len();
        let page: Vec<LogEntry> = matches.into_iter().skip(offset).take(limit).collect();
        let has_more = offset + page.len() < total;
        SearchResult { entries: page, total, has_more }
    }

    /// Render a snapshot to a file (spec §4.4 "Export").
    pub fn export_logs(&self, path: &Path, filter: &LogFilter, format: ExportFormat) -> Result<ExportResult, AppError> {
        let entries = self.get_logs(filter);
        export::export(path, &entries, format, self.clock.now_utc())
    }

    /// Rebuild the buffer at a new capacity, keeping the most recent
    /// entries (spec §4.4 "Resize").
    pub fn resize(&self, new_capacity: usize) {
        let mut state = self.state.write();
        state.buffer.resize(new_capacity.max(1));
        state.config.buffer_size = new_capacity.max(1);
    }

    /// `older_than == 0` reallocates the whole buffer; otherwise prunes
    /// entries older than `now - older_than` (spec §4.4 "Clear").
    pub fn clear(&self, older_than: chrono::Duration) -> usize {
        let mut state = self.state.write();
        if older_than.is_zero() || older_than < chrono::Duration::zero() {
            return state.buffer.clear();
        }
        let cutoff = self.clock.now_utc() - older_than;
        state.buffer.retain(|e| e.ts >= cutoff)
    }

    /// One maintenance tick: prune by `retentionDays` if configured (spec
    /// §4.4 "Maintenance loop").
    pub fn perform_maintenance(&self) -> usize {
        let retention_days = self.state.read().config.retention_days;
        if retention_days == 0 {
            return 0;
        }
        self.clear(chrono::Duration::days(retention_days as i64))
    }

    /// Synthesise and log an error report (spec §4.4 "Error reports").
    pub fn report_error(
        &self,
        error_type: ErrorType,
        severity: ReportSeverity,
        component: &str,
        operation: &str,
        message: &str,
        underlying: Option<&str>,
        app_version: &str,
    ) -> ErrorReport {
        let report = ErrorReport {
            id: ErrorReportId::new(),
            error_type,
            severity,
            component: component.to_string(),
            operation: operation.to_string(),
            message: message.to_string(),
            underlying: underlying.map(str::to_string),
            host: HostInfo::snapshot(app_version),
            created_at: self.clock.now_utc(),
            metadata: Metadata::new(),
        };

        let level = if severity == ReportSeverity::Critical { Level::Fatal } else { Level::Error };
        let mut new = NewLogEntry::new(component, operation, message).level(level);
        if let Some(underlying) = underlying {
            new = new.details(underlying.to_string());
        }
        self.append(new);

        report
    }

    /// Current application status (spec §4.4 "Status").
    pub fn application_status(&self) -> ApplicationStatus {
        status::derive_status(&self.snapshot(), self.clock.now_utc())
    }
}

fn entry_to_metadata(entry: &LogEntry) -> Metadata {
    match serde_json::to_value(entry) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => Metadata::new(),
    }
}

/// Spawn the periodic maintenance loop (spec §4.4 "Maintenance loop", §5
/// "ALS: ... performMaintenance tick"). Runs until `cancel` fires.
pub fn spawn_maintenance_loop<C, S>(
    service: Arc<ActivityLogService<C, S>>,
    cancel: tokio_util::sync::CancellationToken,
) -> tokio::task::JoinHandle<()>
where
    C: Clock + 'static,
    S: EventSink + 'static,
{
    tokio::spawn(async move {
        let interval = service.config().flush_interval;
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let pruned = service.perform_maintenance();
                    if pruned > 0 {
                        tracing::debug!(pruned, "activity log retention sweep");
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Log export (spec §4.4 "Export"): `json`, `csv`, `txt`.

use chrono::{DateTime, Utc};
use mcpweaver_core::AppError;
use std::path::Path;

use crate::entry::LogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Txt,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExportResult {
    pub file_path: String,
    pub entries_count: usize,
    pub file_size: u64,
    pub export_time: DateTime<Utc>,
    pub format: ExportFormat,
}

/// Render `entries` in `format` and write them to `path`. Entries are
/// exported in the order given by the caller (spec leaves ordering to the
/// caller's prior `GetLogs` sort).
pub fn export(path: &Path, entries: &[LogEntry], format: ExportFormat, now: DateTime<Utc>) -> Result<ExportResult, AppError> {
    let rendered = match format {
        ExportFormat::Json => render_json(entries)?,
        ExportFormat::Csv => render_csv(entries),
        ExportFormat::Txt => render_txt(entries),
    };

    std::fs::write(path, rendered.as_bytes()).map_err(|e| {
        AppError::file_system("log.export_write_failed", format!("failed to write export file: {e}"))
            .with_detail("path", path.display().to_string())
    })?;

    let file_size = rendered.as_bytes().len() as u64;
    Ok(ExportResult {
        file_path: path.display().to_string(),
        entries_count: entries.len(),
        file_size,
        export_time: now,
        format,
    })
}

fn render_json(entries: &[LogEntry]) -> Result<String, AppError> {
    serde_json::to_string_pretty(entries)
        .map_err(|e| AppError::system("log.export_serialize_failed", format!("failed to serialize entries: {e}")))
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_csv(entries: &[LogEntry]) -> String {
    let mut out = String::from("ID,Timestamp,Level,Component,Operation,Message,Details,Duration,ProjectID,UserAction\n");
    for e in entries {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            csv_escape(e.id.as_str()),
            e.ts.to_rfc3339(),
            e.level,
            csv_escape(&e.component),
            csv_escape(&e.operation),
            csv_escape(&e.message),
            csv_escape(e.details.as_deref().unwrap_or("")),
            e.duration_ms.map(|d| d.to_string()).unwrap_or_default(),
            csv_escape(e.project_id.as_deref().unwrap_or("")),
            e.user_action,
        ));
    }
    out
}

fn render_txt(entries: &[LogEntry]) -> String {
    let mut out = String::new();
    for e in entries {
        let mut line = format!(
            "{} [{}] {}/{}: {}",
            e.ts.format("%Y-%m-%d %H:%M:%S"),
            e.level,
            e.component,
            e.operation,
            e.message,
        );
        if let Some(details) = &e.details {
            line.push_str(" - ");
            line.push_str(details);
        }
        line.push('\n');
        out.push_str(&line);
    }
    out
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;

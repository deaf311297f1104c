// SPDX-License-Identifier: MIT

//! `ReportError` host diagnostics (spec §4.4 "Error reports").

use chrono::{DateTime, Utc};
use mcpweaver_core::Metadata;

mcpweaver_core::define_hex_id! {
    /// Unique identifier for an error report.
    pub struct ErrorReportId("err_", 16);
}

/// Broad class of error being reported, distinct from [`mcpweaver_core::ErrorKind`]
/// because the spec names this field separately ("type") from log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Application,
    Network,
    FileSystem,
    Validation,
    Unknown,
}

/// Severity of the underlying failure. `Critical` is logged at `Fatal`
/// instead of `Error` (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Best-effort host environment snapshot attached to a report. Each field is
/// populated on a best-effort basis per spec §9's note that host
/// introspection "may be omitted on platforms lacking" the underlying
/// facility.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HostInfo {
    pub os: String,
    pub arch: String,
    pub runtime_version: String,
    pub app_version: String,
    pub memory_mb: Option<u64>,
    pub cpu_load: Option<f64>,
}

impl HostInfo {
    /// Snapshot the current process/host. `app_version` is caller-supplied
    /// since it isn't derivable from the environment.
    pub fn snapshot(app_version: impl Into<String>) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            runtime_version: rustc_version(),
            app_version: app_version.into(),
            memory_mb: resident_memory_mb(),
            cpu_load: None,
        }
    }
}

fn rustc_version() -> String {
    option_env!("CARGO_PKG_RUST_VERSION").unwrap_or("unknown").to_string()
}

/// Best-effort resident set size in MiB. Linux reads `/proc/self/status`;
/// other platforms return `None` rather than guessing (spec §9).
fn resident_memory_mb() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        for line in status.lines() {
            if let Some(rest) = line.strip_prefix("VmRSS:") {
                let kb: u64 = rest.trim().trim_end_matches(" kB").trim().parse().ok()?;
                return Some(kb / 1024);
            }
        }
        None
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Synthesised error report returned by `ReportError`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorReport {
    pub id: ErrorReportId,
    pub error_type: ErrorType,
    pub severity: ReportSeverity,
    pub component: String,
    pub operation: String,
    pub message: String,
    pub underlying: Option<String>,
    pub host: HostInfo,
    pub created_at: DateTime<Utc>,
    pub metadata: Metadata,
}

#[cfg(test)]
#[path = "error_report_tests.rs"]
mod tests;

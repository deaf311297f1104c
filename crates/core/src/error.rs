// SPDX-License-Identifier: MIT

//! Uniform error shape shared by every subsystem (spec §7).
//!
//! Every typed error carries enough structure for direct UI display
//! (`message`, `suggestions`) and enough structure for programmatic
//! handling (`kind`, `code`, `recoverable`, `retry_after`).

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// Broad category of failure. Drives how a caller reacts (retry, surface to
/// user, escalate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Network,
    FileSystem,
    Database,
    System,
    Permission,
    Authentication,
    Configuration,
}

/// How urgently an error needs attention. `Critical` errors are emitted on
/// the event sink in addition to being returned (see [`AppError::severity`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Uniform error type returned by every public operation in this workspace.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    pub severity: Severity,
    pub recoverable: bool,
    /// Milliseconds the caller should wait before retrying, when known
    /// (e.g. a circuit breaker's remaining open timeout).
    #[serde(default)]
    pub retry_after_ms: Option<u64>,
}

impl AppError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
            timestamp: Utc::now(),
            suggestions: Vec::new(),
            correlation_id: None,
            severity: Severity::Medium,
            recoverable: false,
            retry_after_ms: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after_ms = Some(duration.as_millis() as u64);
        self.recoverable = true;
        self
    }

    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after_ms.map(Duration::from_millis)
    }

    pub fn network(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, code, message)
    }

    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, code, message)
    }

    pub fn file_system(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileSystem, code, message)
    }

    pub fn configuration(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, code, message)
    }

    pub fn system(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::System, code, message)
    }

    /// True if this error's textual form matches one of the well-known
    /// transient substrings spec.md's retry manager treats as retryable,
    /// case-insensitively.
    pub fn looks_transient(&self) -> bool {
        const NEEDLES: &[&str] = &[
            "connection refused",
            "timeout",
            "temporary failure",
            "service unavailable",
            "network error",
            "database connection",
            "context deadline exceeded",
        ];
        let haystack = self.message.to_lowercase();
        NEEDLES.iter().any(|n| haystack.contains(n))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

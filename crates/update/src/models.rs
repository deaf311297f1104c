// SPDX-License-Identifier: MIT

//! Update service data model (spec §3 "UpdateInfo", "UpdateProgress").

use chrono::{DateTime, Utc};
use mcpweaver_core::Metadata;
use std::time::Duration;

/// Release metadata returned by `CheckForUpdates` (spec §3 "UpdateInfo").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UpdateInfo {
    pub version: String,
    pub release_notes: String,
    pub download_url: String,
    pub checksum_url: Option<String>,
    pub size: u64,
    pub published_at: DateTime<Utc>,
    pub critical: bool,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Overall state machine position (spec §4.7 "Status machine").
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Idle,
    Checking,
    Available,
    Downloading,
    Verifying,
    Ready,
    Installing,
    Completed,
    RollingBack,
    RollbackComplete,
    Failed,
}

/// Live progress record, updated throughout download/install (spec §3
/// "UpdateProgress").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateProgress {
    pub status: UpdateStatus,
    pub progress: f64,
    pub current_step: String,
    pub bytes_total: u64,
    pub bytes_received: u64,
    pub speed: f64,
    pub estimated_time: Option<Duration>,
    pub error: Option<String>,
    pub last_update: DateTime<Utc>,
}

impl UpdateProgress {
    pub fn idle(now: DateTime<Utc>) -> Self {
        Self {
            status: UpdateStatus::Idle,
            progress: 0.0,
            current_step: "idle".to_string(),
            bytes_total: 0,
            bytes_received: 0,
            speed: 0.0,
            estimated_time: None,
            error: None,
            last_update: now,
        }
    }
}

/// Checksum-only verification in scope; `Signature`/`Full` are declared but
/// not implemented (spec §4.7 "Verify" — full PKI is a Non-goal per §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    None,
    Checksum,
    Signature,
    Full,
}

/// Release feed asset descriptor (spec §6 "Release feed").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
}

/// Raw release feed response shape (spec §6).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReleaseFeedResponse {
    pub tag_name: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub assets: Vec<ReleaseAsset>,
    #[serde(default)]
    pub prerelease: bool,
}

/// Update service settings (ambient config layer, SPEC_FULL §1).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateSettings {
    pub feed_url: String,
    pub user_agent: String,
    #[serde(default)]
    pub extra_headers: Vec<(String, String)>,
    pub pre_release_enabled: bool,
    pub auto_check: bool,
    #[serde(with = "duration_secs")]
    pub check_interval: Duration,
    #[serde(with = "duration_secs")]
    pub http_timeout: Duration,
    pub verification_mode: VerificationMode,
    pub max_backups: usize,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            user_agent: "mcpweaver-updater".to_string(),
            extra_headers: Vec::new(),
            pre_release_enabled: false,
            auto_check: false,
            check_interval: Duration::from_secs(3600),
            http_timeout: Duration::from_secs(30),
            verification_mode: VerificationMode::Checksum,
            max_backups: 5,
        }
    }
}

impl UpdateSettings {
    mcpweaver_core::setters! {
        into { feed_url: String, user_agent: String }
        set {
            pre_release_enabled: bool,
            auto_check: bool,
            check_interval: Duration,
            http_timeout: Duration,
            verification_mode: VerificationMode,
            max_backups: usize,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

/// A versioned executable backup (spec §3 "BackupRecord").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BackupRecord {
    pub path: String,
    pub name: String,
    pub version: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Result of `CreateBackup`, carried through to a later `PerformRollback`
/// (spec §4.5).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RollbackInfo {
    pub available: bool,
    pub backup_path: String,
    pub backup_version: String,
    pub backup_created_at: DateTime<Utc>,
    pub backup_size: u64,
}

/// Analytics record appended on every status transition (spec §4.7
/// "Analytics").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateAnalyticsEvent {
    pub event_type: String,
    pub version: Option<String>,
    pub previous_version: Option<String>,
    pub channel: String,
    pub success: bool,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub client_info: String,
}

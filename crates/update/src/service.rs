// SPDX-License-Identifier: MIT

//! Update Service (C7, spec §4.7): check → download (progress) → verify →
//! install → (rollback) status machine.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mcpweaver_core::{AppError, Clock, EventSink, Metadata};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::models::{
    BackupRecord, RollbackInfo, UpdateAnalyticsEvent, UpdateInfo, UpdateProgress, UpdateSettings, UpdateStatus,
    VerificationMode,
};
use crate::release_feed::ReleaseFeedClient;
use crate::rollback::RollbackManager;
use crate::versioning;

const DOWNLOAD_CHUNK_BYTES: usize = 32 * 1024;
const PROGRESS_THROTTLE: Duration = Duration::from_secs(1);

struct State {
    status: UpdateStatus,
    progress: UpdateProgress,
    current_version: String,
    settings: UpdateSettings,
    analytics: Vec<UpdateAnalyticsEvent>,
}

/// Update Service: owns the status machine, the Rollback Manager, and a
/// release-feed collaborator. Only one active request/download/install at
/// a time (spec §5).
pub struct UpdateService<C: Clock, S: EventSink, F: ReleaseFeedClient> {
    clock: C,
    sink: S,
    feed: Arc<F>,
    rollback: RollbackManager<C>,
    state: RwLock<State>,
}

impl<C: Clock, S: EventSink, F: ReleaseFeedClient> UpdateService<C, S, F> {
    pub fn new(
        clock: C,
        sink: S,
        feed: Arc<F>,
        backup_dir: impl Into<PathBuf>,
        current_version: impl Into<String>,
        settings: UpdateSettings,
    ) -> Self {
        let current_version = current_version.into();
        let max_backups = settings.max_backups;
        let rollback = RollbackManager::new(clock.clone(), backup_dir, max_backups);
        let now = clock.now_utc();
        Self {
            clock,
            sink,
            feed,
            rollback,
            state: RwLock::new(State {
                status: UpdateStatus::Idle,
                progress: UpdateProgress::idle(now),
                current_version,
                settings,
                analytics: Vec::new(),
            }),
        }
    }

    pub fn status(&self) -> UpdateStatus {
        self.state.read().status
    }

    pub fn progress(&self) -> UpdateProgress {
        self.state.read().progress.clone()
    }

    pub fn settings(&self) -> UpdateSettings {
        self.state.read().settings.clone()
    }

    pub fn update_settings(&self, settings: UpdateSettings) {
        self.state.write().settings = settings;
        self.sink.emit("update:settings_changed", Metadata::new());
    }

    pub fn analytics(&self) -> Vec<UpdateAnalyticsEvent> {
        self.state.read().analytics.clone()
    }

    pub fn list_backups(&self) -> Result<Vec<BackupRecord>, AppError> {
        self.rollback.list_available_backups()
    }

    fn set_status(&self, status: UpdateStatus, current_step: &str) {
        let mut state = self.state.write();
        state.status = status;
        state.progress.status = status;
        state.progress.current_step = current_step.to_string();
        state.progress.last_update = self.clock.now_utc();
        drop(state);
        self.sink.emit("update:progress", progress_metadata(&self.progress()));
    }

    fn record_analytics(&self, event_type: &str, version: Option<&str>, previous: Option<&str>, success: bool, error: Option<&str>) {
        let event = UpdateAnalyticsEvent {
            event_type: event_type.to_string(),
            version: version.map(str::to_string),
            previous_version: previous.map(str::to_string),
            channel: "stable".to_string(),
            success,
            error: error.map(str::to_string),
            timestamp: self.clock.now_utc(),
            client_info: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
        };
        self.state.write().analytics.push(event.clone());
        self.sink.emit("update:analytics", analytics_metadata(&event));
    }

    /// Check the release feed for a newer version. Only valid from Idle
    /// (spec §4.7 "CheckForUpdates").
    pub async fn check_for_updates(&self) -> Result<Option<UpdateInfo>, AppError> {
        {
            let state = self.state.read();
            if state.status != UpdateStatus::Idle {
                return Err(AppError::validation("update.in_progress", "an update operation is already in progress")
                    .with_detail("status", format!("{:?}", state.status)));
            }
        }

        self.set_status(UpdateStatus::Checking, "checking for updates");
        let (feed_url, user_agent, headers, pre_release_enabled, current_version) = {
            let state = self.state.read();
            (
                state.settings.feed_url.clone(),
                state.settings.user_agent.clone(),
                state.settings.extra_headers.clone(),
                state.settings.pre_release_enabled,
                state.current_version.clone(),
            )
        };

        let response = match self.feed.fetch_release(&feed_url, &user_agent, &headers).await {
            Ok(r) => r,
            Err(e) => {
                self.record_analytics("update_check", None, Some(&current_version), false, Some(&e.message));
                self.set_status(UpdateStatus::Idle, "idle");
                return Err(e);
            }
        };

        if response.prerelease && !pre_release_enabled {
            self.record_analytics("update_check", None, Some(&current_version), true, None);
            self.set_status(UpdateStatus::Idle, "idle");
            return Ok(None);
        }

        if !versioning::is_newer(&response.tag_name, &current_version) {
            self.record_analytics("update_check", Some(&response.tag_name), Some(&current_version), true, None);
            self.set_status(UpdateStatus::Idle, "idle");
            return Ok(None);
        }

        let asset_name = platform_asset_name();
        let Some(asset) = response.assets.iter().find(|a| a.name == asset_name) else {
            self.record_analytics("update_check", Some(&response.tag_name), Some(&current_version), false, Some("no matching asset"));
            self.set_status(UpdateStatus::Idle, "idle");
            return Ok(None);
        };

        let checksum_asset_name = format!("{asset_name}.sha256");
        let checksum_url = response
            .assets
            .iter()
            .find(|a| a.name == checksum_asset_name)
            .map(|a| a.browser_download_url.clone())
            .unwrap_or_else(|| format!("{}.sha256", asset.browser_download_url));

        let info = UpdateInfo {
            version: response.tag_name.clone(),
            release_notes: response.body,
            download_url: asset.browser_download_url.clone(),
            checksum_url: Some(checksum_url),
            size: asset.size,
            published_at: response.published_at,
            critical: false,
            metadata: Metadata::new(),
        };

        self.record_analytics("update_check", Some(&info.version), Some(&current_version), true, None);
        self.set_status(UpdateStatus::Available, "update available");
        self.sink.emit("update:notification", update_info_metadata(&info));
        Ok(Some(info))
    }

    /// Stream the update asset to `dest`, updating progress throttled to
    /// >=1s (spec §4.7 "DownloadUpdate").
    pub async fn download_update(&self, info: &UpdateInfo, dest: &Path, cancel: &CancellationToken) -> Result<(), AppError> {
        {
            let state = self.state.read();
            if state.status != UpdateStatus::Available {
                return Err(AppError::validation("update.not_available", "no update is available to download"));
            }
        }

        self.set_status(UpdateStatus::Downloading, "downloading update");

        let result = self.run_download(info, dest, cancel).await;
        if let Err(e) = &result {
            self.set_status(UpdateStatus::Failed, "download failed");
            self.state.write().progress.error = Some(e.message.clone());
            return result;
        }

        self.set_status(UpdateStatus::Verifying, "verifying download");
        let verify_result = self.verify(info, dest).await;
        if let Err(e) = verify_result {
            self.set_status(UpdateStatus::Failed, "verification failed");
            self.state.write().progress.error = Some(e.message.clone());
            return Err(e);
        }

        self.set_status(UpdateStatus::Ready, "ready to install");
        Ok(())
    }

    async fn run_download(&self, info: &UpdateInfo, dest: &Path, cancel: &CancellationToken) -> Result<(), AppError> {
        let mut download = self.feed.open_download(&info.download_url).await?;
        let total = download.content_length.unwrap_or(info.size);

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| AppError::file_system("update.create_temp_failed", format!("failed to create download destination: {e}")))?;

        let mut buf = vec![0u8; DOWNLOAD_CHUNK_BYTES];
        let mut received: u64 = 0;
        let started = Instant::now();
        let mut last_emit = Instant::now() - PROGRESS_THROTTLE;

        loop {
            if cancel.is_cancelled() {
                return Err(AppError::system("update.cancelled", "download cancelled"));
            }

            let n = download
                .reader
                .read(&mut buf)
                .await
                .map_err(|e| AppError::network("update.download_io_error", format!("download read failed: {e}")))?;
            if n == 0 {
                break;
            }

            tokio::io::AsyncWriteExt::write_all(&mut file, &buf[..n])
                .await
                .map_err(|e| AppError::file_system("update.write_failed", format!("failed to write download chunk: {e}")))?;

            received += n as u64;

            if last_emit.elapsed() >= PROGRESS_THROTTLE {
                self.emit_download_progress(received, total, started);
                last_emit = Instant::now();
            }
        }

        self.emit_download_progress(received, total, started);
        Ok(())
    }

    fn emit_download_progress(&self, received: u64, total: u64, started: Instant) {
        let elapsed = started.elapsed().as_secs_f64().max(0.001);
        let speed = received as f64 / elapsed;
        let progress_pct = if total > 0 { (received as f64 / total as f64) * 100.0 } else { 0.0 };
        let estimated = if speed > 0.0 && total > received {
            Some(Duration::from_secs_f64((total - received) as f64 / speed))
        } else {
            None
        };

        {
            let mut state = self.state.write();
            state.progress.bytes_total = total;
            state.progress.bytes_received = received;
            state.progress.speed = speed;
            state.progress.progress = progress_pct.min(100.0);
            state.progress.estimated_time = estimated;
            state.progress.last_update = self.clock.now_utc();
        }
        self.sink.emit("update:progress", progress_metadata(&self.progress()));
    }

    /// Verify the downloaded file per the configured mode (spec §4.7
    /// "Verify").
    async fn verify(&self, info: &UpdateInfo, path: &Path) -> Result<(), AppError> {
        let mode = self.state.read().settings.verification_mode;
        match mode {
            VerificationMode::None => Ok(()),
            VerificationMode::Checksum => {
                let Some(checksum_url) = &info.checksum_url else {
                    return Err(AppError::validation("update.no_checksum_url", "checksum verification requested but no checksum_url provided"));
                };
                let expected = self.feed.fetch_checksum(checksum_url).await?;
                let expected_hex = expected.trim().split_whitespace().next().unwrap_or("").to_lowercase();

                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| AppError::file_system("update.read_failed", format!("failed to read downloaded file: {e}")))?;
                let mut hasher = Sha256::new();
                hasher.update(&bytes);
                let actual_hex = hex_encode(&hasher.finalize());

                if actual_hex != expected_hex {
                    return Err(AppError::validation("update.checksum_mismatch", "downloaded file checksum does not match")
                        .with_detail("expected", expected_hex)
                        .with_detail("actual", actual_hex));
                }
                Ok(())
            }
            VerificationMode::Signature | VerificationMode::Full => {
                // Full PKI verification is a declared Non-goal (spec §1);
                // treat these modes as checksum-equivalent pass-through.
                Ok(())
            }
        }
    }

    /// Back up, atomically replace the executable, and roll back on
    /// failure (spec §4.7 "InstallUpdate").
    pub async fn install_update(&self, info: &UpdateInfo, downloaded_path: &Path, exe_path: &Path) -> Result<(), AppError> {
        {
            let state = self.state.read();
            if state.status != UpdateStatus::Ready {
                return Err(AppError::validation("update.not_ready", "no verified update ready to install"));
            }
        }

        self.set_status(UpdateStatus::Installing, "installing update");
        let previous_version = self.state.read().current_version.clone();

        let backup = match self.rollback.create_backup(exe_path, &previous_version) {
            Ok(b) => b,
            Err(e) => {
                self.set_status(UpdateStatus::Failed, "backup failed");
                self.record_analytics("update_install", Some(&info.version), Some(&previous_version), false, Some(&e.message));
                return Err(e);
            }
        };

        match self.atomic_replace(downloaded_path, exe_path).await {
            Ok(()) => {
                self.state.write().current_version = info.version.clone();
                self.set_status(UpdateStatus::Completed, "update installed");
                self.record_analytics("update_install", Some(&info.version), Some(&previous_version), true, None);
                Ok(())
            }
            Err(install_err) => {
                self.set_status(UpdateStatus::RollingBack, "rolling back failed install");
                match self.rollback.perform_rollback(&backup, exe_path) {
                    Ok(()) => {
                        self.set_status(UpdateStatus::RollbackComplete, "rollback complete");
                        self.record_analytics(
                            "update_install",
                            Some(&info.version),
                            Some(&previous_version),
                            false,
                            Some(&install_err.message),
                        );
                        Err(install_err)
                    }
                    Err(rollback_err) => {
                        self.set_status(UpdateStatus::Failed, "rollback failed");
                        let escalated = AppError::system(
                            "update.rollback_failed",
                            "install failed and rollback also failed; manual intervention required",
                        )
                        .with_detail("install_error", install_err.message.clone())
                        .with_detail("rollback_error", rollback_err.message.clone())
                        .with_severity(mcpweaver_core::Severity::Critical);
                        self.record_analytics(
                            "update_install",
                            Some(&info.version),
                            Some(&previous_version),
                            false,
                            Some(&escalated.message),
                        );
                        Err(escalated)
                    }
                }
            }
        }
    }

    /// Write the downloaded file alongside `exe_path` then `rename` it into
    /// place: a same-filesystem rename is atomic on POSIX, giving the
    /// all-or-nothing swap spec §4.7 requires.
    async fn atomic_replace(&self, downloaded_path: &Path, exe_path: &Path) -> Result<(), AppError> {
        let staging = exe_path.with_extension("update_staging");
        tokio::fs::copy(downloaded_path, &staging)
            .await
            .map_err(|e| AppError::file_system("update.stage_failed", format!("failed to stage new executable: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o755))
                .await
                .map_err(|e| AppError::file_system("update.chmod_failed", format!("failed to mark new executable as runnable: {e}")))?;
        }

        tokio::fs::rename(&staging, exe_path)
            .await
            .map_err(|e| AppError::file_system("update.swap_failed", format!("failed to swap in new executable: {e}")))
    }

    /// Spawn the periodic check loop when `settings.auto_check` is enabled
    /// (spec §4.7 "Periodic checks"). Suppressed while status isn't Idle.
    pub fn spawn_periodic_checks(service: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()>
    where
        C: 'static,
        S: 'static,
        F: 'static,
    {
        tokio::spawn(async move {
            loop {
                let interval = service.settings().check_interval;
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = cancel.cancelled() => break,
                }

                if !service.settings().auto_check {
                    continue;
                }
                if service.status() != UpdateStatus::Idle {
                    continue;
                }
                if let Err(e) = service.check_for_updates().await {
                    tracing::warn!(error = %e.message, "periodic update check failed");
                }
            }
        })
    }
}

fn platform_asset_name() -> String {
    let base = format!("mcpweaver_{}_{}", std::env::consts::OS, std::env::consts::ARCH);
    if std::env::consts::OS == "windows" {
        format!("{base}.exe")
    } else {
        base
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn progress_metadata(progress: &UpdateProgress) -> Metadata {
    match serde_json::to_value(progress) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => Metadata::new(),
    }
}

fn analytics_metadata(event: &UpdateAnalyticsEvent) -> Metadata {
    match serde_json::to_value(event) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => Metadata::new(),
    }
}

fn update_info_metadata(info: &UpdateInfo) -> Metadata {
    match serde_json::to_value(info) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => Metadata::new(),
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Rollback Manager (C5, spec §4.5): versioned backup store, atomic
//! restore, validation, pruning to N newest.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use mcpweaver_core::{AppError, Clock};
use parking_lot::Mutex;

use crate::models::{BackupRecord, RollbackInfo};

/// Backup-file naming/pruning, serialized by its own lock (spec §5 "RB is
/// stateless on disk but serialises its own list ops").
pub struct RollbackManager<C: Clock> {
    clock: C,
    backup_dir: PathBuf,
    max_backups: usize,
    // Guards enumeration + prune so concurrent CreateBackup calls don't
    // race each other's directory listing.
    lock: Mutex<()>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub validated_at: Option<DateTime<Utc>>,
}

impl<C: Clock> RollbackManager<C> {
    pub fn new(clock: C, backup_dir: impl Into<PathBuf>, max_backups: usize) -> Self {
        Self { clock, backup_dir, max_backups: max_backups.max(1), lock: Mutex::new(()) }
    }

    fn backup_name(version: &str, ts: DateTime<Utc>) -> String {
        format!("mcpweaver_{}_{}.backup", version, ts.format("%Y%m%d-%H%M%S"))
    }

    /// Copy `exe_path` into the backup directory, preserving mode bits, then
    /// prune to the newest `max_backups` (spec §4.5 "CreateBackup").
    pub fn create_backup(&self, exe_path: &Path, version: &str) -> Result<RollbackInfo, AppError> {
        let _guard = self.lock.lock();
        std::fs::create_dir_all(&self.backup_dir).map_err(|e| {
            AppError::file_system("rollback.mkdir_failed", format!("failed to create backup directory: {e}"))
        })?;

        let now = self.clock.now_utc();
        let name = Self::backup_name(version, now);
        let backup_path = self.backup_dir.join(&name);

        copy_preserving_mode(exe_path, &backup_path)?;

        let size = std::fs::metadata(&backup_path)
            .map_err(|e| AppError::file_system("rollback.stat_failed", format!("failed to stat backup: {e}")))?
            .len();

        self.prune_locked()?;

        Ok(RollbackInfo {
            available: true,
            backup_path: backup_path.display().to_string(),
            backup_version: version.to_string(),
            backup_created_at: now,
            backup_size: size,
        })
    }

    /// List `.backup` files, oldest-first by mtime, stable on ties (spec
    /// §4.5 "Pruning policy").
    pub fn list_available_backups(&self) -> Result<Vec<BackupRecord>, AppError> {
        let _guard = self.lock.lock();
        self.list_locked()
    }

    fn list_locked(&self) -> Result<Vec<BackupRecord>, AppError> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        let read_dir = std::fs::read_dir(&self.backup_dir).map_err(|e| {
            AppError::file_system("rollback.readdir_failed", format!("failed to list backup directory: {e}"))
        })?;
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("backup") {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            let modified = meta.modified().ok().map(DateTime::<Utc>::from).unwrap_or_else(Utc::now);
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
            let version = name
                .strip_prefix("mcpweaver_")
                .and_then(|rest| rest.rsplit_once('_'))
                .map(|(v, _)| v.to_string())
                .unwrap_or_default();
            records.push(BackupRecord { path: path.display().to_string(), name, version, size: meta.len(), created_at: modified });
        }
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    /// Prune to the newest `max_backups`, oldest first (spec §4.5
    /// "Pruning policy"). Assumes the caller already holds `self.lock`.
    fn prune_locked(&self) -> Result<(), AppError> {
        let mut records = self.list_locked()?;
        if records.len() <= self.max_backups {
            return Ok(());
        }
        let to_remove = records.len() - self.max_backups;
        records.sort_by_key(|r| r.created_at);
        for record in records.into_iter().take(to_remove) {
            if let Err(e) = std::fs::remove_file(&record.path) {
                tracing::warn!(path = %record.path, error = %e, "failed to prune old backup");
            }
        }
        Ok(())
    }

    /// Restore the previous executable from `info`. Snapshots the failing
    /// exe first; on copy failure, attempts to restore the snapshot; if
    /// that also fails, escalates as Critical (spec §4.5 "PerformRollback").
    pub fn perform_rollback(&self, info: &RollbackInfo, exe_path: &Path) -> Result<(), AppError> {
        let backup_path = Path::new(&info.backup_path);
        if !backup_path.exists() {
            return Err(AppError::file_system("rollback.backup_missing", "backup file does not exist")
                .with_detail("path", info.backup_path.clone()));
        }

        let now = self.clock.now_utc();
        let failed_snapshot =
            PathBuf::from(format!("{}.failed_{}", exe_path.display(), now.format("%Y%m%d-%H%M%S")));
        copy_preserving_mode(exe_path, &failed_snapshot)?;

        if let Err(copy_err) = copy_preserving_mode(backup_path, exe_path) {
            if let Err(restore_err) = copy_preserving_mode(&failed_snapshot, exe_path) {
                return Err(AppError::system(
                    "rollback.double_failure",
                    "rollback failed and restoring the failing executable also failed",
                )
                .with_detail("copy_error", copy_err.message)
                .with_detail("restore_error", restore_err.message)
                .with_severity(mcpweaver_core::Severity::Critical));
            }
            return Err(copy_err);
        }

        let forensic_name = format!("failed_update_{}.forensic", now.format("%Y%m%d-%H%M%S"));
        let forensic_path = self.backup_dir.join(forensic_name);
        if let Err(e) = std::fs::rename(&failed_snapshot, &forensic_path) {
            tracing::warn!(error = %e, "failed to move failed snapshot into forensic storage");
        }

        Ok(())
    }

    /// Validate a backup file exists, is non-empty, and warn if it isn't
    /// marked executable (spec §4.5 "ValidateBackup").
    pub fn validate_backup(&self, path: &Path) -> ValidationResult {
        let mut result = ValidationResult { validated_at: Some(self.clock.now_utc()), ..Default::default() };

        let meta = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                result.errors.push(format!("backup does not exist: {e}"));
                return result;
            }
        };

        if meta.len() == 0 {
            result.errors.push("backup file is empty".to_string());
        }

        if !is_executable(&meta) {
            result.warnings.push("backup file is not marked executable".to_string());
        }

        result.valid = result.errors.is_empty();
        result
    }
}

#[cfg(unix)]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &std::fs::Metadata) -> bool {
    true
}

fn copy_preserving_mode(from: &Path, to: &Path) -> Result<(), AppError> {
    std::fs::copy(from, to).map_err(|e| {
        AppError::file_system("rollback.copy_failed", format!("failed to copy {}: {e}", from.display()))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(from)
            .map_err(|e| AppError::file_system("rollback.stat_failed", format!("failed to stat source: {e}")))?
            .permissions()
            .mode();
        std::fs::set_permissions(to, std::fs::Permissions::from_mode(mode)).map_err(|e| {
            AppError::file_system("rollback.chmod_failed", format!("failed to preserve mode bits: {e}"))
        })?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "rollback_tests.rs"]
mod tests;

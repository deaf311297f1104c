//! Rollback Manager: backup/rollback round-trip and pruning (spec §4.5,
//! §8 scenario 5 "Backup/rollback round-trip").

use std::fs;

use mcpweaver_core::FakeClock;
use mcpweaver_update::RollbackManager;

/// Scenario 5: create an executable with content X, back it up, overwrite
/// it with Y, roll back, and confirm the original bytes return with a
/// forensic copy of the failed attempt left behind.
#[test]
fn backup_then_rollback_restores_original_bytes() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let exe_path = workdir.path().join("mcpweaver");
    fs::write(&exe_path, b"X").expect("write original");

    let backup_dir = workdir.path().join("backups");
    let manager = RollbackManager::new(FakeClock::new(), &backup_dir, 5);

    let info = manager.create_backup(&exe_path, "1.0.0").expect("create_backup");
    assert!(info.available);
    assert_eq!(info.backup_version, "1.0.0");

    fs::write(&exe_path, b"Y").expect("overwrite with failed update");

    manager.perform_rollback(&info, &exe_path).expect("perform_rollback");

    let restored = fs::read(&exe_path).expect("read restored exe");
    assert_eq!(restored, b"X");

    let forensics: Vec<_> = fs::read_dir(&backup_dir)
        .expect("read backup dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains("forensic"))
        .collect();
    assert_eq!(forensics.len(), 1);
    let forensic_bytes = fs::read(forensics[0].path()).expect("read forensic copy");
    assert_eq!(forensic_bytes, b"Y");
}

/// RB invariant: after `ListAvailableBackups` prunes, count stays at or
/// below `maxBackups`, oldest pruned first.
#[test]
fn pruning_keeps_at_most_max_backups() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let exe_path = workdir.path().join("mcpweaver");
    let backup_dir = workdir.path().join("backups");
    let clock = FakeClock::new();
    let manager = RollbackManager::new(clock.clone(), &backup_dir, 2);

    for version in ["1.0.0", "1.0.1", "1.0.2", "1.0.3"] {
        fs::write(&exe_path, version.as_bytes()).expect("write version");
        manager.create_backup(&exe_path, version).expect("create_backup");
        clock.advance(std::time::Duration::from_secs(1));
    }

    let backups = manager.list_available_backups().expect("list_available_backups");
    assert_eq!(backups.len(), 2);
    let versions: Vec<&str> = backups.iter().map(|b| b.version.as_str()).collect();
    assert_eq!(versions, vec!["1.0.2", "1.0.3"]);
}

/// An empty or missing backup file fails validation with a clear reason.
#[test]
fn validate_backup_reports_empty_file() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let empty_backup = workdir.path().join("empty.backup");
    fs::write(&empty_backup, b"").expect("write empty file");

    let manager = RollbackManager::new(FakeClock::new(), workdir.path(), 5);
    let result = manager.validate_backup(&empty_backup);
    assert!(!result.valid);
    assert!(!result.errors.is_empty());
}

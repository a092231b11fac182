use std::fs;
use std::sync::Arc;

use tempfile::tempdir;
use tidyfs::actions::Sweeper;
use tidyfs::audit::AuditLog;
use tidyfs::safety::PathGuard;

#[test]
fn test_sweep_dry_run_by_default() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();

    let stats = Sweeper::new(PathGuard::default()).run(dir.path()).unwrap();

    assert!(stats.dry_run);
    assert_eq!(stats.removed, 1);
    assert!(dir.path().join("empty").exists());
}

#[test]
fn test_sweep_live_removes_chain_and_keeps_files() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("x").join("y").join("z")).unwrap();
    fs::create_dir_all(dir.path().join("docs").join("old")).unwrap();
    fs::write(dir.path().join("docs").join("keep.md"), "keep").unwrap();

    let log_dir = tempdir().unwrap();
    let log_path = log_dir.path().join("audit.log");
    let audit = Arc::new(AuditLog::open(&log_path).unwrap());

    let stats = Sweeper::new(PathGuard::default())
        .with_dry_run(false)
        .with_audit_log(audit)
        .run(dir.path())
        .unwrap();

    // old, z, y, x
    assert_eq!(stats.removed, 4);
    assert!(!dir.path().join("x").exists());
    assert!(!dir.path().join("docs").join("old").exists());
    assert!(dir.path().join("docs").join("keep.md").exists());

    let log = fs::read_to_string(&log_path).unwrap();
    assert_eq!(log.matches("Deleted empty folder:").count(), 4);
}

#[test]
fn test_sweep_directories_deepest_first() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a").join("b")).unwrap();

    let stats = Sweeper::new(PathGuard::default())
        .with_dry_run(false)
        .run(dir.path())
        .unwrap();

    let names: Vec<_> = stats
        .directories
        .iter()
        .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn test_sweep_missing_root_is_error() {
    let dir = tempdir().unwrap();
    assert!(Sweeper::new(PathGuard::default())
        .run(&dir.path().join("missing"))
        .is_err());
}

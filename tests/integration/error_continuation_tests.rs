use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::tempdir;
use tidyfs::audit::AuditLog;
use tidyfs::duplicates::{DuplicateFinder, FinderConfig};
use tidyfs::scanner::{FileRecord, HashError, ScanError};

#[test]
fn test_find_groups_from_files_continues_on_error() {
    let finder = DuplicateFinder::with_defaults();
    // Same size, so both reach the hashing phase and fail there
    let file1 = FileRecord::new(PathBuf::from("nonexistent_1.txt"), 100, 0);
    let file2 = FileRecord::new(PathBuf::from("nonexistent_2.txt"), 100, 1);

    let (groups, summary) = finder
        .find_groups_from_files(vec![file1, file2])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.hash_failures, 2);
    assert_eq!(summary.scan_errors.len(), 2);

    for err in &summary.scan_errors {
        match err {
            ScanError::Hash(HashError::NotFound(_)) => {}
            _ => panic!("Expected NotFound HashError, got: {err:?}"),
        }
    }
}

#[test]
fn test_unreadable_member_leaves_rest_of_group() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();

    let records = vec![
        FileRecord::new(a.clone(), 4, 0),
        FileRecord::new(dir.path().join("gone.txt"), 4, 1),
        FileRecord::new(b.clone(), 4, 2),
    ];
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_groups_from_files(records)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![a, b]);
    assert_eq!(summary.hash_failures, 1);
}

#[test]
fn test_hash_failures_reach_audit_log() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("logs").join("audit.log");
    let audit = Arc::new(AuditLog::open(&log_path).unwrap());
    let finder = DuplicateFinder::new(FinderConfig::default().with_audit_log(audit));

    let records = vec![
        FileRecord::new(dir.path().join("x.bin"), 9, 0),
        FileRecord::new(dir.path().join("y.bin"), 9, 1),
    ];
    let _ = finder.find_groups_from_files(records);

    let log = fs::read_to_string(&log_path).unwrap();
    assert_eq!(log.lines().count(), 2);
    assert!(log.lines().all(|l| l.contains(" - WARNING - ")));
}

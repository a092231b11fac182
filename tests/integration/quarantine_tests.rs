use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;
use tidyfs::actions::quarantine::QuarantineMover;
use tidyfs::audit::AuditLog;
use tidyfs::duplicates::FinderConfig;
use tidyfs::safety::{PathGuard, ProtectedRootSet};

fn mover() -> QuarantineMover {
    QuarantineMover::new(PathGuard::default(), FinderConfig::default())
}

fn review(root: &Path) -> std::path::PathBuf {
    root.join("Duplicate_Review")
}

#[test]
fn test_three_files_one_group() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "X").unwrap();
    fs::write(dir.path().join("b.txt"), "X").unwrap();
    fs::write(dir.path().join("c.txt"), "Y").unwrap();

    let stats = mover().run(dir.path()).unwrap();

    assert_eq!(stats.groups_found, 1);
    assert_eq!(stats.moved_count, 1);
    assert_eq!(stats.bytes_reclaimed, 1);
    assert_eq!(stats.failures, 0);
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("c.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert_eq!(fs::read_to_string(review(dir.path()).join("b.txt")).unwrap(), "X");
}

#[test]
fn test_second_run_moves_nothing() {
    let dir = tempdir().unwrap();
    for name in ["a.bin", "b.bin", "c.bin"] {
        fs::write(dir.path().join(name), [1u8; 64]).unwrap();
    }

    let first = mover().run(dir.path()).unwrap();
    let second = mover().run(dir.path()).unwrap();

    assert_eq!(first.moved_count, 2);
    assert_eq!(second.groups_found, 0);
    assert_eq!(second.moved_count, 0);
    assert!(second.outcomes.is_empty());
}

#[test]
fn test_no_duplicates_creates_no_review_folder() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "one").unwrap();
    fs::write(dir.path().join("b.txt"), "two").unwrap();

    let stats = mover().run(dir.path()).unwrap();

    assert_eq!(stats.moved_count, 0);
    assert!(!review(dir.path()).exists());
}

#[test]
fn test_nested_duplicates_flatten_with_suffixes() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    for sub in ["one", "two", "three"] {
        fs::create_dir(root.join(sub)).unwrap();
        fs::write(root.join(sub).join("photo.jpg"), "pixels").unwrap();
    }

    let stats = mover().run(&root).unwrap();

    // Traversal order: one, three, two. "one" keeps the original.
    assert_eq!(stats.moved_count, 2);
    assert!(root.join("one").join("photo.jpg").exists());
    assert!(review(&root).join("photo.jpg").exists());
    assert!(review(&root).join("photo_1.jpg").exists());
    let moved_from: Vec<_> = stats
        .outcomes
        .iter()
        .map(|o| o.source().to_path_buf())
        .collect();
    assert_eq!(
        moved_from,
        vec![
            root.join("three").join("photo.jpg"),
            root.join("two").join("photo.jpg")
        ]
    );
}

#[test]
fn test_protected_root_is_blocked_and_audited() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("system");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("a.txt"), "X").unwrap();
    fs::write(target.join("b.txt"), "X").unwrap();
    let log_path = dir.path().join("audit.log");

    let audit = Arc::new(AuditLog::open(&log_path).unwrap());
    let guard = PathGuard::new(ProtectedRootSet::new(vec![target.clone()]));
    let stats = QuarantineMover::new(guard, FinderConfig::default().with_audit_log(audit))
        .run(&target)
        .unwrap();

    assert!(stats.blocked);
    assert_eq!(stats.groups_found, 0);
    assert_eq!(stats.moved_count, 0);
    assert!(target.join("b.txt").exists());
    assert!(!review(&target).exists());

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.contains(" - ERROR - SECURITY VIOLATION"));
}

#[test]
fn test_subdirectory_of_protected_root_is_blocked() {
    let dir = tempdir().unwrap();
    let inner = dir.path().join("inner");
    fs::create_dir(&inner).unwrap();

    let guard = PathGuard::new(ProtectedRootSet::new(vec![dir.path().to_path_buf()]));
    let stats = QuarantineMover::new(guard, FinderConfig::default())
        .run(&inner)
        .unwrap();

    assert!(stats.blocked);
}

#[test]
fn test_moves_are_audited() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), "X").unwrap();
    fs::write(root.join("b.txt"), "X").unwrap();
    let log_path = dir.path().join("audit.log");

    let audit = Arc::new(AuditLog::open(&log_path).unwrap());
    QuarantineMover::new(
        PathGuard::default(),
        FinderConfig::default().with_audit_log(audit),
    )
    .run(&root)
    .unwrap();

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.contains(" - INFO - Scanned "));
    assert!(log.contains(" - INFO - Moved duplicate: "));
    assert!(log.lines().all(|line| line.len() > 22 && &line[19..22] == " - "));
}

#[test]
fn test_dry_run_touches_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "X").unwrap();
    fs::write(dir.path().join("b.txt"), "X").unwrap();

    let stats = mover().with_dry_run(true).run(dir.path()).unwrap();

    assert!(stats.dry_run);
    assert_eq!(stats.moved_count, 1);
    assert_eq!(stats.bytes_reclaimed, 1);
    assert!(dir.path().join("b.txt").exists());
    assert!(!review(dir.path()).exists());
}

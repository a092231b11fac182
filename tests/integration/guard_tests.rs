use std::fs;

use tempfile::tempdir;
use tidyfs::actions::quarantine::QuarantineMover;
use tidyfs::actions::relocate::MoveOutcome;
use tidyfs::duplicates::FinderConfig;
use tidyfs::safety::{default_protected_roots, GuardError, PathGuard, ProtectedRootSet};
use tidyfs::scanner::WalkerConfig;

#[test]
fn test_root_and_descendants_are_unsafe() {
    let dir = tempdir().unwrap();
    let protected = dir.path().join("protected");
    fs::create_dir_all(protected.join("deep").join("er")).unwrap();
    let outside = dir.path().join("outside");
    fs::create_dir(&outside).unwrap();

    let guard = PathGuard::new(ProtectedRootSet::new(vec![protected.clone()]));

    assert!(!guard.is_safe(&protected));
    assert!(!guard.is_safe(&protected.join("deep").join("er")));
    assert!(guard.is_safe(&outside));
    assert!(guard.is_safe(dir.path()));
}

#[test]
fn test_prefix_is_component_wise() {
    let dir = tempdir().unwrap();
    let protected = dir.path().join("data");
    let sibling = dir.path().join("data-backup");
    fs::create_dir(&protected).unwrap();
    fs::create_dir(&sibling).unwrap();

    let guard = PathGuard::new(ProtectedRootSet::new(vec![protected]));

    assert!(guard.is_safe(&sibling));
}

#[test]
fn test_missing_target_fails_closed() {
    let dir = tempdir().unwrap();
    let guard = PathGuard::default();

    match guard.check(&dir.path().join("nope")) {
        Err(GuardError::Unresolvable { .. }) => {}
        other => panic!("Expected Unresolvable, got {other:?}"),
    }
}

#[test]
#[cfg(unix)]
fn test_symlink_into_protected_root_is_unsafe() {
    let dir = tempdir().unwrap();
    let protected = dir.path().join("protected");
    fs::create_dir(&protected).unwrap();
    let link = dir.path().join("innocent");
    std::os::unix::fs::symlink(&protected, &link).unwrap();

    let guard = PathGuard::new(ProtectedRootSet::new(vec![protected]));

    assert!(!guard.is_safe(&link));
    match guard.check(&link) {
        Err(GuardError::Protected { path, root }) => assert!(path.starts_with(root)),
        other => panic!("Expected Protected, got {other:?}"),
    }
}

#[test]
#[cfg(unix)]
fn test_dot_dot_cannot_escape_into_protected_root() {
    let dir = tempdir().unwrap();
    let protected = dir.path().join("protected");
    let other = dir.path().join("other");
    fs::create_dir(&protected).unwrap();
    fs::create_dir(&other).unwrap();

    let guard = PathGuard::new(ProtectedRootSet::new(vec![protected]));

    assert!(!guard.is_safe(&other.join("..").join("protected")));
}

#[test]
fn test_default_roots_are_absolute() {
    let roots = default_protected_roots();
    assert!(!roots.is_empty());
    assert!(roots.iter().all(|r| r.is_absolute()));
}

#[test]
#[cfg(target_os = "linux")]
fn test_system_directory_is_protected_by_default() {
    let guard = PathGuard::new(ProtectedRootSet::new(default_protected_roots()));
    assert!(!guard.is_safe(std::path::Path::new("/etc")));
    assert!(!guard.is_safe(std::path::Path::new("/usr/bin")));
}

#[test]
fn test_dedupe_skips_protected_directory_nested_under_root() {
    let dir = tempdir().unwrap();
    let work = dir.path().join("work");
    let system = work.join("usr");
    fs::create_dir_all(&system).unwrap();
    fs::write(work.join("a.conf"), "system-config").unwrap();
    fs::write(system.join("sys.conf"), "system-config").unwrap();

    let guard = PathGuard::new(ProtectedRootSet::new(vec![system.clone()]));
    let stats = QuarantineMover::new(guard, FinderConfig::default())
        .run(&work)
        .unwrap();

    assert!(!stats.blocked);
    assert_eq!(stats.groups_found, 0);
    assert_eq!(stats.moved_count, 0);
    assert!(stats.outcomes.is_empty());
    assert!(system.join("sys.conf").exists());
    assert!(work.join("a.conf").exists());
}

#[test]
#[cfg(unix)]
fn test_dedupe_does_not_follow_link_into_protected_directory() {
    let dir = tempdir().unwrap();
    let work = dir.path().join("work");
    let protected = dir.path().join("protected");
    fs::create_dir(&work).unwrap();
    fs::create_dir(&protected).unwrap();
    fs::write(work.join("a.conf"), "system-config").unwrap();
    fs::write(protected.join("sys.conf"), "system-config").unwrap();
    std::os::unix::fs::symlink(&protected, work.join("z_link")).unwrap();

    let walker_config = WalkerConfig {
        follow_symlinks: true,
        ..WalkerConfig::default()
    };
    let guard = PathGuard::new(ProtectedRootSet::new(vec![protected.clone()]));
    let stats = QuarantineMover::new(
        guard,
        FinderConfig::default().with_walker_config(walker_config),
    )
    .run(&work)
    .unwrap();

    assert_eq!(stats.moved_count, 0);
    assert!(stats
        .outcomes
        .iter()
        .all(|o| !matches!(o, MoveOutcome::Moved { .. })));
    assert!(protected.join("sys.conf").exists());
}

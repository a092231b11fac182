use std::fs::{self, File};
use std::io::Write;

use tempfile::tempdir;
use tidyfs::duplicates::{DuplicateFinder, FinderConfig};
use tidyfs::scanner::WalkerConfig;

fn write(path: &std::path::Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_groups(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_sizes_are_never_hashed() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"a");
    write(&dir.path().join("b.txt"), b"bb");
    write(&dir.path().join("c.txt"), b"ccc");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_groups(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_groups(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.hashed_files, 2);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"X");
    write(&dir.path().join("b.txt"), b"X");
    write(&dir.path().join("c.txt"), b"Y");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_groups(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    let names: Vec<_> = groups[0]
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 1);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    fs::create_dir(&sub).unwrap();
    write(&dir.path().join("z.txt"), b"dup");
    write(&sub.join("b.txt"), b"dup");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_groups(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    // "subdir" sorts before "z.txt", so the nested copy is the original
    assert_eq!(groups[0].original().unwrap().path, sub.join("b.txt"));
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_scan_multiple_groups_in_traversal_order() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("1a.txt"), b"group1");
    write(&dir.path().join("1b.txt"), b"group1");
    write(&dir.path().join("1c.txt"), b"group1");
    write(&dir.path().join("0a.txt"), b"group2!");
    write(&dir.path().join("2b.txt"), b"group2!");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_groups(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].size, 7);
    assert_eq!(groups[1].len(), 3);
    assert_eq!(summary.duplicate_files, 3);
    for group in &groups {
        assert!(group.len() >= 2);
        assert!(group.files.iter().all(|f| f.size == group.size));
    }
}

#[test]
fn test_scan_respects_size_filters() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1.txt"), b"s");
    write(&dir.path().join("small2.txt"), b"s");
    write(&dir.path().join("big1.txt"), &[7u8; 2048]);
    write(&dir.path().join("big2.txt"), &[7u8; 2048]);

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_size_range(Some(100), None));
    let (groups, summary) = DuplicateFinder::new(config)
        .find_groups(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 2048);
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    write(&dir.path().join(".hidden"), b"same");
    write(&dir.path().join("visible"), b"same");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        skip_hidden: true,
        ..WalkerConfig::default()
    });
    let (groups, summary) = DuplicateFinder::new(config)
        .find_groups(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_prunes_quarantine_directory() {
    let dir = tempdir().unwrap();
    let review = dir.path().join("Duplicate_Review");
    fs::create_dir(&review).unwrap();
    write(&dir.path().join("a.txt"), b"X");
    write(&review.join("a.txt"), b"X");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_groups(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);

    let everything = FinderConfig::default().with_quarantine_dir(None);
    let (groups, _) = DuplicateFinder::new(everything)
        .find_groups(dir.path())
        .unwrap();
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = tempdir().unwrap();
    for i in 0..24 {
        let content = format!("content-{}", i % 5);
        write(&dir.path().join(format!("f{i:02}.txt")), content.as_bytes());
    }

    let (sequential, _) = DuplicateFinder::with_defaults()
        .find_groups(dir.path())
        .unwrap();
    let (parallel, _) = DuplicateFinder::new(FinderConfig::default().with_io_threads(4))
        .find_groups(dir.path())
        .unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(sequential.len(), 5);
}

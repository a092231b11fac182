use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tempfile::tempdir;
use tidyfs::audit::AuditLog;
use tidyfs::cli::Cli;
use tidyfs::config::Config;
use tidyfs::error::ExitCode;
use tidyfs::output::Report;

fn config_without_protection(root: &Path) -> Config {
    Config {
        protected_roots: Vec::new(),
        audit_log: None,
        temp_dirs: vec![root.join("tmp")],
        ..Config::default()
    }
}

fn run(args: &[&str], config: Config) -> Report {
    let cli = Cli::try_parse_from(args).unwrap();
    tidyfs::execute(&cli, config, Arc::new(AuditLog::disabled())).unwrap()
}

#[test]
fn test_dedupe_command() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    fs::write(dir.path().join("a.txt"), "X").unwrap();
    fs::write(dir.path().join("b.txt"), "X").unwrap();

    let report = run(
        &["tidyfs", "-q", "dedupe", root],
        config_without_protection(dir.path()),
    );

    assert_eq!(report.exit_code(), ExitCode::Success);
    assert!(dir.path().join("Duplicate_Review").join("b.txt").exists());
}

#[test]
fn test_dedupe_flags_override_config() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    fs::write(dir.path().join("a.txt"), "X").unwrap();
    fs::write(dir.path().join("b.txt"), "X").unwrap();

    let report = run(
        &["tidyfs", "-q", "dedupe", root, "--quarantine-dir", "Dupes", "--io-threads", "2"],
        config_without_protection(dir.path()),
    );

    assert_eq!(report.exit_code(), ExitCode::Success);
    assert!(dir.path().join("Dupes").join("b.txt").exists());
}

#[test]
fn test_dedupe_protect_flag_blocks() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    fs::write(dir.path().join("a.txt"), "X").unwrap();
    fs::write(dir.path().join("b.txt"), "X").unwrap();

    let report = run(
        &["tidyfs", "-q", "dedupe", root, "--protect", root],
        config_without_protection(dir.path()),
    );

    assert_eq!(report.exit_code(), ExitCode::Blocked);
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_dedupe_nothing_to_do() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), "X").unwrap();

    let report = run(
        &["tidyfs", "-q", "dedupe", dir.path().to_str().unwrap()],
        config_without_protection(dir.path()),
    );

    assert_eq!(report.exit_code(), ExitCode::NothingToDo);
}

#[test]
fn test_dedupe_bad_root_is_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");
    let cli = Cli::try_parse_from(["tidyfs", "dedupe", missing.to_str().unwrap()]).unwrap();

    let err = tidyfs::execute(
        &cli,
        config_without_protection(dir.path()),
        Arc::new(AuditLog::disabled()),
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("Cannot dedupe"));
}

#[test]
fn test_dedupe_invalid_override_is_error() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "tidyfs",
        "dedupe",
        dir.path().to_str().unwrap(),
        "--quarantine-dir",
        "a/b",
    ])
    .unwrap();

    assert!(tidyfs::execute(
        &cli,
        config_without_protection(dir.path()),
        Arc::new(AuditLog::disabled())
    )
    .is_err());
}

#[test]
fn test_organize_command() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("pic.png"), "img").unwrap();

    let report = run(
        &["tidyfs", "organize", dir.path().to_str().unwrap()],
        config_without_protection(dir.path()),
    );

    assert_eq!(report.exit_code(), ExitCode::Success);
    assert!(dir.path().join("Images").join("pic.png").exists());
}

#[test]
fn test_clean_temp_uses_configured_dirs() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("tmp")).unwrap();
    fs::write(dir.path().join("tmp").join("junk"), "junk").unwrap();

    let report = run(&["tidyfs", "clean-temp"], config_without_protection(dir.path()));

    match report {
        Report::CleanTemp(stats) => assert_eq!(stats.deleted, 1),
        other => panic!("Expected CleanTemp, got {other:?}"),
    }
    assert!(dir.path().join("tmp").exists());
}

#[test]
fn test_clean_temp_dir_flag_replaces_config() {
    let dir = tempdir().unwrap();
    let other = dir.path().join("other");
    fs::create_dir(dir.path().join("tmp")).unwrap();
    fs::create_dir(&other).unwrap();
    fs::write(dir.path().join("tmp").join("keep"), "k").unwrap();
    fs::write(other.join("junk"), "j").unwrap();

    run(
        &["tidyfs", "clean-temp", "--dir", other.to_str().unwrap()],
        config_without_protection(dir.path()),
    );

    assert!(dir.path().join("tmp").join("keep").exists());
    assert!(!other.join("junk").exists());
}

#[test]
fn test_sweep_command_live_flag() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();
    let root = dir.path().to_str().unwrap();

    let dry = run(&["tidyfs", "sweep", root], config_without_protection(dir.path()));
    assert!(dir.path().join("empty").exists());
    assert_eq!(dry.exit_code(), ExitCode::NothingToDo);

    let live = run(&["tidyfs", "sweep", root, "--live"], config_without_protection(dir.path()));
    assert!(!dir.path().join("empty").exists());
    assert_eq!(live.exit_code(), ExitCode::Success);
}

#[test]
fn test_run_app_with_config_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), "X").unwrap();
    fs::write(data.join("b.txt"), "X").unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "protected_roots = []\nquarantine_dir = \"FromConfig\"\n",
    )
    .unwrap();
    let audit_path = dir.path().join("audit.log");

    let cli = Cli::try_parse_from([
        "tidyfs",
        "--quiet",
        "--config",
        config_path.to_str().unwrap(),
        "--audit-log",
        audit_path.to_str().unwrap(),
        "dedupe",
        data.to_str().unwrap(),
    ])
    .unwrap();

    let code = {
        let _lock = crate::ENV_MUTEX.lock().unwrap();
        tidyfs::run_app(cli).unwrap()
    };

    assert_eq!(code, ExitCode::Success);
    assert!(data.join("FromConfig").join("b.txt").exists());
    assert!(fs::read_to_string(&audit_path)
        .unwrap()
        .contains("Moved duplicate:"));
}

#[test]
fn test_run_app_missing_config_is_error() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "tidyfs",
        "--config",
        dir.path().join("nope.toml").to_str().unwrap(),
        "sweep",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    assert!(tidyfs::run_app(cli).is_err());
}

use std::fs;
use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tempfile::tempdir;
use tidyfs::config::Config;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_env() {
    let _lock = crate::ENV_MUTEX.lock().unwrap();
    std::env::set_var("TIDYFS_QUARANTINE_DIR", "EnvReview");
    std::env::set_var("TIDYFS_IO_THREADS", "16");
    std::env::set_var("TIDYFS_ARCHIVE_FOLDER", "Installers");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("TIDYFS_").split("__"));
    let config: Result<Config, _> = figment.extract();

    std::env::remove_var("TIDYFS_QUARANTINE_DIR");
    std::env::remove_var("TIDYFS_IO_THREADS");
    std::env::remove_var("TIDYFS_ARCHIVE_FOLDER");

    let config = config.unwrap();
    assert_eq!(config.quarantine_dir, "EnvReview");
    assert_eq!(config.io_threads, 16);
    assert_eq!(config.archive_folder, "Installers");
    assert_eq!(config.chunk_size, Config::default().chunk_size);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
protected_roots = ["/opt/vendor"]
audit_log = "/var/tmp/tidyfs.log"
chunk_size = 65536
archive_folder = "Archives"
archive_extensions = ["zip"]

[categories]
Images = ["jpg", "png"]
"#,
    )
    .unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.protected_roots, vec![PathBuf::from("/opt/vendor")]);
    assert_eq!(config.audit_log, Some(PathBuf::from("/var/tmp/tidyfs.log")));
    assert_eq!(config.chunk_size, 65536);
    assert_eq!(config.archive_folder, "Archives");
    assert_eq!(config.archive_extensions, vec!["zip"]);
    // Tables merge key by key
    assert_eq!(config.categories["Images"], vec!["jpg", "png"]);
    assert!(config.categories.contains_key("Documents"));
}

#[test]
fn test_config_layered_figment_helper() {
    let _lock = crate::ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 3\n").unwrap();

    std::env::set_var("TIDYFS_IO_THREADS", "5");
    let config: Result<Config, _> = Config::figment(&config_path).extract();
    std::env::remove_var("TIDYFS_IO_THREADS");

    assert_eq!(config.unwrap().io_threads, 5);
}

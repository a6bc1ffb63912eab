use action_keeper::config::{DEFAULT_AUTHORITY, DEFAULT_MODULE_ADDRESS};
use action_keeper::KeeperConfig;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("action.toml");
    fs::write(
        &path,
        format!(
            r#"
address_prefix = "lumera"
authority = "{}"
denom = "ulume"

[sweeper]
enabled = false
interval_secs = 0

[logging]
level = "debug"
format = "json"

[logging.module_filters]
action_storage = "warn"
"#,
            DEFAULT_AUTHORITY
        ),
    )
    .unwrap();

    let config = KeeperConfig::load(&path).unwrap();
    assert!(!config.sweeper.enabled);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert_eq!(
        config.logging.module_filters.get("action_storage").map(String::as_str),
        Some("warn")
    );
    assert_eq!(config.module_address, DEFAULT_MODULE_ADDRESS);
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.toml");

    let mut config = KeeperConfig::default();
    config.sweeper.interval_secs = 12;
    config.logging.file_output = Some(dir.path().join("action.log"));
    config.save_to_file(&path).unwrap();

    let reloaded = KeeperConfig::load(&path).unwrap();
    assert_eq!(reloaded.sweeper.interval_secs, 12);
    assert_eq!(reloaded.logging.file_output, config.logging.file_output);
    assert_eq!(reloaded.authority, config.authority);
}

#[test]
fn test_missing_or_invalid_file() {
    let dir = TempDir::new().unwrap();
    assert!(KeeperConfig::load(&dir.path().join("absent.toml")).is_err());

    let path = dir.path().join("broken.toml");
    fs::write(&path, "denom = [").unwrap();
    assert!(KeeperConfig::load(&path).is_err());

    fs::write(&path, "denom = \"u\"").unwrap();
    assert!(KeeperConfig::load(&path).is_err());
}

//! The global subscriber installs once per process; keep this file to one test.

use action_keeper::config::LoggingConfig;
use action_keeper::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_init_logging_once_with_file_output() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("action.log");
    let config = LoggingConfig {
        format: "json".to_string(),
        file_output: Some(log_path.clone()),
        ..LoggingConfig::default()
    };

    init_logging(&config).unwrap();
    assert!(log_path.exists());

    tracing::info!("📝 Logging installed");
    assert!(init_logging(&config).is_err());
}

// tests/config_test.rs
use git_bump::config::{load_config, Config, LOCAL_CONFIG_FILE};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
remote = "upstream"
initial_tag = "v1.0.0-alpha"

[push]
default = true

[version_file]
constant = "VERSION"
dev_suffix = "snapshot"
commit = false

[lock]
attempts = 5
retry_delay_ms = 20
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.remote, "upstream");
    assert_eq!(config.initial_tag, "v1.0.0-alpha");
    assert!(config.push.default);
    assert_eq!(config.version_file.constant, "VERSION");
    assert_eq!(config.version_file.dev_suffix, "snapshot");
    assert!(!config.version_file.commit);
    assert_eq!(config.lock.attempts, 5);
    assert_eq!(config.lock.retry_delay_ms, 20);
    assert_eq!(config.lock.stale_after_secs, 300);
}

#[test]
fn test_invalid_file_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[push]\ndefault = \"yes\"\n").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("Invalid TOML"));
}

#[test]
#[serial]
fn test_local_config_file_is_found() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(LOCAL_CONFIG_FILE), "remote = \"fork\"\n").unwrap();

    let original = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();
    let result = load_config(None);
    env::set_current_dir(original).unwrap();

    assert_eq!(result.unwrap().remote, "fork");
}

#[test]
#[serial]
fn test_explicit_path_wins_over_local_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(LOCAL_CONFIG_FILE), "remote = \"fork\"\n").unwrap();
    let explicit = dir.path().join("other.toml");
    std::fs::write(&explicit, "remote = \"mirror\"\n").unwrap();

    let original = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();
    let result = load_config(Some(explicit.to_str().unwrap()));
    env::set_current_dir(original).unwrap();

    assert_eq!(result.unwrap().remote, "mirror");
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = Config::default();
    let text = toml::to_string(&config).unwrap();
    assert_eq!(Config::from_toml(&text).unwrap(), config);
}

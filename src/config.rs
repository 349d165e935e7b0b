use crate::domain::{PreRelease, Version};
use crate::error::{BumpError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "gitbump.toml";

/// File name looked up in the user config directory.
pub const USER_CONFIG_FILE: &str = ".gitbump.toml";

/// Represents the complete configuration for git-bump.
///
/// Contains the remote and starting tag plus push, version file and lock settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_initial_tag")]
    pub initial_tag: String,

    #[serde(default)]
    pub push: PushConfig,

    #[serde(default)]
    pub version_file: VersionFileConfig,

    #[serde(default)]
    pub lock: LockConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_initial_tag() -> String {
    "v0.1.0".to_string()
}

/// Fallback push behavior when neither the CLI nor the repository decides.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PushConfig {
    #[serde(default)]
    pub default: bool,
}

/// Settings for rewriting a version constant after tagging.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionFileConfig {
    #[serde(default = "default_constant")]
    pub constant: String,

    #[serde(default = "default_dev_suffix")]
    pub dev_suffix: String,

    #[serde(default = "default_true")]
    pub commit: bool,
}

fn default_constant() -> String {
    "Version".to_string()
}

fn default_dev_suffix() -> String {
    "dev".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for VersionFileConfig {
    fn default() -> Self {
        VersionFileConfig {
            constant: default_constant(),
            dev_suffix: default_dev_suffix(),
            commit: true,
        }
    }
}

/// Retry policy for the repository lock file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LockConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_attempts() -> u32 {
    30
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_stale_after_secs() -> u64 {
    300
}

impl LockConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        LockConfig {
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: default_remote(),
            initial_tag: default_initial_tag(),
            push: PushConfig::default(),
            version_file: VersionFileConfig::default(),
            lock: LockConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| BumpError::config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot
    pub fn validate(&self) -> Result<()> {
        Version::parse(&self.initial_tag).map_err(|e| {
            BumpError::config(format!("initial_tag is not a version tag: {}", e))
        })?;

        if self.remote.trim().is_empty() {
            return Err(BumpError::config("remote must not be empty"));
        }

        if self.version_file.constant.trim().is_empty() {
            return Err(BumpError::config("version_file.constant must not be empty"));
        }

        let dev_suffix = &self.version_file.dev_suffix;
        if dev_suffix.is_empty() {
            return Err(BumpError::config("version_file.dev_suffix must not be empty"));
        }
        PreRelease::parse(dev_suffix).map_err(|_| {
            BumpError::config(format!(
                "version_file.dev_suffix '{}' must be dot-separated [0-9A-Za-z-] identifiers",
                dev_suffix
            ))
        })?;

        if self.lock.attempts == 0 {
            return Err(BumpError::config("lock.attempts must be at least 1"));
        }

        Ok(())
    }
}

/// Returns the first existing configuration file, if any.
fn locate_config(config_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(PathBuf::from(path));
    }

    let local = Path::new(".").join(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(USER_CONFIG_FILE))
        .filter(|path| path.exists())
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitbump.toml` in current directory
/// 3. `.gitbump.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    match locate_config(config_path) {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            let text = fs::read_to_string(&path).map_err(|e| {
                BumpError::config(format!("Cannot read {}: {}", path.display(), e))
            })?;
            Config::from_toml(&text)
        }
        None => {
            debug!("no configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

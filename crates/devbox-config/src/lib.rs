//! devbox settings
//!
//! Settings come from an optional YAML file, then environment variables,
//! then command-line flags (applied by the binary). Every field has a
//! built-in default except the API key.

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Explicit settings file path
pub const CONFIG_PATH_ENV: &str = "DEVBOX_CONFIG_PATH";
pub const API_KEY_ENV: &str = "LAMBDA_API_KEY";
pub const BASE_URL_ENV: &str = "LAMBDA_API_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://cloud.lambda.ai/api/v1";

const LOCAL_CANDIDATES: [&str; 2] = ["devbox.yaml", ".devbox.yaml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub ssh: SshSettings,
    pub wait: WaitSettings,
    pub launch: LaunchDefaults,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    pub username: String,
    /// Key used by `up` when `--ssh-key` is not given
    pub key_name: Option<String>,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            username: "ubuntu".to_string(),
            key_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    pub timeout_secs: u64,
    pub poll_interval_secs: f64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            poll_interval_secs: 5.0,
        }
    }
}

/// Defaults for `devbox up`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchDefaults {
    pub region: Option<String>,
    pub instance_type: Option<String>,
    pub image_id: Option<String>,
    pub filesystem_name: Option<String>,
}

impl Settings {
    /// Discover, parse and apply environment overrides
    ///
    /// Not validated: the caller may still override fields from flags.
    pub fn load() -> Result<Self> {
        let mut settings = match find_config_file()? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // an empty document is null to serde_yaml
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `LAMBDA_API_KEY` and `LAMBDA_API_BASE_URL`; empty values are ignored
    pub fn apply_env(&mut self) {
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            self.api.api_key = Some(key);
        }
        if let Some(url) = non_empty_env(BASE_URL_ENV) {
            self.api.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.api.api_key.as_deref() {
            None => {
                return Err(ConfigError::Invalid(format!(
                    "API key is not set (use --api-key, {} or api.api_key)",
                    API_KEY_ENV
                )));
            }
            Some(key) if key.trim().is_empty() => {
                return Err(ConfigError::Invalid("API key is empty".to_string()));
            }
            Some(_) => {}
        }

        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".to_string()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.wait.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "wait.timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.poll_interval()?;

        Ok(())
    }

    /// The API key, once [`Settings::validate`] has passed
    pub fn api_key(&self) -> &str {
        self.api.api_key.as_deref().unwrap_or_default()
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait.timeout_secs)
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        validate_poll_interval(self.wait.poll_interval_secs)
    }
}

/// Poll intervals must be positive and fit in a [`Duration`]
pub fn validate_poll_interval(secs: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(interval) if secs > 0.0 => Ok(interval),
        _ => Err(ConfigError::Invalid(format!(
            "poll interval must be a positive number of seconds, got {}",
            secs
        ))),
    }
}

/// Global settings path: `<config dir>/devbox/config.yaml`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("devbox").join("config.yaml"))
}

/// Find the settings file
///
/// Search order:
/// 1. `DEVBOX_CONFIG_PATH` (must exist when set)
/// 2. current directory: `devbox.yaml`, `.devbox.yaml`
/// 3. `<config dir>/devbox/config.yaml`
///
/// `Ok(None)` means no file anywhere; defaults apply.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Some(config_path) = non_empty_env(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in &LOCAL_CANDIDATES {
        let path = current_dir.join(filename);
        if path.is_file() {
            return Ok(Some(path));
        }
    }

    Ok(global_config_path().filter(|path| path.is_file()))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

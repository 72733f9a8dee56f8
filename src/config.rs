//! Configuration loading and precedence
//!
//! Sources, lowest to highest: built-in defaults, user config
//! (`<config_dir>/zdd/config.toml`), project `zdd.toml` in the working
//! directory, `ZDD_*` environment variables, command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ZddError, ZddResult};

/// Default deployments root, relative to the working directory.
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments";

/// Default wall-clock limit for one phase script, in seconds.
pub const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 300;

/// Tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection string.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Deployments root directory.
    #[serde(default = "default_deployments_path")]
    pub deployments_path: PathBuf,

    /// Per-script timeout in seconds.
    #[serde(default = "default_script_timeout_secs")]
    pub script_timeout_secs: u64,
}

fn default_deployments_path() -> PathBuf {
    PathBuf::from(DEFAULT_DEPLOYMENTS_PATH)
}

fn default_script_timeout_secs() -> u64 {
    DEFAULT_SCRIPT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            deployments_path: default_deployments_path(),
            script_timeout_secs: default_script_timeout_secs(),
        }
    }
}

impl Config {
    /// Apply command-line flags. Flags have the highest precedence.
    pub fn with_flags(
        mut self,
        database_url: Option<String>,
        deployments_path: Option<PathBuf>,
    ) -> Self {
        if let Some(url) = database_url {
            self.database_url = Some(url);
        }
        if let Some(path) = deployments_path {
            self.deployments_path = path;
        }
        self
    }

    /// Deployments root as an absolute path, resolved against the working
    /// directory. Scripts receive it via `ZDD_DEPLOYMENTS_PATH`.
    pub fn absolute_deployments_path(&self) -> PathBuf {
        if self.deployments_path.is_absolute() {
            self.deployments_path.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&self.deployments_path))
                .unwrap_or_else(|_| self.deployments_path.clone())
        }
    }

    pub fn script_timeout(&self) -> Duration {
        Duration::from_secs(self.script_timeout_secs)
    }
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub suggestion: Option<String>,
}

/// Load a config file and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> ZddResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ZddError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                suggestion: suggest_key(&key),
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from project config, user config, or defaults, then apply env
/// overrides.
pub fn load_or_default(working_dir: &Path) -> (Config, Vec<ConfigWarning>) {
    let project_config = working_dir.join("zdd.toml");
    if project_config.exists() {
        if let Ok((config, warnings)) = load_with_warnings(&project_config) {
            return (with_env_overrides(config), warnings);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join("zdd/config.toml");
        if user_config.exists() {
            if let Ok((config, warnings)) = load_with_warnings(&user_config) {
                return (with_env_overrides(config), warnings);
            }
        }
    }

    (with_env_overrides(Config::default()), Vec::new())
}

/// Apply environment variable overrides (`ZDD_*` prefix).
pub fn with_env_overrides(mut config: Config) -> Config {
    if let Ok(url) = std::env::var("ZDD_DATABASE_URL") {
        if !url.is_empty() {
            config.database_url = Some(url);
        }
    }

    if let Ok(path) = std::env::var("ZDD_DEPLOYMENTS_PATH") {
        if !path.is_empty() {
            config.deployments_path = PathBuf::from(path);
        }
    }

    config
}

const KNOWN_KEYS: [&str; 3] = ["database_url", "deployments_path", "script_timeout_secs"];

/// Suggest the closest known key for a typo'd config key.
fn suggest_key(key: &str) -> Option<String> {
    let normalized = key.to_lowercase().replace('-', "_");
    KNOWN_KEYS
        .iter()
        .find(|known| {
            known.replace('_', "") == normalized.replace('_', "")
                || known.starts_with(&normalized)
                || normalized.starts_with(*known)
        })
        .map(|s| s.to_string())
}

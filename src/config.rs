use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::Interval;
use crate::error::Result;
use crate::git::BackendKind;

pub const CONFIG_FILE_NAME: &str = "fourkeys.toml";

/// Represents the complete configuration for four-keys.
///
/// Every value may be overridden from the command line.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub time_series: TimeSeriesConfig,
}

/// Settings applied to every release query.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct QueryConfig {
    /// Regex over tag names; matching tags are not releases
    #[serde(default)]
    pub ignore_pattern: Option<String>,

    /// Regex over commit messages; defaults to containing "hotfix"
    #[serde(default)]
    pub fix_commit_pattern: Option<String>,

    #[serde(default)]
    pub backend: BackendKind,

    /// Worker threads, 0 for one per core
    #[serde(default)]
    pub jobs: usize,

    /// Length of the default range when `--since` is omitted. When unset the
    /// range starts one calendar month ago.
    #[serde(default)]
    pub since_days_ago: Option<u32>,
}

/// Settings for the `time-series` command.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct TimeSeriesConfig {
    #[serde(default)]
    pub interval: Interval,
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `fourkeys.toml` in current directory
/// 3. `.fourkeys.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

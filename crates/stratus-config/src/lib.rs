pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "https://api.elastic-cloud.com";
pub const DEFAULT_REGION: &str = "us-east-1";

const CANDIDATES: [&str; 3] = ["stratus.yaml", "stratus.yml", "stratus.json"];

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "output",
                value: s.to_string(),
            }),
        }
    }
}

/// Resolved process configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Control plane API endpoint
    pub host: String,
    pub api_key: Option<String>,
    pub region: String,
    pub output: OutputFormat,
    /// Per-request HTTP timeout
    pub timeout_secs: u64,
    /// Polling interval while tracking a deployment
    pub track_interval_secs: u64,
    pub insecure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_key: None,
            region: DEFAULT_REGION.to_string(),
            output: OutputFormat::Text,
            timeout_secs: 30,
            track_interval_secs: 5,
            insecure: false,
        }
    }
}

impl Config {
    /// Load the configuration
    ///
    /// The file found by [`find_config_file`] is read when present, then
    /// `STRATUS_*` environment variables override it.
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file()? {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                load_file(&path)?
            }
            None => Config::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STRATUS_HOST`, `STRATUS_API_KEY`, `STRATUS_REGION` and
    /// `STRATUS_OUTPUT`
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(host) = env_value("STRATUS_HOST") {
            self.host = host;
        }
        if let Some(api_key) = env_value("STRATUS_API_KEY") {
            self.api_key = Some(api_key);
        }
        if let Some(region) = env_value("STRATUS_REGION") {
            self.region = region;
        }
        if let Some(output) = env_value("STRATUS_OUTPUT") {
            self.output = output.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "host",
                value: self.host.clone(),
            });
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "region",
                value: self.region.clone(),
            });
        }
        if self.track_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "track_interval_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn track_interval(&self) -> Duration {
        Duration::from_secs(self.track_interval_secs)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get the global config directory for Stratus
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stratus"))
}

/// Find the configuration file
///
/// Search order:
/// 1. `STRATUS_CONFIG` environment variable (direct path, must exist)
/// 2. Current directory: stratus.yaml, stratus.yml, stratus.json
/// 3. `<config_dir>/stratus/config.yaml` (global configuration)
///
/// Returns `Ok(None)` when no file exists; defaults apply in that case.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. Direct path
    if let Some(config_path) = env_value("STRATUS_CONFIG") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    // 2. Current directory
    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 3. Global configuration
    if let Some(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Read a config file, choosing the decoder by extension
pub fn load_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        _ => {
            if content.trim().is_empty() {
                return Ok(Config::default());
            }
            serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))
        }
    }
}

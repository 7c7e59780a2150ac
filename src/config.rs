use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, warn};

use crate::client::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub limits: RateLimits,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
const fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            email: None,
            key: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Provider quota, shared between `workers` clients running side by side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimits {
    #[serde(default = "default_quota")]
    pub quota: u32,
    #[serde(default = "default_period")]
    pub period_seconds: u64,
    #[serde(default = "default_workers")]
    pub workers: u32,
}

const fn default_quota() -> u32 {
    1200
}
const fn default_period() -> u64 {
    300
}
const fn default_workers() -> u32 {
    1
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            quota: default_quota(),
            period_seconds: default_period(),
            workers: default_workers(),
        }
    }
}

impl RateLimits {
    /// Calls one client may issue per window
    #[must_use]
    pub fn max_calls(&self) -> u32 {
        self.quota / self.workers.max(1)
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.period_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file at the specified path
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The file cannot be read
    /// - The TOML content cannot be parsed into the Config structure
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load configuration from environment variables on top of the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric environment variable cannot be parsed
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields with any `CFCTL_*` environment variables that are set
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric environment variable cannot be parsed
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(email) = env::var("CFCTL_EMAIL") {
            self.api.email = Some(email);
        }
        if let Ok(key) = env::var("CFCTL_KEY") {
            self.api.key = Some(key);
        }
        if let Ok(base_url) = env::var("CFCTL_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(timeout) = env::var("CFCTL_TIMEOUT") {
            self.api.timeout_seconds = timeout.parse().context("Invalid CFCTL_TIMEOUT")?;
        }

        if let Ok(quota) = env::var("CFCTL_QUOTA") {
            self.limits.quota = quota.parse().context("Invalid CFCTL_QUOTA")?;
        }
        if let Ok(period) = env::var("CFCTL_PERIOD") {
            self.limits.period_seconds = period.parse().context("Invalid CFCTL_PERIOD")?;
        }
        if let Ok(workers) = env::var("CFCTL_WORKERS") {
            self.limits.workers = workers.parse().context("Invalid CFCTL_WORKERS")?;
        }

        if let Ok(level) = env::var("CFCTL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("CFCTL_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Locations searched for a config file, in priority order
    #[must_use]
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("cfctl.toml")];
        if let Ok(current_dir) = env::current_dir() {
            paths.push(current_dir.join("cfctl.toml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("cfctl").join("config.toml"));
        }
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".config/cfctl/config.toml"));
        }
        paths.push(PathBuf::from("/etc/cfctl/config.toml"));
        paths
    }

    /// Load configuration from the default locations and environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - Environment variables contain invalid values
    /// - Configuration validation fails
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from `path`, or from the first default location that
    /// exists, then apply environment overrides and validate
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - An explicitly given file cannot be read or parsed
    /// - Environment variables contain invalid values
    /// - Configuration validation fails
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            debug!("Loading config from {}", path.display());
            Self::from_file(path)?
        } else {
            Self::discover()
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn discover() -> Self {
        for path in Self::default_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => warn!("Ignoring config at {}: {:#}", path.display(), e),
            }
        }
        debug!("No config file found, using defaults");
        Self::default()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The API email or key is missing
    /// - A rate limit value is zero or leaves no calls per worker
    /// - The log format is unknown
    pub fn validate(&self) -> Result<()> {
        if self.api.email.as_deref().unwrap_or_default().is_empty() {
            return Err(anyhow!("API email is required"));
        }
        if self.api.key.as_deref().unwrap_or_default().is_empty() {
            return Err(anyhow!("API key is required"));
        }
        if self.limits.quota == 0 {
            return Err(anyhow!("quota must be greater than 0"));
        }
        if self.limits.period_seconds == 0 {
            return Err(anyhow!("period_seconds must be greater than 0"));
        }
        if self.limits.workers == 0 {
            return Err(anyhow!("workers must be greater than 0"));
        }
        if self.limits.max_calls() == 0 {
            return Err(anyhow!(
                "quota of {} cannot be shared between {} workers",
                self.limits.quota,
                self.limits.workers
            ));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(anyhow!(
                "log format must be \"text\" or \"json\", got {:?}",
                self.logging.format
            ));
        }
        Ok(())
    }
}

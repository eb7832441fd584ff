//! Configuration management for the report pipelines
//!
//! This module loads the API credentials and pipeline settings once at
//! process start, with support for environment variables (and a `.env`
//! file loaded by the binaries) or in-memory values for tests.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ServiceError};
use crate::util::parse_duration;

/// Default API namespace root
pub const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com/v1";

/// Default number of diagnostic logs requested per signature
pub const DEFAULT_LOG_LIMIT: u32 = 5;

/// Prefix for all environment variables read by the tools
pub const ENV_PREFIX: &str = "ASC";

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value.trim().parse::<i64>()
            .map_err(|e| ServiceError::configuration(format!("Invalid integer for key {}: {}", key, e)))
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    pub(crate) fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key)
            .map_err(|e| {
                match e {
                    env::VarError::NotPresent => {
                        ServiceError::configuration(format!("Environment variable not set: {}", env_key))
                    }
                    env::VarError::NotUnicode(_) => {
                        ServiceError::configuration(format!("Environment variable is not valid unicode: {}", env_key))
                    }
                }
            })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// Trait for validated configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;
}

/// How the diagnostics pipeline paces itself between logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacingMode {
    /// Wait for the operator to press Enter
    Interactive,
    /// Continue immediately
    None,
    /// Sleep for a fixed delay
    Delay(Duration),
}

impl std::str::FromStr for PacingMode {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "interactive" | "enter" => Ok(PacingMode::Interactive),
            "none" | "off" | "auto" => Ok(PacingMode::None),
            other => parse_duration(other)
                .map(PacingMode::Delay)
                .ok_or_else(|| ServiceError::configuration(format!("Invalid pacing mode: {}", s))),
        }
    }
}

/// Credentials and settings shared by both report pipelines
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Issuer identity of the API key
    pub issuer_id: String,

    /// Key identity bound into the token header
    pub key_id: String,

    /// Path to the PEM-encoded private key
    pub private_key_path: PathBuf,

    /// API root, e.g. `https://api.appstoreconnect.apple.com/v1`
    pub base_url: String,

    /// `limit` sent when fetching diagnostic logs
    pub log_limit: u32,

    /// Request timeout; `None` keeps the transport default
    pub timeout_seconds: Option<u64>,

    /// Pacing between rendered diagnostic logs
    pub pacing: PacingMode,
}

impl ConnectConfig {
    /// Config with the given credentials and every other setting at its default
    pub fn new(
        issuer_id: impl Into<String>,
        key_id: impl Into<String>,
        private_key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            key_id: key_id.into(),
            private_key_path: private_key_path.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            log_limit: DEFAULT_LOG_LIMIT,
            timeout_seconds: None,
            pacing: PacingMode::Interactive,
        }
    }

    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let issuer_id = provider.get_string("issuer_id")?;
        let key_id = provider.get_string("key_id")?;
        let private_key_path = provider.get_string("private_key_path")?;
        let base_url = provider.get_string_or("base_url", DEFAULT_BASE_URL);

        let log_limit = match provider.get_string("log_limit") {
            Ok(_) => {
                let limit = provider.get_int("log_limit")?;
                u32::try_from(limit)
                    .map_err(|_| ServiceError::configuration(format!("Invalid log limit: {}", limit)))?
            }
            Err(_) => DEFAULT_LOG_LIMIT,
        };

        let timeout_seconds = match provider.get_string("timeout_seconds") {
            Ok(_) => Some(provider.get_int("timeout_seconds")?.max(1) as u64),
            Err(_) => None,
        };

        let pacing = match provider.get_string("pacing") {
            Ok(mode) => mode.parse()?,
            Err(_) => PacingMode::Interactive,
        };

        let config = Self {
            issuer_id,
            key_id,
            private_key_path: PathBuf::from(private_key_path),
            base_url: base_url.trim_end_matches('/').to_string(),
            log_limit,
            timeout_seconds,
            pacing,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `ASC_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&EnvConfigProvider::new().with_prefix(ENV_PREFIX))
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl ServiceConfig for ConnectConfig {
    fn validate(&self) -> Result<()> {
        if self.issuer_id.trim().is_empty() {
            return Err(ServiceError::configuration("Issuer ID is required"));
        }

        if self.key_id.trim().is_empty() {
            return Err(ServiceError::configuration("Key ID is required"));
        }

        if self.private_key_path.as_os_str().is_empty() {
            return Err(ServiceError::configuration("Private key path is required"));
        }

        if self.base_url.is_empty() {
            return Err(ServiceError::configuration("API base URL is required"));
        }

        if self.log_limit == 0 {
            return Err(ServiceError::configuration("Log limit must be at least 1"));
        }

        Ok(())
    }
}

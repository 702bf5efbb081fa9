//! Configuration for chirpy
//!
//! Settings come from an optional TOML file and are then overlaid with the
//! environment variables the service has always honored (`PORT`, `FS_PATH`,
//! `DSN`, `JWT_SECRET`, `POLKA_API_KEY`, `CHIRPY_RESET_DB`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Service-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChirpyConfig {
    /// Listener and static file settings
    pub server: ServerConfig,
    /// Backing document settings
    pub storage: StorageConfig,
    /// Secrets for token signing and the billing webhook
    pub auth: AuthConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub addr: String,
    /// Directory served under `/app`
    pub fileserver_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            fileserver_path: PathBuf::from("."),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Location of the JSON document
    pub path: PathBuf,
    /// Start from an empty document on every boot
    pub reset_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("database.json"),
            reset_on_start: true,
        }
    }
}

/// Authentication secrets. Both must be set before the service starts.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC key for access and refresh tokens
    pub jwt_secret: String,
    /// Key the billing provider presents on webhooks
    pub polka_api_key: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &str| if s.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("polka_api_key", &redact(&self.polka_api_key))
            .finish()
    }
}

impl ChirpyConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/chirpy/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chirpy").join("config.toml"))
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read a TOML file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml(&text)?)
    }

    /// Overlay values from the process environment
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, which maps a variable name to its value
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string(), port.clone()))?;
            let host = self
                .server
                .addr
                .rsplit_once(':')
                .map_or(self.server.addr.as_str(), |(host, _)| host);
            self.server.addr = format!("{host}:{port}");
        }
        if let Some(path) = lookup("FS_PATH") {
            self.server.fileserver_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("DSN") {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(key) = lookup("POLKA_API_KEY") {
            self.auth.polka_api_key = key;
        }
        if let Some(reset) = lookup("CHIRPY_RESET_DB") {
            self.storage.reset_on_start = match reset.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidValue("CHIRPY_RESET_DB".to_string(), reset)),
            };
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::MissingField("auth.jwt_secret".to_string()));
        }
        if self.auth.polka_api_key.is_empty() {
            return Err(ConfigError::MissingField("auth.polka_api_key".to_string()));
        }
        if self.server.addr.is_empty() {
            return Err(ConfigError::MissingField("server.addr".to_string()));
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("storage.path".to_string()));
        }
        Ok(())
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required field is missing or empty
    #[error("missing field: {0}")]
    MissingField(String),

    /// A value could not be interpreted
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

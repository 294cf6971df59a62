//! Configuration management for the gamehub webhook receiver
//!
//! Defaults, optional TOML file, environment overrides, then validation.

use crate::errors::{ConfigurationError, GamehubResult};
use serde::{Deserialize, Serialize};
use std::{env, fmt, path::Path};

pub const ENV_WEBHOOK_SECRET: &str = "GAMEHUB_WEBHOOK_SECRET";
pub const ENV_SIGNATURE_HEADER: &str = "GAMEHUB_SIGNATURE_HEADER";
pub const ENV_HOST: &str = "GAMEHUB_HOST";
pub const ENV_PORT: &str = "GAMEHUB_PORT";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "GAMEHUB_REQUEST_TIMEOUT_SECS";

/// Top-level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GamehubConfig {
    pub webhook: WebhookConfig,
    pub server: ServerConfig,
}

/// Webhook authentication settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared HMAC secret, never serialized back out
    #[serde(skip_serializing)]
    pub secret: String,
    /// Header carrying the hex signature
    pub signature_header: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            signature_header: "x-signature".to_string(),
        }
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &if self.secret.is_empty() { "<unset>" } else { "<redacted>" })
            .field("signature_header", &self.signature_header)
            .finish()
    }
}

/// HTTP receiver settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub webhook_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            webhook_path: "/webhook".to_string(),
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load from file (if set) and process environment, then validate
    pub fn load(&self) -> GamehubResult<GamehubConfig> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`ConfigLoader::load`] with an explicit variable lookup
    pub fn load_with<F>(&self, lookup: F) -> GamehubResult<GamehubConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => GamehubConfig::default(),
        };

        self.apply_env_overrides(&mut config, lookup)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> GamehubResult<GamehubConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides<F>(&self, config: &mut GamehubConfig, lookup: F) -> GamehubResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(ENV_WEBHOOK_SECRET) {
            config.webhook.secret = secret;
        }
        if let Some(header) = lookup(ENV_SIGNATURE_HEADER) {
            config.webhook.signature_header = header;
        }
        if let Some(host) = lookup(ENV_HOST) {
            config.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.server.port = port.parse().map_err(|_| ConfigurationError::InvalidValue {
                field: ENV_PORT.to_string(),
                value: port,
                reason: "Invalid port number".to_string(),
            })?;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            config.server.request_timeout_secs =
                timeout.parse().map_err(|_| ConfigurationError::InvalidValue {
                    field: ENV_REQUEST_TIMEOUT_SECS.to_string(),
                    value: timeout,
                    reason: "Invalid timeout value".to_string(),
                })?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self, config: &GamehubConfig) -> GamehubResult<()> {
        if config.webhook.secret.is_empty() {
            return Err(ConfigurationError::MissingRequired("webhook.secret".to_string()).into());
        }

        if config.webhook.signature_header.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("webhook.signature_header".to_string()).into());
        }

        if config.server.port == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
                reason: "Port cannot be zero".to_string(),
            }
            .into());
        }

        if config.server.request_timeout_secs == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "server.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout cannot be zero".to_string(),
            }
            .into());
        }

        if !config.server.webhook_path.starts_with('/') {
            return Err(ConfigurationError::InvalidValue {
                field: "server.webhook_path".to_string(),
                value: config.server.webhook_path.clone(),
                reason: "Path must start with '/'".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

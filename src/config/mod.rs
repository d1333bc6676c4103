//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file, then environment overrides:
//!
//! | Variable | Field |
//! |---|---|
//! | `STOCKROOM_CONFIG` | path of the YAML file |
//! | `HOST` | `server.host` |
//! | `PORT` | `server.port` |
//! | `JWT_SECRET` | `auth.jwt_secret` |
//! | `JWT_EXPIRE_HOURS` | `auth.token_ttl_hours` |

use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,

    #[validate(nested)]
    pub auth: AuthConfig,

    pub seed: SeedConfig,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    #[validate(range(min = 1, message = "port must be non-zero"))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Token signing settings
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AuthConfig {
    #[validate(length(min = 16, message = "jwt_secret must be at least 16 characters"))]
    pub jwt_secret: String,

    /// Token lifetime; defaults to seven days
    #[validate(range(min = 1, message = "token_ttl_hours must be at least 1"))]
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: 24 * 7,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// Startup data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Administrator created when no account with that username exists
    pub admin: Option<SeedAdmin>,

    /// Items inserted when the item store is empty
    pub items: Vec<SeedItem>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SeedAdmin {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub price: f64,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load from `STOCKROOM_CONFIG` (when set), apply process environment
    /// overrides and validate
    pub fn load() -> Result<Self> {
        let config = match std::env::var("STOCKROOM_CONFIG") {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        config
            .with_env_overrides(|key| std::env::var(key).ok())?
            .validated()
    }

    /// Apply overrides from an environment lookup
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_env("PORT", &port)?;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(hours) = lookup("JWT_EXPIRE_HOURS") {
            self.auth.token_ttl_hours = parse_env("JWT_EXPIRE_HOURS", &hours)?;
        }
        Ok(self)
    }

    /// Check field constraints, returning the config unchanged when they hold
    pub fn validated(self) -> Result<Self> {
        self.validate().map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: "not a valid number".to_string(),
    })
}

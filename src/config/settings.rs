//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::net::SocketAddr;

use reqwest::Url;
use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Where the MCP tools send their requests.
    #[serde(default)]
    pub host: HostConfig,

    /// Where the `host` command serves its routes.
    #[serde(default)]
    pub server: ServerConfig,

    /// Contents of the in-memory document served by the `host` command.
    #[serde(default)]
    pub document: DocumentConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.host.validate()?;
        self.server.validate()?;
        self.document.validate()
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        message: message.into(),
    }
}

/// Host connection settings for the tool adapter.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Base URL of the host routes.
    /// Default: `http://localhost:48884/revit_mcp`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. No timeout when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl HostConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("Invalid host base_url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "Invalid host base_url '{}'. Scheme must be http or https",
                self.base_url
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(invalid("host timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:48884/revit_mcp".to_string()
}

/// Listening settings for the host route server.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    /// Default: `127.0.0.1:48884`
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path prefix the routes are nested under. Empty serves them at `/`.
    /// Default: `/revit_mcp`
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

impl ServerConfig {
    /// Parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|e| invalid(format!("Invalid server bind address '{}': {e}", self.bind)))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        let prefix = &self.api_prefix;
        if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
            return Err(invalid(format!(
                "Invalid api_prefix '{prefix}'. Must start with '/' and not end with '/'"
            )));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_prefix: default_api_prefix(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:48884".to_string()
}

fn default_api_prefix() -> String {
    "/revit_mcp".to_string()
}

/// Seed contents for the in-memory document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentConfig {
    /// Document title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Level names, in collection order.
    #[serde(default = "default_levels")]
    pub levels: Vec<String>,

    /// Wall type names, in collection order.
    #[serde(default = "default_wall_types")]
    pub wall_types: Vec<String>,
}

impl DocumentConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.iter().any(String::is_empty) {
            return Err(invalid("document level names must not be empty"));
        }
        if self.wall_types.iter().any(String::is_empty) {
            return Err(invalid("document wall type names must not be empty"));
        }
        Ok(())
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            levels: default_levels(),
            wall_types: default_wall_types(),
        }
    }
}

fn default_title() -> String {
    "Project1".to_string()
}

fn default_levels() -> Vec<String> {
    vec!["Level 1".to_string()]
}

fn default_wall_types() -> Vec<String> {
    vec!["Generic - 200mm".to_string()]
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

//! Configuration management
//!
//! This module handles loading and parsing configuration for the forum web client.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Page sizes offered on the comment list
pub const COMMENT_PAGE_SIZES: [u32; 5] = [5, 10, 20, 50, 100];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Forum backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Comment list configuration
    #[serde(default)]
    pub comments: CommentsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Forum backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the forum REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// Session cookie configuration
///
/// The token is kept in one of two cookies: a persistent one and one that
/// lives only as long as the browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the persistent token cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Name of the browser-session token cookie
    #[serde(default = "default_browser_cookie_name")]
    pub browser_cookie_name: String,
    /// Lifetime of the persistent cookie in days
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    /// Mark cookies `Secure`
    #[serde(default)]
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            browser_cookie_name: default_browser_cookie_name(),
            max_age_days: default_max_age_days(),
            secure: false,
        }
    }
}

fn default_cookie_name() -> String {
    "token".to_string()
}

fn default_browser_cookie_name() -> String {
    "session_token".to_string()
}

fn default_max_age_days() -> u32 {
    7
}

/// Comment list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsConfig {
    /// Default number of comments per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        // Handle empty file - return defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - FORUM_WEB_SERVER_HOST
    /// - FORUM_WEB_SERVER_PORT
    /// - FORUM_WEB_BACKEND_URL
    /// - FORUM_WEB_BACKEND_TIMEOUT_SECONDS
    /// - FORUM_WEB_SESSION_MAX_AGE_DAYS
    /// - FORUM_WEB_SESSION_SECURE
    /// - FORUM_WEB_COMMENTS_PAGE_SIZE
    ///
    /// The merged result is validated before it is returned.
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // Server configuration
        if let Ok(host) = std::env::var("FORUM_WEB_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FORUM_WEB_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        // Backend configuration
        if let Ok(url) = std::env::var("FORUM_WEB_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Ok(timeout) = std::env::var("FORUM_WEB_BACKEND_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.backend.timeout_seconds = timeout;
            }
        }

        // Session configuration
        if let Ok(days) = std::env::var("FORUM_WEB_SESSION_MAX_AGE_DAYS") {
            if let Ok(days) = days.parse::<u32>() {
                self.session.max_age_days = days;
            }
        }
        if let Ok(secure) = std::env::var("FORUM_WEB_SESSION_SECURE") {
            match secure.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.session.secure = true,
                "false" | "0" | "no" => self.session.secure = false,
                _ => {} // Ignore invalid values
            }
        }

        // Comment list configuration
        if let Ok(size) = std::env::var("FORUM_WEB_COMMENTS_PAGE_SIZE") {
            if let Ok(size) = size.parse::<u32>() {
                self.comments.page_size = size;
            }
        }
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "backend.base_url must be an http(s) URL, got '{}'",
                self.backend.base_url
            )));
        }
        if self.backend.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "backend.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if !COMMENT_PAGE_SIZES.contains(&self.comments.page_size) {
            return Err(ConfigError::ValidationError(format!(
                "comments.page_size must be one of {:?}, got {}",
                COMMENT_PAGE_SIZES, self.comments.page_size
            )));
        }
        if self.session.cookie_name.is_empty()
            || self.session.browser_cookie_name.is_empty()
            || self.session.cookie_name == self.session.browser_cookie_name
        {
            return Err(ConfigError::ValidationError(
                "session cookie names must be non-empty and distinct".to_string(),
            ));
        }
        Ok(())
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_VARS: [&str; 7] = [
    "FORUM_WEB_SERVER_HOST",
    "FORUM_WEB_SERVER_PORT",
    "FORUM_WEB_BACKEND_URL",
    "FORUM_WEB_BACKEND_TIMEOUT_SECONDS",
    "FORUM_WEB_SESSION_MAX_AGE_DAYS",
    "FORUM_WEB_SESSION_SECURE",
    "FORUM_WEB_COMMENTS_PAGE_SIZE",
];

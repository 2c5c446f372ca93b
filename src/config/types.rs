// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Listener and asset directory
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address, `0.0.0.0` means all interfaces
    pub host: String,
    pub port: u16,
    /// Directory whose contents are served read-only
    pub root_directory: PathBuf,
    /// Tokio worker threads, CPU cores when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: super::DEFAULT_HOST.to_string(),
            port: super::DEFAULT_PORT,
            root_directory: PathBuf::from(super::DEFAULT_ROOT_DIRECTORY),
            workers: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Emit one line per request
    pub access_log: bool,
    /// Access log format (common, combined or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log: true,
            access_log_format: default_access_log_format(),
        }
    }
}

/// Static file resolution options
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Files tried, in order, when a directory is requested
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    /// List directory contents when no index file exists (403 otherwise)
    pub directory_listing: bool,
    /// Value of the `Server` response header
    pub server_name: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            index_files: default_index_files(),
            directory_listing: true,
            server_name: super::DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

/// Connection handling
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a client may take to send request headers, 0 disables it
    pub connection_timeout: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            connection_timeout: 75,
        }
    }
}

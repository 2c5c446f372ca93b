//! Error types for server startup and lifecycle.
//!
//! Per-request failures never surface here: the handler turns them into
//! HTTP status codes. Only conditions that stop the server are represented.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServeError>;

/// Errors that prevent the server from starting or keep it from running.
#[derive(Error, Debug)]
pub enum ServeError {
    /// The configured asset directory does not exist.
    #[error("Build directory not found: {}", .path.display())]
    MissingAssetDirectory { path: PathBuf },

    /// Configuration could not be assembled from defaults and environment.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Host and port do not form a valid socket address.
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),

    /// The listening socket could not be created or bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Runtime or other I/O failure outside request handling.
    #[error("I/O error: {0}")]
    Runtime(#[from] std::io::Error),
}

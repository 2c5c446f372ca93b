// Configuration module entry point
// Assembles the server configuration from compiled-in defaults and the environment

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

use crate::error::{Result, ServeError};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ROOT_DIRECTORY: &str = "build/web";
pub const DEFAULT_SERVER_NAME: &str = "coi-serve";

/// Environment variable prefix, e.g. `COI_SERVE_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "COI_SERVE";

impl Config {
    /// Load configuration from defaults overridden by `COI_SERVE_*` variables
    ///
    /// There is no configuration file; nested keys use a double underscore,
    /// so `COI_SERVE_SERVER__ROOT_DIRECTORY=dist` sets `server.root_directory`.
    pub fn load() -> Result<Self> {
        Self::load_from_env(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from_env(env: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(env.prefix_separator("_").separator("__"))
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.root_directory", DEFAULT_ROOT_DIRECTORY)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("http.directory_listing", true)?
            .set_default("http.server_name", DEFAULT_SERVER_NAME)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 75)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Configuration serving `root_directory` on `port`, everything else default
    pub fn new(port: u16, root_directory: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig {
                port,
                root_directory: root_directory.into(),
                ..ServerConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| ServeError::InvalidAddress(addr))
    }
}

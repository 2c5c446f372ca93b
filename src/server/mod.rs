// Server module entry point
// Startup check, listener ownership and the serve lifecycle
//
// Lifecycle: NotStarted -> Serving -> Stopped. A `Server` value only exists
// once the asset directory check passed and the socket is bound, and
// `Server::run` consumes it, so no other transition can be expressed.

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use signal::{spawn_signal_listener, Shutdown};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::error::{Result, ServeError};
use crate::http::HookChain;
use crate::logger;

/// A bound static file server, ready to serve
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
}

impl Server {
    /// Check the asset directory, then bind the listener and print the banner
    ///
    /// Fails with [`ServeError::MissingAssetDirectory`] before touching the
    /// network when `root_directory` is absent or not a directory.
    pub async fn bind(config: Config) -> Result<Self> {
        let root = check_root_directory(&config).await?;
        let state = AppState::new(config, root);
        Self::bind_with_state(state)
    }

    /// Same as [`Server::bind`] with a caller-supplied hook chain
    pub async fn bind_with_hooks(config: Config, hooks: HookChain) -> Result<Self> {
        let root = check_root_directory(&config).await?;
        let state = AppState::with_hooks(config, root, hooks);
        Self::bind_with_state(state)
    }

    fn bind_with_state(state: AppState) -> Result<Self> {
        let addr = state.config.get_socket_addr()?;
        let listener = create_listener(addr).map_err(|source| ServeError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        let server = Self {
            listener,
            local_addr,
            state: Arc::new(state),
        };
        logger::log_server_start(&server.url(), &local_addr, &server.state.config.server.root_directory);
        Ok(server)
    }

    /// Address the listener is bound to (useful with port 0)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Browser URL for the bound port
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.local_addr.port())
    }

    /// Serve until `shutdown` is triggered, then close the listener
    pub async fn run(self, shutdown: Shutdown) -> Result<()> {
        server_loop::run_accept_loop(self.listener, self.state, shutdown).await;
        logger::log_server_stopped();
        Ok(())
    }
}

/// Verify the root exists and return its canonical path
async fn check_root_directory(config: &Config) -> Result<PathBuf> {
    let root = &config.server.root_directory;
    let missing = || ServeError::MissingAssetDirectory { path: root.clone() };

    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => tokio::fs::canonicalize(root).await.map_err(|_| missing()),
        _ => Err(missing()),
    }
}

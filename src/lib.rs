//! Static file server for pre-built web bundles that need cross-origin
//! isolation (`SharedArrayBuffer`, multi-threaded WASM).
//!
//! Every response carries `Cross-Origin-Embedder-Policy: require-corp` and
//! `Cross-Origin-Opener-Policy: same-origin`.
//!
//! ```no_run
//! use coi_serve::{Config, Server, Shutdown};
//!
//! # async fn demo() -> coi_serve::error::Result<()> {
//! let server = Server::bind(Config::new(8080, "build/web")).await?;
//! let shutdown = Shutdown::new();
//! coi_serve::server::spawn_signal_listener(shutdown.clone());
//! server.run(shutdown).await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use error::ServeError;
pub use server::{Server, Shutdown};

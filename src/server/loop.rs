// Server loop module
// Accepts connections until the shutdown handle fires

use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::handle_connection;
use super::signal::Shutdown;
use crate::config::AppState;
use crate::logger;

/// Accept connections and hand each one to its own task
///
/// Returns once `shutdown` is triggered, dropping (and so closing) the
/// listener. Connections already accepted keep running in their tasks.
pub async fn run_accept_loop(listener: TcpListener, state: Arc<AppState>, shutdown: Shutdown) {
    loop {
        tokio::select! {
            biased;

            () = shutdown.wait() => break,

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }
        }
    }

    drop(listener);
}

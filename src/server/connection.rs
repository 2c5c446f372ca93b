// Connection handling module
// Serves a single accepted TCP connection in its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 connection settings (keep-alive, header casing)
/// 3. Bounds how long a client may take to send request headers
/// 4. Serves the connection with the request handler
///
/// The timeout only covers reading a request head, including the wait on an
/// idle keep-alive connection. A response that is being written is never cut off.
pub fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(state.config.performance.keep_alive)
            .title_case_headers(true)
            .timer(TokioTimer::new())
            .header_read_timeout(header_read_timeout(
                state.config.performance.connection_timeout,
            ));

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
        );

        if let Err(err) = conn.await {
            log_serve_error(&err);
        }
    });
}

/// 0 disables the header read timeout
fn header_read_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Clients dropping idle keep-alive connections is routine, not an error
fn log_serve_error(err: &hyper::Error) {
    if err.is_incomplete_message() || err.is_canceled() || err.is_timeout() {
        return;
    }
    logger::log_connection_error(err);
}

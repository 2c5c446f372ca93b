//! Logger module
//!
//! Console logging for the server:
//! - Server lifecycle messages (banner, missing directory, farewell)
//! - Per-request access log lines
//! - Error and warning messages
//!
//! Informational output goes to stdout, warnings and errors to stderr.

mod format;

pub use format::{AccessLogEntry, LogFormat};

use std::net::SocketAddr;
use std::path::Path;

fn write_info(message: &str) {
    println!("{message}");
}

fn write_error(message: &str) {
    eprintln!("{message}");
}

pub fn log_server_start(url: &str, bound: &SocketAddr, root: &Path) {
    write_info("======================================");
    write_info(&format!("Serving web app at {url}"));
    write_info(&format!("Directory: {}", root.display()));
    write_info(&format!("Listening on: {bound}"));
    write_info("Press Ctrl+C to stop");
    write_info("======================================");
}

pub fn log_worker_threads(workers: Option<usize>) {
    match workers {
        Some(n) => write_info(&format!("[CONFIG] Using {n} worker threads")),
        None => write_info("[CONFIG] Using default worker threads (CPU cores)"),
    }
}

pub fn log_missing_directory(root: &Path) {
    write_error(&format!("[ERROR] Build directory not found: {}", root.display()));
    write_error("        Run the web build first, then start the server again");
}

pub fn log_server_stopped() {
    write_info("\nServer stopped");
}

pub fn log_shutdown_requested(reason: &str) {
    write_info(&format!("\n[SIGNAL] {reason} received, shutting down..."));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: LogFormat) {
    write_info(&entry.format(format));
}

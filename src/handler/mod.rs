//! Request handler module
//!
//! Resolves requests against the root directory and finalizes responses
//! through the hook chain.

pub mod listing;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;

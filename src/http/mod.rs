//! HTTP protocol layer module
//!
//! Protocol helpers shared by the static handler: content types, byte ranges,
//! date validators, response builders and response hooks.

pub mod cache;
pub mod hooks;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use hooks::{CrossOriginIsolation, HookChain, ResponseHook};
pub use range::parse_range_header;
pub use response::{
    build_403_response, build_404_response, build_405_response, build_416_response,
    build_500_response, build_options_response, build_redirect_response, HttpResponse,
};

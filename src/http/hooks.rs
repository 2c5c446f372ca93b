//! Response hook module
//!
//! Hooks run after routing has produced a response and before hyper writes
//! its head. Every response leaving the handler passes through the chain,
//! error responses included.

use hyper::header::{HeaderMap, HeaderName, HeaderValue, SERVER};
use hyper::Response;
use std::fmt;
use std::sync::Arc;

pub const CROSS_ORIGIN_EMBEDDER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-embedder-policy");
pub const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");

/// A header finalization step
///
/// Implemented for any `Fn(&mut HeaderMap)`, so ad-hoc hooks can be closures.
pub trait ResponseHook: Send + Sync {
    fn apply(&self, headers: &mut HeaderMap);
}

impl<F> ResponseHook for F
where
    F: Fn(&mut HeaderMap) + Send + Sync,
{
    fn apply(&self, headers: &mut HeaderMap) {
        self(headers);
    }
}

/// Opts every page into cross-origin isolation
///
/// Appends, in order, `Cross-Origin-Embedder-Policy: require-corp` and
/// `Cross-Origin-Opener-Policy: same-origin`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossOriginIsolation;

impl ResponseHook for CrossOriginIsolation {
    fn apply(&self, headers: &mut HeaderMap) {
        headers.append(
            CROSS_ORIGIN_EMBEDDER_POLICY,
            HeaderValue::from_static("require-corp"),
        );
        headers.append(
            CROSS_ORIGIN_OPENER_POLICY,
            HeaderValue::from_static("same-origin"),
        );
    }
}

/// Sets the `Server` header unless the response already carries one
#[derive(Debug, Clone)]
pub struct ServerName(HeaderValue);

impl ServerName {
    /// Returns `None` when `name` is not a valid header value
    pub fn new(name: &str) -> Option<Self> {
        HeaderValue::from_str(name).ok().map(Self)
    }
}

impl ResponseHook for ServerName {
    fn apply(&self, headers: &mut HeaderMap) {
        headers.entry(SERVER).or_insert_with(|| self.0.clone());
    }
}

/// Ordered list of hooks, applied first to last
#[derive(Clone, Default)]
pub struct HookChain {
    hooks: Vec<Arc<dyn ResponseHook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook to the end of the chain
    #[must_use]
    pub fn with(mut self, hook: impl ResponseHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook against the response headers
    pub fn apply<B>(&self, mut response: Response<B>) -> Response<B> {
        for hook in &self.hooks {
            hook.apply(response.headers_mut());
        }
        response
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

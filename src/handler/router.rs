//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, static file
//! dispatch, response hooks and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body;
use hyper::header::{IF_MODIFIED_SINCE, RANGE, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// Every response, whatever its status, passes through the state's hook
/// chain before being returned to hyper. Request bodies are never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let response = route_request(&parts, &state).await;
    let response = state.hooks.apply(response);

    if state.config.logging.access_log {
        log_access(&parts, &response, peer_addr, started, &state);
    }

    Ok(response)
}

async fn route_request(req: &Parts, state: &AppState) -> HttpResponse {
    let method = &req.method;

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method) {
        return resp;
    }

    // 2. Extract headers for caching and range requests
    let ctx = RequestContext {
        path: req.uri.path(),
        query: req.uri.query(),
        is_head: *method == Method::HEAD,
        if_modified_since: header_string(&req.headers, &IF_MODIFIED_SINCE),
        range_header: header_string(&req.headers, &RANGE),
    };

    // 3. Serve from the root directory
    static_files::serve(&ctx, state).await
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<HttpResponse> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn header_string(headers: &HeaderMap, name: &hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn log_access(
    req: &Parts,
    response: &HttpResponse,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.to_string(),
    );
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact();
    entry.referer = header_string(&req.headers, &REFERER);
    entry.user_agent = header_string(&req.headers, &USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, state.access_log_format);
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::http::hooks::{CROSS_ORIGIN_EMBEDDER_POLICY, CROSS_ORIGIN_OPENER_POLICY};
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::StatusCode;

    fn test_state(root: &std::path::Path) -> Arc<AppState> {
        let mut config = Config::new(0, root);
        config.logging.access_log = false;
        Arc::new(AppState::new(config, root.canonicalize().unwrap()))
    }

    fn request(method: Method, uri: &str) -> Request<Empty<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Empty::new())
            .unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn assert_isolated(response: &HttpResponse) {
        assert_eq!(response.headers()[CROSS_ORIGIN_EMBEDDER_POLICY], "require-corp");
        assert_eq!(response.headers()[CROSS_ORIGIN_OPENER_POLICY], "same-origin");
    }

    #[tokio::test]
    async fn test_index_served_with_isolation_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>OK</html>").unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_isolated(&response);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, Bytes::from_static(b"<html>OK</html>"));
    }

    #[tokio::test]
    async fn test_every_status_carries_isolation_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "0123456789").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let state = test_state(dir.path());

        let cases = [
            (request(Method::GET, "/missing.txt"), StatusCode::NOT_FOUND),
            (request(Method::POST, "/a.txt"), StatusCode::METHOD_NOT_ALLOWED),
            (request(Method::OPTIONS, "/"), StatusCode::NO_CONTENT),
            (request(Method::GET, "/sub"), StatusCode::MOVED_PERMANENTLY),
            (request(Method::GET, "/sub/"), StatusCode::OK),
            (request(Method::HEAD, "/a.txt"), StatusCode::OK),
        ];
        for (req, expected) in cases {
            let uri = req.uri().clone();
            let response = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
            assert_eq!(response.status(), expected, "{uri}");
            assert_isolated(&response);
        }

        let ranged = Request::builder()
            .uri("/a.txt")
            .header(RANGE, "bytes=20-")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let response = handle_request(ranged, state, peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_isolated(&response);
    }

    #[tokio::test]
    async fn test_head_reports_file_size_without_body() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.wasm"), vec![7u8; 4096]).unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::HEAD, "/app.wasm"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[hyper::header::CONTENT_LENGTH], "4096");
        assert_eq!(response.headers()[hyper::header::CONTENT_TYPE], "application/wasm");
        assert_isolated(&response);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_listing_disabled_is_forbidden() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        let mut config = Config::new(0, dir.path());
        config.logging.access_log = false;
        config.http.directory_listing = false;
        let state = Arc::new(AppState::new(config, dir.path().canonicalize().unwrap()));

        let response = handle_request(request(Method::GET, "/empty/"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_isolated(&response);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
    }
}

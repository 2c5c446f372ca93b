//! HTTP response building module
//!
//! Provides builders for every status the static handler answers with.
//! Response hooks are applied afterwards by the router, not here.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED, LOCATION,
};
use hyper::{Response, StatusCode};

use super::range::ByteRange;

pub type HttpResponse = Response<Full<Bytes>>;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build 200 OK response for a whole file
///
/// `data` is empty for HEAD while `content_length` still reports the file size.
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    last_modified: &str,
    content_length: u64,
) -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes")
        .header(LAST_MODIFIED, last_modified)
        .body(Full::new(data))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: Bytes,
    content_type: &str,
    last_modified: &str,
    range: ByteRange,
    total_size: u64,
    is_head: bool,
) -> HttpResponse {
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, range.content_length())
        .header(CONTENT_RANGE, range.content_range(total_size))
        .header(ACCEPT_RANGES, "bytes")
        .header(LAST_MODIFIED, last_modified)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(LAST_MODIFIED, last_modified)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            empty_response(StatusCode::NOT_MODIFIED)
        })
}

/// Build 301 redirect, used to add the trailing slash to directory paths
pub fn build_redirect_response(location: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build HTML response (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> HttpResponse {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build 204 response to OPTIONS
pub fn build_options_response() -> HttpResponse {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            empty_response(StatusCode::NO_CONTENT)
        })
}

pub fn build_403_response() -> HttpResponse {
    build_text_response(StatusCode::FORBIDDEN, "403 Forbidden")
}

pub fn build_404_response() -> HttpResponse {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    let mut response = build_text_response(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    response
        .headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> HttpResponse {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(Full::new(Bytes::from_static(b"416 Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            empty_response(StatusCode::RANGE_NOT_SATISFIABLE)
        })
}

pub fn build_500_response() -> HttpResponse {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn build_text_response(status: StatusCode, text: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, text.len())
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            empty_response(status)
        })
}

fn empty_response(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(response: HttpResponse) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_file_response_head_has_length_but_no_body() {
        let response = build_file_response(
            Bytes::new(),
            "text/plain",
            "Sun, 06 Nov 1994 08:49:37 GMT",
            5,
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "5");
        assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_response_headers() {
        let range = ByteRange { start: 2, end: 4 };
        let response = build_partial_response(
            Bytes::from_static(b"llo"),
            "text/plain",
            "Sun, 06 Nov 1994 08:49:37 GMT",
            range,
            5,
            false,
        );
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes 2-4/5");
        assert_eq!(response.headers()[CONTENT_LENGTH], "3");
        assert_eq!(body_bytes(response).await, Bytes::from_static(b"llo"));
    }

    #[tokio::test]
    async fn test_error_responses() {
        let not_found = build_404_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(not_found).await, Bytes::from_static(b"404 Not Found"));

        let not_allowed = build_405_response();
        assert_eq!(not_allowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(not_allowed.headers()[ALLOW], ALLOWED_METHODS);

        let unsatisfiable = build_416_response(100);
        assert_eq!(unsatisfiable.headers()[CONTENT_RANGE], "bytes */100");
    }

    #[test]
    fn test_redirect() {
        let response = build_redirect_response("/docs/?q=1");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/docs/?q=1");
    }
}

//! Static file serving module
//!
//! Maps request paths onto the root directory and builds file responses
//! with `Last-Modified` validation and byte-range support.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, range::RangeParseResult, HttpResponse};
use crate::logger;
use hyper::body::Bytes;
use percent_encoding::percent_decode_str;
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Where a request path points inside the root directory
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    Directory(PathBuf),
    NotFound,
}

/// Serve the request against the root directory
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> HttpResponse {
    match resolve(&state.root, ctx.path).await {
        Resolved::File(path) => {
            if ctx.path.ends_with('/') {
                // "/app.js/" names a directory that is not there
                return http::build_404_response();
            }
            serve_file(ctx, &path).await
        }
        Resolved::Directory(dir) => serve_directory(ctx, state, &dir).await,
        Resolved::NotFound => http::build_404_response(),
    }
}

/// Resolve a URI path to a location under `root`
///
/// `root` must already be canonical. Symlinks are followed but the target
/// must stay inside the root.
pub async fn resolve(root: &Path, uri_path: &str) -> Resolved {
    let Some(relative) = sanitize_path(uri_path) else {
        return Resolved::NotFound;
    };

    // File not found is common (404), no need to log at warning level
    let Ok(canonical) = fs::canonicalize(root.join(&relative)).await else {
        return Resolved::NotFound;
    };
    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            uri_path,
            canonical.display()
        ));
        return Resolved::NotFound;
    }

    match fs::metadata(&canonical).await {
        Ok(meta) if meta.is_dir() => Resolved::Directory(canonical),
        Ok(meta) if meta.is_file() => Resolved::File(canonical),
        _ => Resolved::NotFound,
    }
}

/// Turn a URI path into a relative filesystem path
///
/// Percent-escapes are decoded, then the path is normalized: empty and `.`
/// segments are dropped and `..` removes the segment before it, stopping at
/// the root. Returns `None` for paths that are not valid UTF-8 once decoded.
pub fn sanitize_path(uri_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(uri_path).decode_utf8().ok()?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        if segment.contains('\0') {
            return None;
        }
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => {
                // A segment that is itself a path (e.g. "C:\x") is skipped
                let mut components = Path::new(segment).components();
                if let (Some(Component::Normal(_)), None) = (components.next(), components.next()) {
                    segments.push(segment);
                }
            }
        }
    }
    Some(segments.into_iter().collect())
}

async fn serve_directory(ctx: &RequestContext<'_>, state: &AppState, dir: &Path) -> HttpResponse {
    if !ctx.path.ends_with('/') {
        let location = match ctx.query {
            Some(q) => format!("{}/?{q}", ctx.path),
            None => format!("{}/", ctx.path),
        };
        return http::build_redirect_response(&location);
    }

    for index_file in &state.config.http.index_files {
        let index_path = dir.join(index_file);
        if fs::metadata(&index_path).await.is_ok_and(|m| m.is_file()) {
            return serve_file(ctx, &index_path).await;
        }
    }

    if !state.config.http.directory_listing {
        return http::build_403_response();
    }

    match listing::render(dir, ctx.path).await {
        Ok(html) => http::response::build_html_response(html, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to list directory '{}': {e}",
                dir.display()
            ));
            http::build_404_response()
        }
    }
}

async fn serve_file(ctx: &RequestContext<'_>, path: &Path) -> HttpResponse {
    let meta = match fs::metadata(path).await {
        Ok(m) => m,
        Err(e) => {
            logger::log_error(&format!("Failed to stat '{}': {e}", path.display()));
            return http::build_404_response();
        }
    };

    let modified = meta.modified().unwrap_or_else(|_| SystemTime::now());
    let last_modified = cache::format_http_date(modified);
    if cache::not_modified_since(ctx.if_modified_since.as_deref(), modified) {
        return http::response::build_304_response(&last_modified);
    }

    let content_type = mime::for_path(path);
    let total_size = meta.len();

    match http::parse_range_header(ctx.range_header.as_deref(), total_size) {
        RangeParseResult::Valid(range) => {
            let data = if ctx.is_head {
                Bytes::new()
            } else {
                match read_range(path, range.start, range.content_length()).await {
                    Ok(data) => data,
                    Err(e) => return read_failed(path, &e),
                }
            };
            http::response::build_partial_response(
                data,
                content_type,
                &last_modified,
                range,
                total_size,
                ctx.is_head,
            )
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(total_size),
        RangeParseResult::None if ctx.is_head => http::response::build_file_response(
            Bytes::new(),
            content_type,
            &last_modified,
            total_size,
        ),
        RangeParseResult::None => match fs::read(path).await {
            Ok(content) => {
                // The file may have changed since it was stat'ed
                let length = content.len() as u64;
                http::response::build_file_response(
                    Bytes::from(content),
                    content_type,
                    &last_modified,
                    length,
                )
            }
            Err(e) => read_failed(path, &e),
        },
    }
}

async fn read_range(path: &Path, start: u64, len: u64) -> std::io::Result<Bytes> {
    let len = usize::try_from(len)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let mut file = fs::File::open(path).await?;
    file.seek(SeekFrom::Start(start)).await?;
    let mut buf = vec![0; len];
    file.read_exact(&mut buf).await?;
    Ok(Bytes::from(buf))
}

fn read_failed(path: &Path, err: &std::io::Error) -> HttpResponse {
    logger::log_error(&format!(
        "Failed to read file '{}': {err}",
        path.display()
    ));
    if err.kind() == std::io::ErrorKind::NotFound {
        http::build_404_response()
    } else {
        http::build_500_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_paths() {
        assert_eq!(sanitize_path("/"), Some(PathBuf::new()));
        assert_eq!(
            sanitize_path("/assets/fonts/MaterialIcons.otf"),
            Some(PathBuf::from("assets/fonts/MaterialIcons.otf"))
        );
        assert_eq!(
            sanitize_path("/a//b/./c"),
            Some(PathBuf::from("a/b/c"))
        );
    }

    #[test]
    fn test_sanitize_drops_parent_segments() {
        assert_eq!(sanitize_path("/../../etc/passwd"), Some(PathBuf::from("etc/passwd")));
        assert_eq!(sanitize_path("/%2e%2e/%2e%2e/secret"), Some(PathBuf::from("secret")));
        assert_eq!(sanitize_path("/a/%2F..%2F/b"), Some(PathBuf::from("b")));
    }

    #[test]
    fn test_sanitize_parent_removes_previous_segment() {
        assert_eq!(
            sanitize_path("/assets/../index.html"),
            Some(PathBuf::from("index.html"))
        );
        assert_eq!(
            sanitize_path("/a/b/../../c/./d"),
            Some(PathBuf::from("c/d"))
        );
        assert_eq!(sanitize_path("/a/../../.."), Some(PathBuf::new()));
    }

    #[test]
    fn test_sanitize_decodes_and_rejects() {
        assert_eq!(
            sanitize_path("/my%20file.txt"),
            Some(PathBuf::from("my file.txt"))
        );
        assert_eq!(sanitize_path("/bad%FF"), None);
        assert_eq!(sanitize_path("/nul%00byte"), None);
    }

    #[tokio::test]
    async fn test_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir(root.join("sub")).unwrap();
        std::fs::write(root.join("sub/a.txt"), b"a").unwrap();

        assert_eq!(
            resolve(&root, "/sub/a.txt").await,
            Resolved::File(root.join("sub/a.txt"))
        );
        assert_eq!(resolve(&root, "/sub").await, Resolved::Directory(root.join("sub")));
        assert_eq!(resolve(&root, "/").await, Resolved::Directory(root.clone()));
        assert_eq!(resolve(&root, "/missing.txt").await, Resolved::NotFound);
        assert_eq!(resolve(&root, "/../sub/a.txt").await, Resolved::File(root.join("sub/a.txt")));
        assert_eq!(resolve(&root, "/sub/../sub/a.txt").await, Resolved::File(root.join("sub/a.txt")));
        assert_eq!(resolve(&root, "/sub/../a.txt").await, Resolved::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_blocks_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("escape")).unwrap();

        assert_eq!(resolve(&root, "/escape/secret.txt").await, Resolved::NotFound);
    }
}

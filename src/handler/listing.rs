//! Directory listing page, used when a directory has no index file

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;
use std::path::Path;
use tokio::fs;

/// Characters escaped in listing links (everything but RFC 3986 unreserved)
const LINK_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Render an HTML listing of `dir`, titled with the request path
///
/// Entries are sorted case-insensitively; directories get a trailing `/`.
pub async fn render(dir: &Path, uri_path: &str) -> std::io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        entries.push((name, is_dir));
    }
    entries.sort_by_key(|(name, _)| name.to_lowercase());

    let title = format!("Directory listing for {}", escape_html(uri_path));
    let mut html = String::with_capacity(256 + entries.len() * 64);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{title}</h1>\n<hr>\n<ul>");
    for (name, is_dir) in &entries {
        let suffix = if *is_dir { "/" } else { "" };
        let _ = writeln!(
            html,
            "<li><a href=\"{}{suffix}\">{}{suffix}</a></li>",
            utf8_percent_encode(name, LINK_ESCAPE),
            escape_html(name),
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

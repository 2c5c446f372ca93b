//! HTTP Range request parsing module
//!
//! Single byte-range requests (RFC 9110 §14). Multi-range requests are
//! answered with the full body.

/// Resolved, inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    pub const fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Satisfiable range, already clamped to the file size
    Valid(ByteRange),
    /// Syntactically valid but outside the file - answer 416
    NotSatisfiable,
    /// No Range header or one we ignore - answer with the full body
    None,
}

/// Parse a `Range` header against a file of `file_size` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-` and `bytes=-suffix`.
///
/// # Examples
/// ```
/// use coi_serve::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { start: 0, end: 99 }));
///
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };

    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        parse_suffix_range(end_str, file_size)
    } else {
        parse_standard_range(start_str, end_str, file_size)
    }
}

/// "-500": the last 500 bytes
fn parse_suffix_range(suffix_str: &str, file_size: u64) -> RangeParseResult {
    let Ok(suffix) = suffix_str.parse::<u64>() else {
        return RangeParseResult::None;
    };

    if suffix == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// "0-99" or "100-"
fn parse_standard_range(start_str: &str, end_str: &str, file_size: u64) -> RangeParseResult {
    let Ok(start) = start_str.parse::<u64>() else {
        return RangeParseResult::None;
    };

    let end = if end_str.is_empty() {
        None
    } else {
        match end_str.parse::<u64>() {
            Ok(e) if e < start => return RangeParseResult::None,
            Ok(e) => Some(e),
            Err(_) => return RangeParseResult::None,
        }
    };

    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let last = file_size - 1;
    RangeParseResult::Valid(ByteRange {
        start,
        end: end.map_or(last, |e| e.min(last)),
    })
}

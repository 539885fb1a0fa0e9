//! HTTP Range request parsing module
//!
//! Parses a single `bytes=<start>-<end>` range against a known file size.
//! Multi-range requests and other units are rejected as malformed.

/// Validated byte interval, `start <= end < total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    /// First byte position (inclusive)
    pub start: u64,
    /// Last byte position (inclusive), already clamped to `total - 1`
    pub end: u64,
    /// Total size of the resource
    pub total: u64,
}

impl RangeSpec {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false: a valid range covers at least one byte
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Value for the `Content-Range` header
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Valid range request - should return 206
    Valid(RangeSpec),
    /// Well-formed but outside the resource - should return 416
    NotSatisfiable,
    /// Not a single `bytes=<digits?>-<digits?>` range - should return 400
    Malformed,
}

/// Parse an HTTP Range header value (single range only, bytes unit)
///
/// Supported forms:
/// - `bytes=start-end` - specific range, `end` clamped to the last byte
/// - `bytes=start-` - from `start` to the end of the file
/// - `bytes=-end` - from the first byte to `end`
///
/// # Examples
/// ```
/// use range_stream_server::http::range::{parse_range_header, RangeParseResult, RangeSpec};
///
/// let result = parse_range_header("bytes=900-2000", 1000);
/// assert_eq!(
///     result,
///     RangeParseResult::Valid(RangeSpec { start: 900, end: 999, total: 1000 })
/// );
///
/// assert_eq!(parse_range_header("bytes=1000-1005", 1000), RangeParseResult::NotSatisfiable);
/// assert_eq!(parse_range_header("bytes=0-1,5-9", 1000), RangeParseResult::Malformed);
/// ```
pub fn parse_range_header(header: &str, total: u64) -> RangeParseResult {
    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeParseResult::Malformed;
    };

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::Malformed;
    };

    if start_str.is_empty() && end_str.is_empty() {
        return RangeParseResult::Malformed;
    }

    let (Some(start), Some(end)) = (parse_position(start_str), parse_position(end_str)) else {
        return RangeParseResult::Malformed;
    };

    // Empty file: nothing is satisfiable
    let Some(last) = total.checked_sub(1) else {
        return RangeParseResult::NotSatisfiable;
    };

    let start = start.unwrap_or(0);
    let end = end.map_or(last, |e| e.min(last));

    if start > end || start >= total {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(RangeSpec { start, end, total })
}

/// Parse one side of the range.
///
/// Outer `None` means malformed, inner `None` means the side was omitted.
/// Digit strings too large for `u64` saturate so they clamp like any other
/// oversized position.
fn parse_position(s: &str) -> Option<Option<u64>> {
    if s.is_empty() {
        return Some(None);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(Some(s.parse::<u64>().unwrap_or(u64::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(header: &str, total: u64) -> RangeSpec {
        match parse_range_header(header, total) {
            RangeParseResult::Valid(r) => r,
            other => panic!("Expected Valid for {header:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_standard_range() {
        let r = valid("bytes=0-99", 1000);
        assert_eq!((r.start, r.end, r.total), (0, 99, 1000));
        assert_eq!(r.len(), 100);
        assert_eq!(r.content_range(), "bytes 0-99/1000");
    }

    #[test]
    fn test_end_clamped_to_last_byte() {
        let r = valid("bytes=900-2000", 1000);
        assert_eq!((r.start, r.end), (900, 999));
        assert_eq!(r.len(), 100);
        assert_eq!(r.content_range(), "bytes 900-999/1000");
    }

    #[test]
    fn test_open_end() {
        let r = valid("bytes=50-", 100);
        assert_eq!((r.start, r.end), (50, 99));
    }

    #[test]
    fn test_empty_start_defaults_to_zero() {
        let r = valid("bytes=-20", 100);
        assert_eq!((r.start, r.end), (0, 20));
    }

    #[test]
    fn test_single_byte() {
        let r = valid("bytes=999-999", 1000);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_huge_end_saturates_and_clamps() {
        let r = valid("bytes=10-99999999999999999999999", 100);
        assert_eq!((r.start, r.end), (10, 99));
    }

    #[test]
    fn test_not_satisfiable() {
        assert_eq!(
            parse_range_header("bytes=1000-1005", 1000),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header("bytes=200-", 100),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header("bytes=50-10", 100),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header("bytes=0-0", 0),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_malformed() {
        for header in [
            "bytes=-",
            "bytes=a-b",
            "bytes=0-9,20-29",
            "items=0-9",
            "bytes 0-9",
            "bytes=0",
            "bytes=+1-5",
            "bytes= 0-5",
            "bytes=0-5-9",
            "Bytes=0-5",
        ] {
            assert_eq!(
                parse_range_header(header, 100),
                RangeParseResult::Malformed,
                "header {header:?}"
            );
        }
    }
}

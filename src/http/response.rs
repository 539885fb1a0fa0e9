//! HTTP response building module
//!
//! Builders for every status the server sends. A builder failure is logged
//! and replaced with an empty response instead of panicking.

use super::body::{empty_body, full_body, ResponseBody};
use super::range::RangeSpec;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};

/// Methods advertised by OPTIONS
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build 200 OK response for a whole file
pub fn build_full_response(
    content_type: &str,
    total_size: u64,
    body: ResponseBody,
) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, total_size)
        .header(ACCEPT_RANGES, "bytes")
        .body(body)
        .unwrap_or_else(|e| fallback("200", &e))
}

/// Build 206 Partial Content response for one byte range
pub fn build_partial_response(
    content_type: &str,
    range: &RangeSpec,
    body: ResponseBody,
) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, range.len())
        .header(CONTENT_RANGE, range.content_range())
        .header(ACCEPT_RANGES, "bytes")
        .body(body)
        .unwrap_or_else(|e| fallback("206", &e))
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(empty_body())
        .unwrap_or_else(|e| fallback("204", &e))
}

/// Build 400 Bad Request response for a malformed Range header
pub fn build_400_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::BAD_REQUEST, "Invalid Range header")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "File not found")
}

/// Build 416 Range Not Satisfiable response (no body)
pub fn build_416_response(total_size: u64) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_RANGE, format!("bytes */{total_size}"))
        .header(CONTENT_LENGTH, 0)
        .body(empty_body())
        .unwrap_or_else(|e| fallback("416", &e))
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to open file")
}

fn build_text_response(status: StatusCode, message: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .body(full_body(message))
        .unwrap_or_else(|e| fallback(status.as_str(), &e))
}

/// Log response build error and fall back to an empty response
fn fallback(status: &str, error: &hyper::http::Error) -> Response<ResponseBody> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    Response::new(empty_body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_options_response() {
        let resp = build_options_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD, OPTIONS");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_partial_headers() {
        let range = RangeSpec { start: 900, end: 999, total: 1000 };
        let resp = build_partial_response("video/mp4", &range, empty_body());
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[CONTENT_TYPE], "video/mp4");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "100");
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 900-999/1000");
        assert_eq!(resp.headers()[ACCEPT_RANGES], "bytes");
    }

    #[test]
    fn test_full_headers() {
        let resp = build_full_response("video/webm", 4096, empty_body());
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "4096");
        assert_eq!(resp.headers()[ACCEPT_RANGES], "bytes");
        assert!(resp.headers().get(CONTENT_RANGE).is_none());
    }

    #[tokio::test]
    async fn test_416_has_no_body() {
        let resp = build_416_response(1000);
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes */1000");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}

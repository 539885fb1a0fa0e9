//! Static file serving module
//!
//! Looks up the target file, picks full or range mode and attaches the
//! streaming body.

use super::error::ServeError;
use super::router::RequestContext;
use crate::http::body::{empty_body, FileStream, ResponseBody};
use crate::http::{self, mime, path, RangeParseResult, RangeSpec};
use crate::logger::{self, PendingAccessLog};
use hyper::{Response, StatusCode};
use std::path::Path;
use tokio::fs;

/// Serve the file named by the request path from `base_dir`.
///
/// On success the access log record (if any) is moved into the streaming
/// body so it is written once the last byte has gone out.
pub async fn serve_file(
    ctx: &RequestContext<'_>,
    base_dir: &Path,
    access: &mut Option<PendingAccessLog>,
) -> Result<Response<ResponseBody>, ServeError> {
    let file_path = path::resolve(base_dir, ctx.path).map_err(|rejection| {
        if let path::PathRejection::Escapes { canonical } = rejection {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                ctx.path,
                canonical.display()
            ));
        }
        ServeError::NotFound
    })?;

    let metadata = fs::metadata(&file_path)
        .await
        .map_err(|_| ServeError::NotFound)?;
    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    let content_type = mime::content_type_for(&file_path);
    let total = metadata.len();

    match ctx.range_header {
        None => stream_full(ctx, &file_path, content_type, total, access).await,
        Some(header) => match http::parse_range_header(header, total) {
            RangeParseResult::Valid(range) => {
                stream_range(ctx, &file_path, content_type, &range, access).await
            }
            RangeParseResult::NotSatisfiable => Err(ServeError::RangeNotSatisfiable { total }),
            RangeParseResult::Malformed => Err(ServeError::MalformedRange),
        },
    }
}

/// 200 with the whole file
async fn stream_full(
    ctx: &RequestContext<'_>,
    file_path: &Path,
    content_type: &str,
    total: u64,
    access: &mut Option<PendingAccessLog>,
) -> Result<Response<ResponseBody>, ServeError> {
    let body = open_body(ctx, file_path, 0, total, StatusCode::OK, access).await?;
    Ok(http::build_full_response(content_type, total, body))
}

/// 206 with bytes `range.start..=range.end`
async fn stream_range(
    ctx: &RequestContext<'_>,
    file_path: &Path,
    content_type: &str,
    range: &RangeSpec,
    access: &mut Option<PendingAccessLog>,
) -> Result<Response<ResponseBody>, ServeError> {
    let body = open_body(
        ctx,
        file_path,
        range.start,
        range.len(),
        StatusCode::PARTIAL_CONTENT,
        access,
    )
    .await?;
    Ok(http::build_partial_response(content_type, range, body))
}

async fn open_body(
    ctx: &RequestContext<'_>,
    file_path: &Path,
    start: u64,
    length: u64,
    status: StatusCode,
    access: &mut Option<PendingAccessLog>,
) -> Result<ResponseBody, ServeError> {
    if ctx.is_head {
        // Open anyway so HEAD fails exactly where GET would
        fs::File::open(file_path)
            .await
            .map_err(ServeError::InternalFault)?;
        return Ok(empty_body());
    }

    let stream = FileStream::open(file_path, start, length)
        .await
        .map_err(ServeError::InternalFault)?;
    let access = access.take().map(|a| a.with_status(status.as_u16()));
    Ok(stream.with_access_log(access).into_body())
}

//! Request dispatch module
//!
//! Entry point for HTTP request processing: request logging, method check,
//! then file serving. Produces exactly one response per request.

use super::error::ServeError;
use super::static_files;
use crate::config::AppState;
use crate::http::{self, ResponseBody};
use crate::logger::{self, PendingAccessLog};
use hyper::body::Body;
use hyper::header::RANGE;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Request information needed to serve a file
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) request path
    pub path: &'a str,
    pub is_head: bool,
    pub range_header: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<ResponseBody>, Infallible> {
    let (parts, _body) = req.into_parts();

    logger::log_request(&parts.method, &parts.uri, parts.version);
    if state.config.logging.show_headers {
        logger::log_headers(&parts.headers);
    }

    let mut access = PendingAccessLog::start(
        &state.config.logging,
        remote_addr,
        &parts.method,
        &parts.uri,
        parts.version,
        &parts.headers,
    );

    let response = if parts.method == Method::OPTIONS {
        http::build_options_response()
    } else {
        let ctx = RequestContext {
            path: parts.uri.path(),
            is_head: parts.method == Method::HEAD,
            // An empty value counts as no Range header at all. A non-ASCII
            // value cannot be a valid range and parses as malformed.
            range_header: parts
                .headers
                .get(RANGE)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_str().unwrap_or_default()),
        };

        match static_files::serve_file(&ctx, &state.base_dir, &mut access).await {
            Ok(response) => response,
            Err(err) => {
                log_serve_error(&ctx, &err);
                err.into_response()
            }
        }
    };

    // Streaming bodies took the record and write it when they finish
    if let Some(access) = access {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        access
            .with_status(response.status().as_u16())
            .finish(body_bytes);
    }

    Ok(response)
}

fn log_serve_error(ctx: &RequestContext<'_>, err: &ServeError) {
    match err {
        ServeError::NotFound | ServeError::RangeNotSatisfiable { .. } => {}
        ServeError::MalformedRange => logger::log_warning(&format!(
            "Rejected Range header {:?} for {}",
            ctx.range_header.unwrap_or_default(),
            ctx.path
        )),
        ServeError::InternalFault(_) => logger::log_error(&format!("{}: {err}", ctx.path)),
    }
}

//! Logger module
//!
//! Provides logging utilities for the server:
//! - Server lifecycle logging
//! - Request and access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support
//!
//! Every function here is best-effort. Nothing a logger does may change the
//! outcome of a request.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AppState, Config, LoggingConfig};
use hyper::header::{HeaderName, RANGE, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Uri, Version};
use std::net::SocketAddr;
use std::time::Instant;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    let config = &state.config;
    write_info("======================================");
    write_info("Range streaming server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Serving files from: {}", state.base_dir.display()));
    match config.server.workers {
        Some(workers) => write_info(&format!("Worker threads: {workers}")),
        None => write_info("Worker threads: default (CPU cores)"),
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown(open_connections: usize) {
    write_info(&format!(
        "[Shutdown] Stopped accepting connections, draining {open_connections} open connection(s)"
    ));
}

pub fn log_drained() {
    write_info("[Shutdown] All connections closed");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    write_info(&format!("[Request] {method} {uri} {version:?}"));
}

pub fn log_headers(headers: &HeaderMap) {
    write_info(&format!("[Headers] Count: {}", headers.len()));
    for (name, value) in headers {
        write_info(&format!(
            "  {name}: {}",
            value.to_str().unwrap_or("<non-ascii>")
        ));
    }
}

/// Access log record opened when a request arrives and written when its
/// response body is finished.
#[derive(Debug)]
pub struct PendingAccessLog {
    entry: AccessLogEntry,
    format: String,
    started: Instant,
}

impl PendingAccessLog {
    /// Start a record for this request, or `None` when access logging is off
    pub fn start(
        logging: &LoggingConfig,
        remote_addr: Option<SocketAddr>,
        method: &Method,
        uri: &Uri,
        version: Version,
        headers: &HeaderMap,
    ) -> Option<Self> {
        if !logging.access_log {
            return None;
        }

        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        let mut entry = AccessLogEntry::new(
            remote_addr.map_or_else(|| "-".to_string(), |a| a.ip().to_string()),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = match version {
            Version::HTTP_09 => "0.9",
            Version::HTTP_10 => "1.0",
            Version::HTTP_2 => "2",
            Version::HTTP_3 => "3",
            _ => "1.1",
        }
        .to_string();
        entry.range = header(RANGE);
        entry.referer = header(REFERER);
        entry.user_agent = header(USER_AGENT);

        Some(Self {
            entry,
            format: logging.access_log_format.clone(),
            started: Instant::now(),
        })
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.entry.status = status;
        self
    }

    /// Write the record with the number of body bytes actually sent
    pub fn finish(mut self, body_bytes: u64) {
        self.entry.body_bytes = body_bytes;
        self.entry.request_time_us =
            u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX);
        write_access(&self.entry.format(&self.format));
    }

    pub fn entry(&self) -> &AccessLogEntry {
        &self.entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(access_log: bool) -> LoggingConfig {
        LoggingConfig {
            access_log,
            show_headers: false,
            access_log_format: "common".to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }

    #[test]
    fn test_pending_disabled() {
        let pending = PendingAccessLog::start(
            &logging(false),
            None,
            &Method::GET,
            &Uri::from_static("/a.mp4"),
            Version::HTTP_11,
            &HeaderMap::new(),
        );
        assert!(pending.is_none());
    }

    #[test]
    fn test_pending_captures_request() {
        let mut headers = HeaderMap::new();
        headers.insert(RANGE, "bytes=0-99".parse().unwrap());
        headers.insert(USER_AGENT, "mpv".parse().unwrap());

        let pending = PendingAccessLog::start(
            &logging(true),
            Some("10.0.0.7:5555".parse().unwrap()),
            &Method::HEAD,
            &Uri::from_static("/dir/a.mp4?x=1"),
            Version::HTTP_10,
            &headers,
        )
        .unwrap()
        .with_status(206);

        let entry = pending.entry();
        assert_eq!(entry.remote_addr, "10.0.0.7");
        assert_eq!(entry.method, "HEAD");
        assert_eq!(entry.path, "/dir/a.mp4");
        assert_eq!(entry.query.as_deref(), Some("x=1"));
        assert_eq!(entry.http_version, "1.0");
        assert_eq!(entry.range.as_deref(), Some("bytes=0-99"));
        assert_eq!(entry.user_agent.as_deref(), Some("mpv"));
        assert_eq!(entry.status, 206);

        pending.finish(100);
    }
}

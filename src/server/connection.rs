// Connection handling module
// Serves one accepted TCP connection until it closes or the server drains

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Serve HTTP/1.1 requests on `stream` until the client goes away.
///
/// No overall connection deadline is applied: a long media stream must be
/// able to run for as long as the client keeps reading. Only the wait for
/// request headers is bounded (`performance.header_read_timeout`).
///
/// When `draining` flips to `true` the connection shuts down gracefully: a
/// response in progress is sent to the end, then the connection closes
/// instead of waiting for another request.
pub async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    draining: watch::Receiver<bool>,
) {
    let io = TokioIo::new(stream);

    let performance = &state.config.performance;
    let mut builder = http1::Builder::new();
    builder.keep_alive(performance.keep_alive);
    if performance.header_read_timeout > 0 {
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(performance.header_read_timeout));
    }

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| {
            handler::handle_request(req, Arc::clone(&service_state), Some(peer_addr))
        }),
    );
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        () = drain_started(draining) => {
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
    };

    if let Err(err) = result {
        // A client hanging up mid-stream ends up here too
        logger::log_connection_error(&err);
    }
}

/// Resolves once the drain flag is set, immediately if it already is.
/// A dropped sender counts as draining.
async fn drain_started(mut draining: watch::Receiver<bool>) {
    let _ = draining.wait_for(|drain| *drain).await;
}

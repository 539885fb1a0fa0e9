// Server loop module
// Accepts connections until the shutdown future resolves, then drains them

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;

use super::connection::serve_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` and serve each one in its own task.
///
/// Once `shutdown` resolves the listener is closed and every connection is
/// told to drain. Returns only after all connection tasks have finished, so
/// responses already being streamed are sent in full.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    let (drain_tx, drain_rx) = watch::channel(false);
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connections.spawn(serve_connection(
                            stream,
                            peer_addr,
                            Arc::clone(&state),
                            drain_rx.clone(),
                        ));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            // Reap finished connections so the set does not grow unbounded
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                log_join_error(joined);
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_shutdown(connections.len());
    drain_tx.send_replace(true);

    while let Some(joined) = connections.join_next().await {
        log_join_error(joined);
    }
    logger::log_drained();
}

fn log_join_error(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        logger::log_error(&format!("Connection task failed: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use crate::server::create_listener;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_idle_keep_alive_connection_does_not_block_shutdown() {
        let dir = std::env::temp_dir().join(format!("range-stream-loop-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.txt"), b"hello").unwrap();

        let mut config =
            Config::load_from("definitely-missing-config-file", &Overrides::default()).unwrap();
        config.server.base_path = dir.to_string_lossy().into_owned();
        config.logging.show_headers = false;
        let state = Arc::new(AppState::new(config).unwrap());

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(start_server_loop(listener, state, async {
            let _ = rx.await;
        }));

        // One complete exchange, then the connection sits idle in keep-alive
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /a.txt HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut received = Vec::new();
        let mut buf = vec![0u8; 4096];
        while !received.ends_with(b"hello") {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0);
            received.extend_from_slice(&buf[..n]);
        }
        assert!(received.starts_with(b"HTTP/1.1 200 OK"));

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("loop should return once idle connections close")
            .unwrap();

        // The server side closed the idle connection
        let n = stream.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}

use std::sync::Arc;

use clap::Parser;
use range_stream_server::config::{self, AppState, Config, Overrides};
use range_stream_server::{logger, server};

/// Stream files from a directory over HTTP with Range support
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Port to serve on
    #[arg(long)]
    port: Option<u16>,

    /// Base directory for served files
    #[arg(long)]
    path: Option<String>,

    /// Config file (extension optional)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        port: cli.port,
        base_path: cli.path,
    };
    let cfg = Config::load_from(&cli.config, &overrides)?;

    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(cfg)?);
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&listener.local_addr()?, &state);

    server::start_server_loop(listener, state, server::shutdown_signal()).await;
    Ok(())
}

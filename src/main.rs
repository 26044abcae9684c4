use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use studiod::{config::DaemonConfig, rest, storage::Storage, AppContext};

#[derive(Parser)]
#[command(
    name = "studiod",
    about = "studiod — workspace-scoped video planning backend daemon",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// REST API server port
    #[arg(long, env = "STUDIOD_PORT")]
    port: Option<u16>,

    /// Data directory for config and the SQLite database
    #[arg(long, env = "STUDIOD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STUDIOD_LOG")]
    log: Option<String>,

    /// Bind address for the REST server (default: 127.0.0.1)
    #[arg(long, env = "STUDIOD_BIND")]
    bind_address: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the daemon server (default when no subcommand given).
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Init once — must happen before any tracing calls.
    let log_level = args.log.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_level.as_str())
        .compact()
        .init();

    let Args {
        command,
        port,
        data_dir,
        log,
        bind_address,
    } = args;
    match command {
        None | Some(Command::Serve) => serve(port, data_dir, log, bind_address).await,
    }
}

async fn serve(
    port: Option<u16>,
    data_dir: Option<std::path::PathBuf>,
    log: Option<String>,
    bind_address: Option<String>,
) -> Result<()> {
    let config = Arc::new(DaemonConfig::new(port, data_dir, log, bind_address));
    info!("data dir: {}", config.data_dir.display());

    let storage = Arc::new(Storage::new_with_slow_query(&config.data_dir, config.slow_query_ms).await?);
    let ctx = Arc::new(AppContext::new(config, storage));

    rest::start_rest_server(ctx).await
}

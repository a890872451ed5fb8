use bitcoind_exporter::{
    config::Config,
    server::{self, AppState, Shutdown},
    shared::{collector::CollectorRegistry, error::ExporterError, rpc::RpcSession},
};
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::process;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    // Startup and per-collector warnings must be visible without RUST_LOG set.
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    info!("bitcoind-exporter starting...");

    // Connect and probe before the listen socket is ever bound; an
    // unreachable node must never leave a half-started exporter serving
    // scrapes it cannot answer.
    let session = match RpcSession::connect(&config).await {
        Ok(session) => session,
        Err(e) => {
            error!("connect stage failed: {}", e);
            process::exit(1);
        }
    };

    let (fatal_tx, fatal_rx) = mpsc::channel(1);
    let state = Arc::new(AppState {
        node: Arc::new(session),
        registry: CollectorRegistry::bitcoind(),
        policy: config.failure_policy(),
        fatal_tx,
    });

    match server::serve(&config.listen_to, state, fatal_rx).await {
        Ok(Shutdown::Graceful) => {
            info!("bitcoind-exporter stopping...");
        }
        Ok(Shutdown::Fatal(reason)) => {
            error!(
                "collect stage failed, shutting down: {}",
                ExporterError::from(reason)
            );
            process::exit(1);
        }
        Err(e) => {
            error!("listen stage failed: {}", e);
            process::exit(1);
        }
    }
}

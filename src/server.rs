use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use log::{error, info};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::shared::collector::{render, CollectorRegistry, FailurePolicy};
use crate::shared::error::{CollectError, ExporterError};
use crate::shared::traits::NodeRpc;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub struct AppState {
    pub node: Arc<dyn NodeRpc>,
    pub registry: CollectorRegistry,
    pub policy: FailurePolicy,
    /// Signalled by the handler when a fail-fast scrape aborts; drives the
    /// non-zero process exit.
    pub fatal_tx: mpsc::Sender<CollectError>,
}

pub enum Shutdown {
    Graceful,
    Fatal(CollectError),
}

/// One scrape: run every collector against the shared session, render the
/// successes. Under the degrade policy a collector failure never reaches
/// this level; under fail-fast it turns into a 500 and a fatal signal.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let scrape = match state.registry.scrape(state.node.as_ref(), state.policy).await {
        Ok(scrape) => scrape,
        Err(e) => {
            error!("collect stage failed: {}", e);
            let _ = state.fatal_tx.try_send(e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "metric collection failed").into_response();
        }
    };

    match render(&scrape) {
        Ok(payload) => (StatusCode::OK, [("content-type", CONTENT_TYPE)], payload).into_response(),
        Err(e) => {
            error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Binds the exposition endpoint and serves until interrupted or until a
/// fail-fast scrape reports a fatal collector error. Bind failure is fatal
/// at startup; by then the RPC session has already been probed, so a broken
/// listener never leaves a half-started exporter behind.
pub async fn serve(
    listen_to: &str,
    state: Arc<AppState>,
    mut fatal_rx: mpsc::Receiver<CollectError>,
) -> Result<Shutdown, ExporterError> {
    let listener = TcpListener::bind(listen_to)
        .await
        .map_err(|e| ExporterError::Listen(format!("{}: {}", listen_to, e)))?;

    info!("starting to serve metrics on {:?}...", listen_to);
    let server = axum::serve(listener, router(state)).into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| ExporterError::Listen(e.to_string()))?;
            Ok(Shutdown::Graceful)
        }
        _ = tokio::signal::ctrl_c() => Ok(Shutdown::Graceful),
        reason = fatal_rx.recv() => {
            let err = reason
                .unwrap_or_else(|| CollectError::Transport("collector failure".to_string()));
            Ok(Shutdown::Fatal(err))
        }
    }
}

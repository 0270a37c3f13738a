//! HTTP surface: `/metrics` for scrapes and `/healthz` for liveness.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::{error, info};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::error::ExporterError;
use crate::metrics::SubnetMetrics;

pub const METRICS_ENDPOINT: &str = "/metrics";
pub const HEALTH_ENDPOINT: &str = "/healthz";

/// Build the exporter's router around a shared metrics registry.
pub fn router(metrics: Arc<SubnetMetrics>) -> Router {
    Router::new()
        .route(METRICS_ENDPOINT, get(handle_metrics))
        .route(HEALTH_ENDPOINT, get(handle_health))
        .with_state(metrics)
}

async fn handle_metrics(State(metrics): State<Arc<SubnetMetrics>>) -> Response {
    match metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, metrics.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn handle_health() -> StatusCode {
    StatusCode::OK
}

/// Serve the router on `addr` until `shutdown` flips to `true`.
pub async fn serve(
    addr: SocketAddr,
    metrics: Arc<SubnetMetrics>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ExporterError> {
    let listener = TcpListener::bind(addr).await?;
    info!(
        "Serving {} and {} on http://{}",
        METRICS_ENDPOINT,
        HEALTH_ENDPOINT,
        listener.local_addr()?
    );

    let shutdown_signal = async move {
        loop {
            let stop = *shutdown.borrow();
            if stop || shutdown.changed().await.is_err() {
                break;
            }
        }
        info!("Metrics web server shutting down");
    };

    axum::serve(listener, router(metrics))
        .with_graceful_shutdown(shutdown_signal)
        .await?;
    Ok(())
}

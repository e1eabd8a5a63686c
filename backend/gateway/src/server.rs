//! Main HTTP server: LINE webhook, chart and JSON API.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use moodline_channels::{LineAdapter, LineConfig};
use moodline_insights::ChartFormat;

use crate::service::MoodService;

/// Build the application router: the webhook sub-router plus chart and API routes.
pub fn build_router(service: Arc<MoodService>, line: LineConfig) -> Router {
    let webhook = LineAdapter::new(line, service.clone()).build_router();

    Router::new()
        .route("/chart", get(chart))
        .route("/api/summary", get(summary))
        .route("/api/health", get(health))
        .with_state(service)
        .merge(webhook)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until `shutdown` resolves.
#[instrument(skip(app, shutdown))]
pub async fn start_server<F>(addr: SocketAddr, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
    serve(listener, app, shutdown).await
}

pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "Moodline HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;
    info!("HTTP server stopped");
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuery {
    #[serde(default)]
    format: ChartFormat,
}

/// `GET /chart`: SVG line chart of daily max/min/average, or `?format=json`.
async fn chart(State(service): State<Arc<MoodService>>, Query(query): Query<ChartQuery>) -> Response {
    match service.render_chart(query.format).await {
        Ok(chart) => ([(header::CONTENT_TYPE, chart.content_type)], chart.bytes).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render chart");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// `GET /api/summary`: daily summaries as JSON.
async fn summary(State(service): State<Arc<MoodService>>) -> Result<Json<Value>, (StatusCode, String)> {
    match service.compute_daily_summaries().await {
        Ok(days) => Ok(Json(json!({ "days": days }))),
        Err(e) => {
            error!(error = %e, "Failed to compute summaries");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "moodline",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

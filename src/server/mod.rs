//! HTTP surface: `POST /research`, the HTML page at `/`, and `/health`.

mod errors;
mod params;
mod ui;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use errors::ApiError;
use params::{HealthResponse, ResearchQuery, ResearchResponse};

use crate::search::engine::Researcher;

type SharedResearcher = Arc<Researcher>;

pub fn router(researcher: SharedResearcher) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/research", post(research))
        .layer(TraceLayer::new_for_http())
        .with_state(researcher)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(researcher: Researcher, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(Arc::new(researcher)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn index() -> Html<&'static str> {
    Html(ui::INDEX_HTML)
}

async fn health(State(researcher): State<SharedResearcher>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        search: researcher.has_search(),
        llm: researcher.has_llm(),
    })
}

async fn research(
    State(researcher): State<SharedResearcher>,
    payload: Result<Json<ResearchQuery>, JsonRejection>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let Json(query) = payload?;
    info!(title = %query.paper_title, "POST /research");

    let report = researcher.research(&query.paper_title).await?;
    Ok(Json(ResearchResponse {
        paper_title: report.paper_title,
        pdf_url: report.pdf_url,
        summary: report.summary,
    }))
}

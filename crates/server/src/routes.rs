use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;
use service::card_limits::{repository::CardLimitsRepository, CardLimitsService};

use crate::metrics;

pub mod mcp;

/// Service shared by all handlers; the repository is chosen at startup.
pub type SharedService = Arc<CardLimitsService<dyn CardLimitsRepository>>;

#[derive(Clone)]
pub struct AppState {
    pub service: SharedService,
}

impl AppState {
    pub fn new(repo: Arc<dyn CardLimitsRepository>, default_card_id: impl Into<String>) -> Self {
        Self { service: Arc::new(CardLimitsService::new(repo, default_card_id)) }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics_handler() -> (StatusCode, String) {
    metrics::encode_metrics()
}

/// Build the application router: health, metrics and the JSON-RPC tool endpoint at `mcp_path`.
pub fn build_router(state: AppState, cors: CorsLayer, mcp_path: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route(mcp_path, post(mcp::handle))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}

use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{
    card_limits::repository::{CardLimitsRepository, FileCardLimitsRepository},
    runtime,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Build the router for a validated configuration.
pub fn build_app(cfg: &AppConfig) -> Router {
    let repo: Arc<dyn CardLimitsRepository> = Arc::new(FileCardLimitsRepository::new(&cfg.data.dir));
    let state = AppState::new(repo, cfg.data.default_card_id.clone());
    routes::build_router(state, build_cors(), &cfg.server.path)
}

/// Public entry: check the data directory of a validated configuration and
/// serve until the listener fails.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    runtime::ensure_env(&cfg.data.dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let app = build_app(&cfg);

    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        %addr,
        path = %cfg.server.path,
        data_dir = %cfg.data.dir,
        default_card_id = %cfg.data.default_card_id,
        "starting card limit server"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

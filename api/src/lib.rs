//! HTTP surface of the bridge.
//!
//! - `GET  /health`
//! - `POST /api/v1/mr_summarize`
//! - `POST /api/v1/mr_description`
//! - `POST /api/v1/mr_comment_on_diff`
//!
//! The three webhook routes sit behind the `X-Gitlab-Token` check.

pub mod core;
pub mod error_handler;
pub mod middleware_layer;
pub mod routes;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use crate::{
    core::{app_config::AppConfig, app_state::AppState},
    error_handler::AppError,
    middleware_layer::gitlab_token::require_gitlab_token,
    routes::{
        health_route::health, mr_comment_on_diff_route::mr_comment_on_diff,
        mr_description_route::mr_description, mr_summarize_route::mr_summarize,
    },
};

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let webhooks = Router::new()
        .route("/mr_summarize", post(mr_summarize))
        .route("/mr_description", post(mr_description))
        .route("/mr_comment_on_diff", post(mr_comment_on_diff))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_gitlab_token,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", webhooks)
        .with_state(state)
}

/// Serves `router` on `listener` until Ctrl+C.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), AppError> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)
}

/// Loads configuration from the environment and runs the server.
pub async fn start() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let state = Arc::new(AppState::from_config(&config)?);

    let listener = TcpListener::bind(&config.api_address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %config.api_address, "listening");

    serve(listener, state).await
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

//! Router construction and server bootstrap.

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ApiError;
use crate::handlers::{circulation_supply, estimate_fee, health, total_supply, ApiState};

/// Build the supply API router over the shared handler state.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/supply/total", get(total_supply))
        .route("/supply/circulating", get(circulation_supply))
        .route("/utils/estimatefee", get(estimate_fee))
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve the supply API until the task is cancelled.
pub async fn serve(addr: SocketAddr, state: ApiState) -> Result<(), ApiError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(ApiError::Bind)?;
    tracing::info!(%addr, "supply API listening");
    axum::serve(listener, router(state))
        .await
        .map_err(ApiError::Serve)
}

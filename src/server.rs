//! Webhook HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness probe, static text |
//! | `POST` | `/webhooks/products/create` | Product created |
//! | `POST` | `/webhooks/products/update` | Product updated |
//! | `POST` | `/webhooks/products/delete` | Product deleted |
//!
//! Webhook routes answer `200 OK` or `401 Unauthorized`; see
//! [`crate::webhook`] for the rules. The body is taken as raw bytes so that
//! the signature is checked against exactly what was sent.
//!
//! | Condition | Response |
//! |-----------|----------|
//! | body larger than `server.body_limit_bytes` | `413 Payload Too Large`, before verification |
//!
//! A 413 is outside the webhook acknowledgment contract: the platform treats
//! it as a failed delivery and retries it. Size the limit above the largest
//! product payload the store can produce.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::index_client::IndexClient;
use crate::webhook::{Acknowledgment, Gateway, Topic};

/// Body of `GET /`.
pub const READINESS_MESSAGE: &str = "Catalog sync connector is running";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    gateway: Arc<Gateway>,
}

/// Build the router around an existing gateway.
///
/// Exposed separately from [`run_server`] so tests can serve it on an
/// ephemeral port with a mock sync backend.
pub fn build_router(gateway: Arc<Gateway>, body_limit_bytes: usize) -> Router {
    let state = AppState { gateway };

    Router::new()
        .route("/", get(handle_health))
        .route("/webhooks/products/create", post(handle_product_create))
        .route("/webhooks/products/update", post(handle_product_update))
        .route("/webhooks/products/delete", post(handle_product_delete))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the gateway from config and serve until Ctrl-C.
pub async fn run_server(config: &Config) -> Result<()> {
    if config.webhook.secret_bytes().is_empty() {
        warn!(
            secret_env = %config.webhook.secret_env,
            "No webhook secret configured; every delivery will fail verification"
        );
    }

    let client = IndexClient::from_config(&config.index)?;
    let gateway = Arc::new(Gateway::new(config.webhook.secret_bytes(), Arc::new(client)));
    let app = build_router(gateway, config.server.body_limit_bytes);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    info!(
        bind = %config.server.bind,
        index_url = %config.index.url,
        index = %config.index.name,
        simulate = config.index.simulate,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// ============ GET / ============

async fn handle_health() -> &'static str {
    READINESS_MESSAGE
}

// ============ POST /webhooks/products/* ============

async fn handle_product_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Acknowledgment {
    state.gateway.receive(Topic::ProductCreate, &headers, body).await
}

async fn handle_product_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Acknowledgment {
    state.gateway.receive(Topic::ProductUpdate, &headers, body).await
}

async fn handle_product_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Acknowledgment {
    state.gateway.receive(Topic::ProductDelete, &headers, body).await
}

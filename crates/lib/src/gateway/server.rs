//! Gateway HTTP server: LINE webhook, health probe, and direct air-quality query.

use crate::channels::{verify_signature, InboundMessage, LineClient, WebhookBody, SIGNATURE_HEADER};
use crate::config::{Config, ConfigError, Secrets};
use crate::pipeline::Pipeline;
use crate::region::REGIONS;
use crate::reply::NO_DATA_BODY;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared, read-only state for request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    /// LINE channel secret for X-Line-Signature verification.
    channel_secret: Arc<str>,
    pub pipeline: Pipeline,
    pub line: LineClient,
}

impl GatewayState {
    pub fn new(config: Config, secrets: &Secrets, pipeline: Pipeline) -> Self {
        let line = LineClient::new(
            Some(config.line.api_base.clone()),
            secrets.channel_access_token.clone(),
        );
        Self {
            config: Arc::new(config),
            channel_secret: Arc::from(secrets.channel_secret.as_str()),
            pipeline,
            line,
        }
    }

    /// State with real clients, built from config and resolved secrets.
    pub fn from_config(config: Config, secrets: &Secrets) -> Self {
        let pipeline = Pipeline::from_config(&config, secrets);
        Self::new(config, secrets, pipeline)
    }
}

/// Routes: GET / and /health, POST <webhook path>, GET /api/air-quality/:region.
/// Fails when the configured webhook path is not a fixed absolute route.
pub fn build_router(state: GatewayState) -> Result<Router, ConfigError> {
    let webhook_path = state.config.line.webhook_route()?.to_string();
    Ok(Router::new()
        .route("/", get(health_http))
        .route("/health", get(health_http))
        .route(&webhook_path, post(line_webhook))
        .route("/api/air-quality/:region", get(air_quality_http))
        .with_state(state))
}

/// Run the gateway server; binds to config.server.bind:config.server.port.
/// Fails before binding when a required secret is missing or the webhook path is unroutable. Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let secrets = Secrets::resolve(&config)?;
    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let state = GatewayState::from_config(config, &secrets);
    log::info!(
        "region strategies: {}",
        state.pipeline.resolver().strategy_names().join(" -> ")
    );
    let webhook_path = state.config.line.webhook_path.clone();
    let app = build_router(state)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {} (webhook {})", bind_addr, webhook_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST webhook: verifies X-Line-Signature over the raw body, then answers each text message
/// in order before returning. Signature failures never reach the pipeline.
async fn line_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        log::warn!("webhook: missing {} header", SIGNATURE_HEADER);
        return (StatusCode::BAD_REQUEST, "missing signature");
    };
    if !verify_signature(&state.channel_secret, &body, signature) {
        log::warn!("webhook: invalid signature");
        return (StatusCode::BAD_REQUEST, "invalid signature");
    }
    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("webhook: malformed body: {}", e);
            return (StatusCode::BAD_REQUEST, "malformed body");
        }
    };
    for event in payload.events {
        if let Some(msg) = event.into_inbound() {
            process_inbound_message(&state, msg).await;
        }
    }
    (StatusCode::OK, "OK")
}

/// Run the pipeline for one message and send the reply card. Send failures are logged only.
async fn process_inbound_message(state: &GatewayState, msg: InboundMessage) {
    log::debug!(
        "inbound from {}: {}",
        msg.user_id.as_deref().unwrap_or("unknown"),
        msg.text
    );
    let reply = state.pipeline.reply_for(&msg.text).await;
    let bubble = reply.card.to_bubble(&state.config.reply.hero_image_url);
    if let Err(e) = state
        .line
        .reply_flex(&msg.reply_token, &reply.alt_text, &bubble)
        .await
    {
        log::warn!("reply failed: {}", e);
    }
}

/// GET / and /health return a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "runtime": "running",
        "port": state.config.server.port,
        "regions": REGIONS.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/air-quality/:region: direct lookup, bypassing region resolution.
async fn air_quality_http(
    State(state): State<GatewayState>,
    Path(region): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.pipeline.air_quality().fetch(&region).await {
        Ok(reading) => {
            let display = reading.display();
            (
                StatusCode::OK,
                Json(json!({
                    "region": region,
                    "pm25": reading.pm25,
                    "status": reading.status,
                    "display": display,
                })),
            )
        }
        Err(e) => {
            log::debug!("api: air quality for {} unavailable: {}", region, e);
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "region": region, "error": NO_DATA_BODY })),
            )
        }
    }
}

//! Clerk Sync Web Server - user webhook receiver and route gate.
//!
//! This binary:
//! - Receives Clerk user webhooks at `/api/webhooks/clerk`
//! - Verifies Svix signatures and syncs users into the store
//! - Links new users back to Clerk through public metadata
//! - Requires a Clerk session on protected routes

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clerksync::{
    build_router, AppState, ClerkClient, Config, GateState, InMemoryUserStore, JwtSessionVerifier,
    RouteGate, SvixVerifier, WebhookReceiver,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        signing_secret_configured = config.signing_secret.is_some(),
        clerk_secret_key_configured = config.clerk_secret_key.is_some(),
        session_key_configured = config.clerk_jwt_key.is_some(),
        clerk_api_url = %config.clerk_api_url,
        "config_loaded"
    );

    if config.signing_secret.is_none() {
        warn!("signing_secret_missing_webhooks_will_fail");
    }

    // Outbound Clerk API client
    let clerk = ClerkClient::new(
        &config.clerk_api_url,
        config.clerk_secret_key.clone(),
        Duration::from_millis(config.request_timeout_ms),
    )
    .context("Failed to create Clerk client")?;

    let receiver = WebhookReceiver::new(
        config.signing_secret.clone(),
        Arc::new(SvixVerifier::new(config.signature_tolerance_secs)),
        Arc::new(InMemoryUserStore::new()),
        Arc::new(clerk),
    );

    // Route gate
    let gate = RouteGate::with_overrides(
        config.public_routes.as_deref(),
        config.ignored_routes.as_deref(),
    )
    .context("Invalid route pattern")?;

    let sessions = JwtSessionVerifier::from_pem(
        config.clerk_jwt_key.as_deref(),
        config.authorized_parties.clone().unwrap_or_default(),
    )
    .context("Invalid CLERK_JWT_KEY")?;

    let gate = GateState::new(gate, Arc::new(sessions), config.sign_in_url.clone())
        .context("Invalid CLERK_SIGN_IN_URL")?;

    // Build the router
    let app = build_router(AppState::new(receiver), gate, config.max_body_bytes);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}

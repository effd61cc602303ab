//! HTTP surface of the charity-run payment backend.
//!
//! # Routes
//! - `POST /api/orders`: validate, sign and store a new order
//! - `GET /api/orders/{reference}`: payment status lookup
//! - `POST /api/payments/callback`: gateway notification (path configurable)
//! - `GET /api/universities/match?q=`: resolve a university name
//! - `GET /health`
//!
//! # Webhook flow
//! - Required fields `orderReference` and `status`, else 400 listing them
//! - Unknown order: 404
//! - `SHA256_hex(merchantCode + orderReference + currency + amount + callbackUrl)`
//!   compared in constant time against `hash`, else 401
//! - Idempotency key from reference and transaction id; replays answer
//!   200 with `duplicate: true` and change nothing
//! - Lifecycle violations (e.g. paid to failed): 409
//!
//! Every payment log line goes through `sanitize_log_data` first.
use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use runpay_core::ServerConfig;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;

use routes::{
    callback_handler, create_order_handler, health_handler, order_status_handler,
    university_match_handler,
};
pub use state::AppState;
pub use store::{InMemoryOrderStore, InsertOutcome, OrderStore, StoreError};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| {
            HeaderValue::from_str(o)
                .inspect_err(|_| warn!("Ignoring invalid CORS origin {o}"))
                .ok()
        })
        .collect();

    if parsed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(parsed))
    }
}

/// Router with every route and layer attached
pub fn build_router(state: Arc<AppState>) -> Router {
    let callback_path = {
        let path = state.config.gateway.callback_path.trim();
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        }
    };

    Router::new()
        .route("/api/orders", post(create_order_handler))
        .route("/api/orders/{reference}", get(order_status_handler))
        .route(&callback_path, post(callback_handler))
        .route("/api/universities/match", get(university_match_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.server.cors_origins))
        .with_state(state)
}

/// Bind the configured host and port
///
/// The host may be an IPv4 or IPv6 literal or a name such as `localhost`.
///
/// # Errors
/// Returns an error when the host does not resolve or the port cannot be bound
pub async fn bind_listener(server: &ServerConfig) -> std::io::Result<TcpListener> {
    TcpListener::bind((server.host.trim(), server.port)).await
}

/// Bind and serve until Ctrl+C or SIGTERM
///
/// # Errors
/// Returns an error when the host does not resolve, the port cannot be bound,
/// or the server fails while running
pub async fn start_server(state: Arc<AppState>) -> anyhow::Result<()> {
    info!(
        callback_url = %state.config.gateway.callback_url(),
        signing = state.is_signing(),
        "Starting server..."
    );
    let server = state.config.server.clone();
    let app = build_router(state);

    info!("Binding to {}:{}", server.host, server.port);
    let listener = bind_listener(&server)
        .await
        .with_context(|| format!("binding {}:{}", server.host, server.port))?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

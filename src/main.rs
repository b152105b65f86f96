//! BizHub Server: presence and messaging relay for the BizHub workspace.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use bizhub_api::{AppState, build_app};
use bizhub_core::config::AppConfig;
use bizhub_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `BIZHUB__*` environment variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("BIZHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let dir = std::env::var("BIZHUB_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting BizHub v{}", env!("CARGO_PKG_VERSION"));

    for variable in default_secrets(&config) {
        tracing::warn!("Using a default secret; set {variable}");
    }

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(config);
    let realtime = state.realtime.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("BizHub server listening on {}", addr);

    let (stopping_tx, mut stopping_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        // Open event streams never finish on their own.
        let closed = realtime.shutdown();
        tracing::info!(closed, "Closed live event streams");
        let _ = stopping_tx.send(true);
    });

    tokio::select! {
        result = server.into_future() => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            let _ = stopping_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Grace period elapsed, forcing shutdown");
        }
    }

    tracing::info!("BizHub server stopped");
    Ok(())
}

const PLACEHOLDER_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Environment variables for secrets still at their shipped placeholder.
fn default_secrets(config: &AppConfig) -> Vec<&'static str> {
    let mut unset = Vec::new();
    if config.auth.jwt_secret == PLACEHOLDER_SECRET {
        unset.push("BIZHUB__AUTH__JWT_SECRET");
    }
    if !config.calls.turn_urls.is_empty() && config.calls.turn_secret == PLACEHOLDER_SECRET {
        unset.push("BIZHUB__CALLS__TURN_SECRET");
    }
    unset
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_secrets_reported() {
        let mut config = AppConfig::default();
        assert_eq!(default_secrets(&config), vec!["BIZHUB__AUTH__JWT_SECRET"]);

        config.calls.turn_urls = vec!["turn:turn.example.com:3478".to_string()];
        assert_eq!(
            default_secrets(&config),
            vec!["BIZHUB__AUTH__JWT_SECRET", "BIZHUB__CALLS__TURN_SECRET"]
        );

        config.auth.jwt_secret = "configured".to_string();
        config.calls.turn_secret = "configured".to_string();
        assert!(default_secrets(&config).is_empty());
    }
}

//! HTTP service for the payroll engine.
//!
//! Reads its configuration directory from `PAYROLL_CONFIG_DIR` (default
//! `./config/monaco`) and listens on `PAYROLL_BIND_ADDR` (default
//! `0.0.0.0:8080`). Log verbosity follows `RUST_LOG`.

use std::env;
use std::process::ExitCode;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/monaco";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_dir =
        env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr =
        env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let config = match ConfigLoader::load(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(
                config_dir = %config_dir,
                error = %err,
                "Failed to load configuration"
            );
            return ExitCode::FAILURE;
        }
    };

    let router = create_router(AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(bind_addr = %bind_addr, error = %err, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(bind_addr = %bind_addr, config_dir = %config_dir, "Payroll engine listening");

    if let Err(err) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use entra_api_auth::{
    api::router,
    config::{LogFormat, Settings, DEFAULT_LOG_FILTER},
    state::AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(settings.log_format);

    let state = match AppState::from_settings(&settings) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client for signing keys");
            return ExitCode::FAILURE;
        }
    };
    let discovery_url = state.authorizer.keys().discovery_url().to_string();
    let app = router(state, settings.origin.as_deref());

    let listener = match TcpListener::bind(settings.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %settings.addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        addr = %settings.addr,
        env = %settings.app_env,
        audience = %settings.api_audience,
        discovery_url = %discovery_url,
        "Entra API listening (docs at /docs)"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

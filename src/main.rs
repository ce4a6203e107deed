// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use gateway_auth::{
    api,
    auth::KeyOrigin,
    config::{GatewayConfig, LogFormat},
    identity::AccountServiceClient,
    logging::init_tracing,
    state::AppState,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(LogFormat::from_env())?;

    let config = GatewayConfig::from_env()?;

    let key = config.key_source.load()?;
    if key.origin() == KeyOrigin::Ephemeral {
        warn!(
            fingerprint = %key.fingerprint(),
            "No signing key configured, generated an ephemeral one; tokens will not survive a restart"
        );
    } else {
        info!(fingerprint = %key.fingerprint(), "Signing key loaded");
    }

    let account_service = AccountServiceClient::new(
        config.account_service_url.as_str(),
        config.account_service_timeout,
    )?;
    info!(url = %config.account_service_url, "Account service configured");

    let policy = config.bypass_policy();
    info!(excluded = ?policy.prefixes(), "Auth bypass paths");

    let state = AppState::new(&key, config.lifetimes, policy, Arc::new(account_service));
    let app = api::router(state, api::unrouted());

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(address = %config.bind_addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }

    shutdown.cancel();
}

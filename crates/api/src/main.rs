//! `slotkeeper` -- Telegram bot coordinating building slots and restore timers.
//!
//! Long-polls the Bot API for commands, keeps all state in memory, and
//! serves a liveness endpoint over HTTP. See [`AppConfig::from_env`] for
//! the environment variables.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use slotkeeper_events::TelegramClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slotkeeper_api::config::AppConfig;
use slotkeeper_api::engine::CommandDispatcher;
use slotkeeper_api::state::AppState;
use slotkeeper_api::{background, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "slotkeeper_api=debug,slotkeeper_events=debug,slotkeeper_core=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        cooldown_secs = config.bot.restore_cooldown_secs,
        "Loaded configuration"
    );

    // --- Telegram client ---
    let client = Arc::new(
        TelegramClient::new(
            &config.bot.api_url,
            &config.bot.token,
            config.bot.poll_timeout(),
        )
        .context("Failed to build Telegram client")?,
    );

    // --- App state ---
    let state = AppState::new(config.clone(), client.clone());
    let dispatcher = Arc::new(CommandDispatcher::new(&state));

    // --- Update poller ---
    let poll_cancel = CancellationToken::new();
    let poller_handle = tokio::spawn(background::poller::run(
        Arc::clone(&client),
        dispatcher,
        poll_cancel.clone(),
    ));

    // --- HTTP server ---
    let app = routes::app_router(state.clone());
    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .context("HOST is not a valid IP address")?,
        config.server.port,
    );
    tracing::info!(%addr, "Starting liveness server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped, cleaning up");

    poll_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), poller_handle).await;

    let drain = Duration::from_secs(config.server.shutdown_timeout_secs);
    let pending = state.scheduler.in_flight();
    if !state.scheduler.shutdown(drain).await {
        tracing::warn!(pending, "Restore notifications still pending at exit were dropped");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use text2midi_api::config::ServerConfig;
use text2midi_api::router::build_app_router;
use text2midi_api::state::AppState;
use text2midi_core::converter::CommandConverter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "text2midi_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Converter ---
    if !config.converter_config_path.is_file() {
        tracing::warn!(
            path = %config.converter_config_path.display(),
            "Converter configuration file not found; the converter may refuse to run",
        );
    }
    let converter = CommandConverter::from_command_line(
        &config.converter_command,
        config.converter_config_path.clone(),
    )
    .expect("CONVERTER_COMMAND must not be empty");
    tracing::info!(program = %converter.program(), "Converter configured");

    // --- App state ---
    let state = AppState::new(config.clone(), Arc::new(converter));

    // --- Scratch space ---
    state
        .workspace
        .reset()
        .await
        .expect("Failed to prepare storage directories");
    tracing::info!(
        tmp = %state.workspace.tmp_dir().display(),
        generation = %state.workspace.generation_dir().display(),
        "Scratch directories cleared",
    );

    // --- Router ---
    let app = build_app_router(state.clone(), &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let in_flight = state.runner.in_flight();
    let drained = state
        .runner
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    if drained {
        tracing::info!(in_flight, "Job runner stopped");
    } else {
        tracing::warn!(in_flight, "Job runner did not settle before the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

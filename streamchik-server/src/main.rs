use clap::Parser;
use std::process::ExitCode;
use streamchik_server::{AppState, LivenessMonitor, ServerConfig, bind_exit_code, serve};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "streamchik_server=info".into()),
        )
        .init();

    let config = ServerConfig::parse();
    let addr = config.socket_addr();

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return bind_exit_code(&e);
        }
    };

    let state = AppState::from_config(&config);

    LivenessMonitor::new(
        state.registry.clone(),
        config.heartbeat_interval(),
        config.heartbeat_timeout(),
    )
    .spawn();

    info!(
        "Signalling server started on ws://{} defaultRoom={}",
        addr,
        state.default_room()
    );

    if let Err(e) = serve(listener, state, shutdown_signal()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Signalling server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

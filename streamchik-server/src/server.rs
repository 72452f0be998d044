use crate::signaling::ws_handler;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::process::ExitCode;
use tokio::net::TcpListener;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Serves the signaling endpoint on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

/// Process exit code for a failed bind: the OS error number when it fits.
pub fn bind_exit_code(err: &io::Error) -> ExitCode {
    err.raw_os_error()
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE)
}

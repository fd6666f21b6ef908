//! Router assembly and the serve loop.

use std::future::Future;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::error::ServerError;
use crate::ws::handler::ws_handler;

/// Builds the router: a single upgrade route at `/`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router on `listener` until `shutdown` resolves.
///
/// Each upgraded connection runs on its own task; a connection failing
/// never affects the listener.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if the accept loop fails.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "server listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("server stopped accepting connections");
    Ok(())
}

/// Waits for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
///
/// If a handler cannot be installed that branch never fires, so the server
/// keeps running rather than stopping at startup.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    async fn status_for(method: Method, uri: &str) -> StatusCode {
        let Ok(request) = Request::builder().method(method).uri(uri).body(Body::empty()) else {
            panic!("request must build");
        };
        let Ok(response) = build_router(AppState::default()).oneshot(request).await;
        response.status()
    }

    #[tokio::test]
    async fn plain_get_without_upgrade_is_rejected() {
        let status = status_for(Method::GET, "/").await;
        assert!(status.is_client_error(), "got {status}");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        assert_eq!(status_for(Method::GET, "/health").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() {
        assert_eq!(
            status_for(Method::POST, "/").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}

//! Running the reference backend on a socket.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use etudiant_rs_core::{AppError, AppResult, Settings};

use crate::site::ApiSite;

/// Binds `addr` and returns the listener with its resolved address.
pub async fn bind(addr: &str) -> AppResult<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    Ok((listener, local))
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve_until<F>(listener: TcpListener, router: Router, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(AppError::Io)
}

/// Serves the backend configured by `settings` until Ctrl-C.
pub async fn run(settings: &Settings) -> AppResult<()> {
    let router = ApiSite::from_settings(settings).into_axum_router();
    let (listener, addr) = bind(&settings.server.bind_addr()).await?;
    tracing::info!(
        "Serving {} at http://{addr}{} (debug={})",
        settings.application_name,
        settings.api_prefix,
        settings.debug
    );
    serve_until(listener, router, async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("could not listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        }
    })
    .await?;
    tracing::info!("server stopped");
    Ok(())
}

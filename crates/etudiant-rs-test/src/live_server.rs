//! The reference backend on a random local port.
//!
//! ```rust,no_run
//! use etudiant_rs_server::ApiSite;
//! use etudiant_rs_test::LiveServer;
//!
//! # async fn example() -> etudiant_rs_core::AppResult<()> {
//! let server = LiveServer::start(ApiSite::new("etudiantetranger").into_axum_router()).await?;
//! let settings = server.settings();
//! assert!(settings.api_base_url.starts_with("http://127.0.0.1:"));
//! server.stop().await;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;

use axum::Router;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use etudiant_rs_core::{AppResult, Settings};
use etudiant_rs_server::{bind, serve_until};

/// A backend served in a background task until [`stop`](Self::stop) or drop.
#[derive(Debug)]
pub struct LiveServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_handle: Option<JoinHandle<AppResult<()>>>,
}

impl LiveServer {
    /// Binds `127.0.0.1:0` and starts serving `router`.
    pub async fn start(router: Router) -> AppResult<Self> {
        let (listener, addr) = bind("127.0.0.1:0").await?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_handle = tokio::spawn(serve_until(listener, router, async {
            shutdown_rx.await.ok();
        }));

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    /// Base URL, e.g. `http://127.0.0.1:43210`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Default settings pointed at this server.
    pub fn settings(&self) -> Settings {
        Settings {
            api_base_url: self.url(),
            ..Settings::default()
        }
    }

    /// Shuts the server down and waits for it to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            if let Ok(Err(err)) = handle.await {
                tracing::warn!(error = %err, "live server ended with an error");
            }
        }
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

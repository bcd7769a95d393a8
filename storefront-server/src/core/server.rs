//! HTTP server lifecycle

use anyhow::Context;

use crate::core::ServerState;
use crate::routes;

pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Serve until ctrl-c
    pub async fn run(self) -> anyhow::Result<()> {
        let port = self.state.config.http_port;
        let app = routes::build_app(self.state);

        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        tracing::info!("listening on http://0.0.0.0:{port}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;
        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}

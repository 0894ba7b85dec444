use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use shared::error::{AppError, AppResult};

use crate::api;
use crate::core::ServerState;

/// HTTP server wrapper: builds the router, binds, runs until shutdown
pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Run the server until the token is cancelled
    pub async fn run(self, shutdown: CancellationToken) -> AppResult<()> {
        let port = self.state.config.http_port;
        let app = api::router(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state);

        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind port {port}: {e}")))?;

        tracing::info!(port, "Sync server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        tracing::info!("Sync server stopped");
        Ok(())
    }
}

mod panic;

use std::net::SocketAddr;

use axum::{Router, response::IntoResponse};
use http::StatusCode;
use relay_config::Config;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the transcription relay fails to initialize
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let relay = transcribe::build_server(config)?;

        let mut app = Router::new();

        // Health check
        if let Some(path) = config.server.health.route() {
            app = app.route(path, axum::routing::get(health_handler));
        }

        // Transcription relay
        let path = relay.path().to_owned();
        app = app.merge(transcribe::endpoint_router(&path).with_state(relay));

        // Apply middleware layers (innermost first)
        app = app
            .layer(CatchPanicLayer::custom(panic::panic_response))
            .layer(TraceLayer::new_for_http());

        Ok(Self { router: app, listen_address })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. In-flight relays
    /// are allowed to finish, which also removes their temporary files.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

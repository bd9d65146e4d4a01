#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod artifact;
mod download;
mod error;
mod http_client;
mod request;
mod server;
mod upload;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde_json::Value;

pub use artifact::TempArtifact;
pub use download::Download;
pub use error::{RelayError, Result};
pub use request::ExtractSourceUrl;
pub use server::Relay;

use server::RelayBuilder;

/// Build the transcription relay from configuration
///
/// # Errors
///
/// Returns an error if the relay fails to initialize
pub fn build_server(config: &relay_config::Config) -> anyhow::Result<Arc<Relay>> {
    let relay = Arc::new(
        RelayBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize transcription relay: {e}"))?,
    );
    Ok(relay)
}

/// Create the endpoint router for the relay
///
/// Only POST is routed to the pipeline; every other method is answered
/// with 405 before the body is read.
pub fn endpoint_router(path: &str) -> Router<Arc<Relay>> {
    Router::new().route(path, post(transcribe).fallback(method_not_allowed))
}

/// Handle transcription requests
async fn transcribe(State(relay): State<Arc<Relay>>, ExtractSourceUrl(url): ExtractSourceUrl) -> Result<Json<Value>> {
    tracing::debug!("transcription handler called");

    let payload = relay.transcribe(&url).await?;

    Ok(Json(payload))
}

async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}

use std::time::{Duration, Instant};

use relay_telemetry::RelayMetrics;
use serde_json::Value;

use crate::{
    download::Downloader,
    error::{RelayError, Result},
    http_client::http_client,
    upload::TranscriptionClient,
};

/// Download-then-forward pipeline shared by all requests
///
/// Holds no per-request state; each call owns its own temporary artifact.
pub struct Relay {
    downloader: Downloader,
    transcriber: TranscriptionClient,
    deadline: Duration,
    body_limit: usize,
    path: String,
    metrics: RelayMetrics,
}

impl Relay {
    /// Route the relay is mounted on
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Maximum accepted request body size in bytes
    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Download `url`, submit it for transcription, and return the payload
    ///
    /// The whole pipeline runs under the configured deadline. When it
    /// expires the in-flight download or upload is dropped along with its
    /// temporary artifact.
    pub(crate) async fn transcribe(&self, url: &str) -> Result<Value> {
        let start = Instant::now();

        let result = tokio::time::timeout(self.deadline, self.run(url))
            .await
            .unwrap_or(Err(RelayError::Timeout));

        let outcome = result.as_ref().map_or_else(RelayError::outcome, |_| "success");
        self.metrics.record_request(outcome, start);

        tracing::info!(
            outcome,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "transcription relay finished"
        );

        result
    }

    async fn run(&self, url: &str) -> Result<Value> {
        let download = self.downloader.fetch(url).await?;
        self.metrics.record_download(download.size);

        self.transcriber.submit(&download).await
    }
}

/// Builder for constructing the relay from configuration
pub(crate) struct RelayBuilder<'a> {
    config: &'a relay_config::Config,
}

impl<'a> RelayBuilder<'a> {
    pub fn new(config: &'a relay_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> anyhow::Result<Relay> {
        let client = http_client();
        let transcription = &self.config.transcription;

        let deadline = transcription.request_deadline()?;

        tracing::debug!(
            path = %transcription.path,
            model = %transcription.model,
            deadline_secs = deadline.as_secs(),
            "initializing transcription relay"
        );

        Ok(Relay {
            downloader: Downloader::new(client.clone(), &self.config.download),
            transcriber: TranscriptionClient::new(client, transcription),
            deadline,
            body_limit: self.config.server.body_limit,
            path: transcription.path.clone(),
            metrics: RelayMetrics::new(),
        })
    }
}

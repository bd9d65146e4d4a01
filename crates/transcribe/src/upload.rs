use reqwest::{
    Client,
    multipart::{Form, Part},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio_util::io::ReaderStream;

use crate::{
    download::Download,
    error::{RelayError, Result},
};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Client for the upstream speech-to-text service
pub(crate) struct TranscriptionClient {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
}

impl TranscriptionClient {
    pub fn new(client: Client, config: &relay_config::TranscriptionConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Upload a downloaded artifact and return the service's JSON payload
    ///
    /// The file is streamed from disk rather than buffered in memory.
    pub async fn submit(&self, download: &Download) -> Result<Value> {
        let file = tokio::fs::File::open(download.artifact.path())
            .await
            .map_err(RelayError::storage("Failed to read temporary file"))?;

        let content_type = download
            .content_type
            .as_deref()
            .and_then(media_essence)
            .unwrap_or(FALLBACK_CONTENT_TYPE);

        let file_part = Part::stream_with_length(reqwest::Body::wrap_stream(ReaderStream::new(file)), download.size)
            .file_name(download.artifact.file_name().to_string())
            .mime_str(content_type)
            .map_err(|e| RelayError::Internal(format!("invalid content type {content_type}: {e}")))?;

        let form = Form::new().part("file", file_part).text("model", self.model.clone());

        tracing::debug!(
            "transcription request: {} bytes, model={}",
            download.size,
            self.model,
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("transcription request failed: {e}");
                RelayError::ConnectionError(format!("Failed to send request to transcription service: {e}"))
            })?;

        let status = response.status();

        let body = response.bytes().await.map_err(|e| {
            RelayError::ConnectionError(format!("Failed to read transcription service response: {e}"))
        })?;

        if !status.is_success() {
            let payload = serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));

            tracing::error!("transcription service error ({status}): {payload}");

            return Err(RelayError::TranscriptionFailed {
                status: status.as_u16(),
                payload,
            });
        }

        let payload = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("failed to parse transcription response: {e}");
            RelayError::InvalidUpstreamResponse(e.to_string())
        })?;

        tracing::debug!("transcription complete");

        Ok(payload)
    }
}

/// Strip parameters from an audio or video content type
///
/// Anything else is left to the fallback type so the upstream service
/// decides from the file extension.
fn media_essence(content_type: &str) -> Option<&str> {
    let essence = content_type.split(';').next()?.trim();

    let is_media = essence.starts_with("audio/") || essence.starts_with("video/");
    let is_token = essence
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '+' | '-'));

    (is_media && is_token).then_some(essence)
}

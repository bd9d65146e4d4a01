use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Failures of the transcription relay pipeline
///
/// Every variant renders as `{ "error": <string|object> }`. Only the
/// upstream payload and fixed messages ever reach the caller; the detail
/// carried by internal variants is logged instead.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Request used a method other than POST
    #[error("Only POST allowed")]
    MethodNotAllowed,

    /// Request body could not be read or is not JSON
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    /// Request body exceeded the configured ceiling
    #[error("Request body too large")]
    BodyTooLarge,

    /// Body has no usable `url` field
    #[error("Missing URL")]
    MissingUrl,

    /// Source media could not be fetched or answered with a non-success status
    #[error("Failed to download video: {0}")]
    DownloadFailed(String),

    /// Source media exceeded the configured download ceiling
    #[error("Downloaded file exceeds size limit of {limit} bytes")]
    DownloadTooLarge { limit: u64 },

    /// Source connection failed after the transfer had started
    #[error("Download interrupted: {0}")]
    DownloadInterrupted(#[source] reqwest::Error),

    /// Temporary artifact could not be created, written, or read
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Transcription service could not be reached
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Transcription service answered with a non-success status
    #[error("Transcription service error ({status})")]
    TranscriptionFailed { status: u16, payload: Value },

    /// Transcription service answered 2xx with a body that isn't JSON
    #[error("Invalid response from transcription service: {0}")]
    InvalidUpstreamResponse(String),

    /// Unexpected failure inside the relay
    #[error("Internal error: {0}")]
    Internal(String),

    /// The request deadline elapsed before the pipeline finished
    #[error("Transcription request timed out")]
    Timeout,
}

impl RelayError {
    pub(crate) fn storage(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Storage { context, source }
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidBody(_)
            | Self::MissingUrl
            | Self::DownloadFailed(_)
            | Self::DownloadTooLarge { .. } => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::DownloadInterrupted(_)
            | Self::Storage { .. }
            | Self::ConnectionError(_)
            | Self::TranscriptionFailed { .. }
            | Self::InvalidUpstreamResponse(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidBody(_) => "Invalid JSON body".to_string(),
            Self::DownloadFailed(_) => "Failed to download video".to_string(),
            Self::DownloadTooLarge { .. } => "Downloaded file exceeds size limit".to_string(),
            Self::DownloadInterrupted(_) => "Download interrupted".to_string(),
            Self::Storage { context, .. } => (*context).to_string(),
            Self::ConnectionError(_) => "Failed to reach transcription service".to_string(),
            Self::InvalidUpstreamResponse(_) => "Invalid response from transcription service".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Value placed under the `error` key of the response body
    pub fn error_body(&self) -> Value {
        match self {
            Self::TranscriptionFailed { payload, .. } => payload.clone(),
            _ => Value::String(self.client_message()),
        }
    }

    /// Short label used for logs and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed | Self::InvalidBody(_) | Self::BodyTooLarge | Self::MissingUrl => "rejected",
            Self::DownloadFailed(_) | Self::DownloadTooLarge { .. } | Self::DownloadInterrupted(_) => "download_error",
            Self::ConnectionError(_) | Self::TranscriptionFailed { .. } | Self::InvalidUpstreamResponse(_) => {
                "upstream_error"
            }
            Self::Storage { .. } | Self::Internal(_) => "internal_error",
            Self::Timeout => "timeout",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(outcome = self.outcome(), "transcription relay failed: {self}");
        } else {
            tracing::debug!(outcome = self.outcome(), "transcription request rejected: {self}");
        }

        let mut response = (status, Json(json!({ "error": self.error_body() }))).into_response();

        if matches!(self, Self::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }

        response
    }
}

use std::sync::Arc;

use axum::body::Body;
use http_body_util::LengthLimitError;
use serde_json::Value;

use crate::{error::RelayError, server::Relay};

/// Extractor for the `url` field of a transcription request
///
/// The body is drained up to the relay's size ceiling and parsed as JSON
/// whatever `Content-Type` the caller declared. An empty body is treated as
/// an empty object so it reports a missing URL rather than a parse error.
pub struct ExtractSourceUrl(pub String);

impl axum::extract::FromRequest<Arc<Relay>> for ExtractSourceUrl {
    type Rejection = RelayError;

    async fn from_request(request: http::Request<Body>, relay: &Arc<Relay>) -> Result<Self, Self::Rejection> {
        let limit = relay.body_limit();

        let declared_length = request
            .headers()
            .get(http::header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<usize>().ok());

        if declared_length.is_some_and(|length| length > limit) {
            return Err(RelayError::BodyTooLarge);
        }

        let bytes = axum::body::to_bytes(request.into_body(), limit)
            .await
            .map_err(|err| {
                if is_length_limit(&err) {
                    RelayError::BodyTooLarge
                } else {
                    RelayError::InvalidBody(format!("failed to read request body: {err}"))
                }
            })?;

        source_url(&bytes).map(Self)
    }
}

/// Pull a non-empty `url` string out of a JSON request body
pub(crate) fn source_url(body: &[u8]) -> Result<String, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RelayError::MissingUrl);
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| RelayError::InvalidBody(e.to_string()))?;

    value
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or(RelayError::MissingUrl)
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source = Some(err as &(dyn std::error::Error + 'static));

    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }

    false
}

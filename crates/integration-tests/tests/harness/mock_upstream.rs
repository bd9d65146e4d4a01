//! Mock media host and transcription service for integration tests
//!
//! Serves downloadable media under `/media/*` and an OpenAI-compatible
//! `/v1/audio/transcriptions` endpoint that records what it received

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing};
use bytes::Bytes;
use futures_util::stream;
use tokio_util::sync::CancellationToken;

/// Size of the media file served at `/media/clip.mp4`
pub const CLIP_SIZE: usize = 64 * 1024;

/// What the transcription endpoint answers with
#[derive(Clone)]
pub enum UpstreamReply {
    Json(StatusCode, serde_json::Value),
    Text(StatusCode, &'static str),
}

/// A multipart upload as seen by the transcription endpoint
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub model: Option<String>,
    pub file_name: Option<String>,
    pub file_size: usize,
    pub authorization: Option<String>,
}

pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    reply: UpstreamReply,
    download_count: AtomicU32,
    uploads: Mutex<Vec<ReceivedUpload>>,
}

impl MockUpstream {
    /// Start a mock whose transcription endpoint returns `{"text": "hello world"}`
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(UpstreamReply::Json(
            StatusCode::OK,
            serde_json::json!({ "text": "hello world" }),
        ))
        .await
    }

    /// Start a mock with a custom transcription reply
    pub async fn start_with(reply: UpstreamReply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            reply,
            download_count: AtomicU32::new(0),
            uploads: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/media/clip.mp4", routing::get(handle_clip))
            .route("/media/missing.mp4", routing::get(handle_missing))
            .route("/media/stalled.mp4", routing::get(handle_stalled))
            .route("/media/broken.mp4", routing::get(handle_broken))
            .route("/v1/audio/transcriptions", routing::post(handle_transcription))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the transcription service
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// URL of a media resource served by the mock
    pub fn media_url(&self, name: &str) -> String {
        format!("http://{}/media/{name}", self.addr)
    }

    /// Number of media downloads started
    pub fn download_count(&self) -> u32 {
        self.state.download_count.load(Ordering::Relaxed)
    }

    /// Uploads received by the transcription endpoint
    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.uploads.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_clip(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.download_count.fetch_add(1, Ordering::Relaxed);
    ([(header::CONTENT_TYPE, "video/mp4")], vec![0x42_u8; CLIP_SIZE])
}

async fn handle_missing(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.download_count.fetch_add(1, Ordering::Relaxed);
    (StatusCode::NOT_FOUND, "no such media")
}

/// Sends one chunk and then never finishes the body
async fn handle_stalled(State(state): State<Arc<MockState>>) -> Response {
    state.download_count.fetch_add(1, Ordering::Relaxed);

    let first = stream::iter([Ok::<_, std::io::Error>(Bytes::from_static(&[0x42; 1024]))]);
    let body = futures_util::StreamExt::chain(first, stream::pending());

    ([(header::CONTENT_TYPE, "video/mp4")], Body::from_stream(body)).into_response()
}

/// Sends one chunk, advertises more, then aborts the connection
///
/// The error is delayed so the status line and first chunk reach the
/// client before the transfer breaks.
async fn handle_broken(State(state): State<Arc<MockState>>) -> Response {
    state.download_count.fetch_add(1, Ordering::Relaxed);

    let first = stream::iter([Ok::<_, std::io::Error>(Bytes::from_static(&[0x42; 1024]))]);
    let failure = stream::once(async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Err(std::io::Error::other("connection reset by mock"))
    });
    let body = futures_util::StreamExt::chain(first, failure);

    (
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (header::CONTENT_LENGTH, CLIP_SIZE.to_string()),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

async fn handle_transcription(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut upload = ReceivedUpload {
        model: None,
        file_name: None,
        file_size: 0,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                upload.file_name = field.file_name().map(str::to_owned);
                upload.file_size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
            }
            "model" => {
                upload.model = field.text().await.ok();
            }
            _ => {}
        }
    }

    state.uploads.lock().unwrap().push(upload);

    match &state.reply {
        UpstreamReply::Json(status, payload) => (*status, axum::Json(payload.clone())).into_response(),
        UpstreamReply::Text(status, text) => (*status, *text).into_response(),
    }
}

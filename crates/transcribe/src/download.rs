use std::path::PathBuf;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::{
    artifact::TempArtifact,
    error::{RelayError, Result},
};

/// Source media written to a temporary artifact
#[derive(Debug)]
pub struct Download {
    pub artifact: TempArtifact,
    /// Number of bytes written to the artifact
    pub size: u64,
    /// `Content-Type` reported by the source, if any
    pub content_type: Option<String>,
}

/// Streams caller-supplied media URLs into temporary artifacts
pub(crate) struct Downloader {
    client: Client,
    temp_dir: PathBuf,
    extension: String,
    max_bytes: Option<u64>,
}

impl Downloader {
    pub fn new(client: Client, config: &relay_config::DownloadConfig) -> Self {
        Self {
            client,
            temp_dir: config.temp_dir.clone().unwrap_or_else(std::env::temp_dir),
            extension: config.file_extension.clone(),
            max_bytes: config.max_bytes,
        }
    }

    /// Fetch `url` into a fresh temporary artifact
    ///
    /// The source status is checked before any file is created, so a
    /// rejected download never touches the disk. The returned artifact has
    /// been flushed and synced.
    pub async fn fetch(&self, url: &str) -> Result<Download> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!("source request failed: {e}");
            RelayError::DownloadFailed(e.without_url().to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "source responded with non-success status");
            return Err(RelayError::DownloadFailed(format!("source responded with {status}")));
        }

        if let (Some(limit), Some(length)) = (self.max_bytes, response.content_length())
            && length > limit
        {
            return Err(RelayError::DownloadTooLarge { limit });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let (artifact, mut file) = TempArtifact::create(&self.temp_dir, &self.extension).await?;

        let mut size: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| RelayError::DownloadInterrupted(e.without_url()))?;
            size += chunk.len() as u64;

            if let Some(limit) = self.max_bytes
                && size > limit
            {
                return Err(RelayError::DownloadTooLarge { limit });
            }

            file.write_all(&chunk)
                .await
                .map_err(RelayError::storage("Failed to write temporary file"))?;
        }

        file.flush()
            .await
            .map_err(RelayError::storage("Failed to write temporary file"))?;
        file.sync_all()
            .await
            .map_err(RelayError::storage("Failed to write temporary file"))?;

        tracing::debug!(bytes = size, file = artifact.file_name(), "source media downloaded");

        Ok(Download {
            artifact,
            size,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        Router,
        body::{Body, Bytes},
        http::{StatusCode, header},
        response::IntoResponse,
        routing::get,
    };

    use super::*;
    use crate::http_client::http_client;

    async fn serve_media() -> SocketAddr {
        let app = Router::new()
            .route(
                "/clip.mp4",
                get(|| async { ([(header::CONTENT_TYPE, "video/mp4")], vec![7_u8; 4096]) }),
            )
            .route("/gone.mp4", get(|| async { StatusCode::NOT_FOUND.into_response() }))
            .route("/truncated.mp4", get(truncated));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.ok() });
        addr
    }

    /// Promises 8 KiB, sends 1 KiB, then breaks the connection
    async fn truncated() -> axum::response::Response {
        let first = futures_util::stream::iter([Ok::<_, std::io::Error>(Bytes::from_static(&[7; 1024]))]);
        let failure = futures_util::stream::once(async {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            Err(std::io::Error::other("reset"))
        });

        (
            [(header::CONTENT_LENGTH, "8192")],
            Body::from_stream(first.chain(failure)),
        )
            .into_response()
    }

    fn downloader(dir: &std::path::Path, max_bytes: Option<u64>) -> Downloader {
        let config = relay_config::DownloadConfig {
            temp_dir: Some(dir.to_path_buf()),
            file_extension: "mp4".to_string(),
            max_bytes,
        };
        Downloader::new(http_client(), &config)
    }

    fn dir_is_empty(dir: &std::path::Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn writes_source_bytes_to_artifact() {
        let addr = serve_media().await;
        let dir = tempfile::tempdir().unwrap();

        let download = downloader(dir.path(), None)
            .fetch(&format!("http://{addr}/clip.mp4"))
            .await
            .unwrap();

        assert_eq!(download.size, 4096);
        assert_eq!(download.content_type.as_deref(), Some("video/mp4"));
        assert_eq!(std::fs::read(download.artifact.path()).unwrap(), vec![7_u8; 4096]);

        drop(download);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn non_success_status_creates_no_file() {
        let addr = serve_media().await;
        let dir = tempfile::tempdir().unwrap();

        let err = downloader(dir.path(), None)
            .fetch(&format!("http://{addr}/gone.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::DownloadFailed(_)));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn unparseable_url_is_a_download_failure() {
        let dir = tempfile::tempdir().unwrap();

        let err = downloader(dir.path(), None).fetch("not a url").await.unwrap_err();

        assert!(matches!(err, RelayError::DownloadFailed(_)));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn oversized_source_is_rejected_and_cleaned_up() {
        let addr = serve_media().await;
        let dir = tempfile::tempdir().unwrap();

        let err = downloader(dir.path(), Some(1024))
            .fetch(&format!("http://{addr}/clip.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::DownloadTooLarge { limit: 1024 }));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn broken_transfer_is_interrupted_and_cleaned_up() {
        let addr = serve_media().await;
        let dir = tempfile::tempdir().unwrap();

        let err = downloader(dir.path(), None)
            .fetch(&format!("http://{addr}/truncated.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::DownloadInterrupted(_)));
        assert!(dir_is_empty(dir.path()));
    }
}

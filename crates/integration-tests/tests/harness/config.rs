//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use relay_config::{Config, DownloadConfig, ServerConfig, TranscriptionConfig};
use secrecy::SecretString;

/// API key configured for the mock transcription service
pub const TEST_API_KEY: &str = "test-key";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Point the relay at `base_url` and keep temporary files in `temp_dir`
    pub fn new(base_url: &str, temp_dir: &Path) -> Self {
        let mut transcription = TranscriptionConfig::new(SecretString::from(TEST_API_KEY));
        transcription.base_url = base_url.parse().expect("valid URL");
        transcription.request_timeout = "10s".to_owned();

        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                transcription,
                download: DownloadConfig {
                    temp_dir: Some(temp_dir.to_path_buf()),
                    ..DownloadConfig::default()
                },
                telemetry: None,
            },
        }
    }

    /// Set the per-request deadline
    pub fn with_timeout(mut self, timeout: &str) -> Self {
        timeout.clone_into(&mut self.config.transcription.request_timeout);
        self
    }

    /// Set the download size ceiling
    pub fn with_max_download(mut self, bytes: u64) -> Self {
        self.config.download.max_bytes = Some(bytes);
        self
    }

    /// Set the model identifier sent upstream
    pub fn with_model(mut self, model: &str) -> Self {
        model.clone_into(&mut self.config.transcription.model);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}

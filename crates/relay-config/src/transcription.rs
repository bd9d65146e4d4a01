use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Upstream speech-to-text service configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptionConfig {
    /// Route the relay is mounted on
    #[serde(default = "default_path")]
    pub path: String,
    /// Base URL of the transcription API; `/audio/transcriptions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Bearer credential sent to the transcription API
    pub api_key: SecretString,
    /// Model identifier sent in the multipart `model` field
    #[serde(default = "default_model")]
    pub model: String,
    /// Deadline for the whole download and upload pipeline (e.g. "30s", "5m")
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
}

impl TranscriptionConfig {
    /// Create a configuration with defaults for everything but the credential
    pub fn new(api_key: SecretString) -> Self {
        Self {
            path: default_path(),
            base_url: default_base_url(),
            api_key,
            model: default_model(),
            request_timeout: default_request_timeout(),
        }
    }

    /// Parse the configured request deadline
    ///
    /// # Errors
    ///
    /// Returns an error if `request_timeout` is not a valid duration string
    pub fn request_deadline(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.request_timeout)
            .map_err(|e| anyhow::anyhow!("invalid transcription.request_timeout '{}': {e}", self.request_timeout))
    }

    /// Full URL of the transcription endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url.as_str().trim_end_matches('/'))
    }
}

fn default_path() -> String {
    "/api/transcribe".to_string()
}

fn default_base_url() -> Url {
    Url::parse("https://api.openai.com/v1").expect("must be a valid URL")
}

fn default_model() -> String {
    "whisper-1".to_string()
}

fn default_request_timeout() -> String {
    "5m".to_string()
}

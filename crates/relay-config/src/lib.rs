#![allow(clippy::must_use_candidate)]

pub mod download;
mod env;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;
pub mod transcription;

use serde::Deserialize;

pub use download::*;
pub use health::*;
pub use server::*;
pub use telemetry::TelemetryConfig;
pub use transcription::*;

/// Top-level relay configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Transcription service configuration
    pub transcription: TranscriptionConfig,
    /// Source media download configuration
    #[serde(default)]
    pub download: DownloadConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

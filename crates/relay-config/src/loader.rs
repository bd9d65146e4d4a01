use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from raw TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server()?;
        self.validate_transcription()?;
        self.validate_download()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        if self.server.body_limit == 0 {
            anyhow::bail!("server.body_limit must be greater than 0");
        }

        if let Some(path) = self.server.health.route() {
            if !path.starts_with('/') {
                anyhow::bail!("server.health.path must start with '/'");
            }

            if path == self.transcription.path {
                anyhow::bail!("server.health.path must differ from transcription.path");
            }
        }

        Ok(())
    }

    fn validate_transcription(&self) -> anyhow::Result<()> {
        let transcription = &self.transcription;

        if transcription.api_key.expose_secret().trim().is_empty() {
            anyhow::bail!("transcription.api_key must not be empty");
        }

        if !transcription.path.starts_with('/') {
            anyhow::bail!("transcription.path must start with '/'");
        }

        if transcription.model.trim().is_empty() {
            anyhow::bail!("transcription.model must not be empty");
        }

        if transcription.request_deadline()?.is_zero() {
            anyhow::bail!("transcription.request_timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_download(&self) -> anyhow::Result<()> {
        let extension = &self.download.file_extension;

        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!("download.file_extension must be a non-empty alphanumeric string, got '{extension}'");
        }

        if self.download.max_bytes == Some(0) {
            anyhow::bail!("download.max_bytes must be greater than 0");
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        let Some(sampling_rate) = self
            .telemetry
            .as_ref()
            .and_then(|t| t.tracing.as_ref())
            .map(|t| t.sampling_rate)
        else {
            return Ok(());
        };

        if !(0.0..=1.0).contains(&sampling_rate) {
            anyhow::bail!("telemetry.tracing.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}

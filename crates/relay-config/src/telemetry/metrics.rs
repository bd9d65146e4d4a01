use serde::Deserialize;

use super::exporters::ExporterConfig;

/// Relay metrics export settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Export request counts, durations and download sizes
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Exporter used for metrics instead of `telemetry.exporter`
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
}

impl MetricsConfig {
    /// Resolve the exporter for metrics, if metrics are enabled
    #[must_use]
    pub fn resolve<'a>(&'a self, fallback: Option<&'a ExporterConfig>) -> Option<&'a ExporterConfig> {
        if !self.enabled {
            return None;
        }
        self.exporter.as_ref().or(fallback)
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

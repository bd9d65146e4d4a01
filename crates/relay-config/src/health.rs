use serde::Deserialize;

/// Liveness route served next to the relay endpoint
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    /// Mount the liveness route
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Route path, answered with `200 ok` on GET
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_path(),
        }
    }
}

impl HealthConfig {
    /// Route path to mount, or `None` when the route is disabled
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.enabled.then_some(self.path.as_str())
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_path() -> String {
    "/health".to_string()
}

use std::path::PathBuf;

use serde::Deserialize;

/// Source media download and temporary storage configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadConfig {
    /// Directory for temporary media files, defaults to the system temp dir
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    /// Extension given to temporary media files
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    /// Abort downloads larger than this many bytes
    #[serde(default)]
    pub max_bytes: Option<u64>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            file_extension: default_file_extension(),
            max_bytes: None,
        }
    }
}

fn default_file_extension() -> String {
    "mp4".to_string()
}

use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::{RelayError, Result};

const FILE_PREFIX: &str = "transcribe-";
const RANDOM_LEN: usize = 16;

/// On-disk copy of downloaded media, owned by a single request
///
/// The file name carries a random token so concurrent requests never share
/// a path. Dropping the artifact deletes the file, so every exit from the
/// pipeline (including cancellation by the request deadline) releases it.
#[derive(Debug)]
pub struct TempArtifact {
    path: Option<TempPath>,
    file_name: String,
}

impl TempArtifact {
    /// Create an empty artifact in `dir` and open it for async writing
    pub async fn create(dir: &Path, extension: &str) -> Result<(Self, tokio::fs::File)> {
        let dir = dir.to_path_buf();
        let suffix = format!(".{extension}");

        let named = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(FILE_PREFIX)
                .suffix(&suffix)
                .rand_bytes(RANDOM_LEN)
                .tempfile_in(dir)
        })
        .await
        .map_err(|e| RelayError::Internal(format!("temporary file task failed: {e}")))?
        .map_err(RelayError::storage("Failed to create temporary file"))?;

        let (file, path) = named.into_parts();

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!(file = %file_name, "created temporary artifact");

        Ok((
            Self {
                path: Some(path),
                file_name,
            },
            tokio::fs::File::from_std(file),
        ))
    }

    /// Location of the artifact on disk
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// File name component, used as the multipart file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Owned copy of the path, for checking removal after the artifact is gone
    pub fn to_path_buf(&self) -> PathBuf {
        self.path().to_path_buf()
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };

        match path.close() {
            Ok(()) => tracing::debug!(file = %self.file_name, "removed temporary artifact"),
            Err(e) => tracing::warn!(file = %self.file_name, "failed to remove temporary artifact: {e}"),
        }
    }
}

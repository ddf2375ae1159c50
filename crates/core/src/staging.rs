//! Local staging of audio before upload.

use std::io;
use std::path::{Path, PathBuf};

/// Prefix of the per-submission staging directories.
pub const STAGING_DIR_PREFIX: &str = "tarannum-staging-";

/// Audio written to a fresh, uniquely named directory under the staging root.
///
/// The file keeps the artifact's display name so the upload can derive the
/// remote name from it; the enclosing directory makes concurrent submissions
/// with the same name and second distinct.
///
/// [`discard`](Self::discard) removes the directory asynchronously. If the
/// value is dropped without it, for example when the request future is
/// cancelled mid-upload, `Drop` removes the directory synchronously.
#[derive(Debug)]
pub struct StagedAudio {
    /// `None` once the directory has been removed.
    dir: Option<PathBuf>,
    path: PathBuf,
}

impl StagedAudio {
    pub async fn write(root: &Path, file_name: &str, bytes: &[u8]) -> io::Result<Self> {
        let dir = root.join(format!(
            "{STAGING_DIR_PREFIX}{}",
            uuid::Uuid::new_v4().simple()
        ));
        tokio::fs::create_dir_all(&dir).await?;

        // Owned from here so a cancelled write still cleans up.
        let staged = Self {
            path: dir.join(file_name),
            dir: Some(dir),
        };
        tokio::fs::write(&staged.path, bytes).await?;

        tracing::debug!(path = %staged.path.display(), size = bytes.len(), "Staged audio");
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the staged file and its directory. Failures are logged only.
    pub async fn discard(mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                log_removal_failure(&dir, &e);
            }
        }
    }
}

impl Drop for StagedAudio {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            tracing::debug!(dir = %dir.display(), "Removing staged audio on drop");
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                log_removal_failure(&dir, &e);
            }
        }
    }
}

fn log_removal_failure(dir: &Path, e: &io::Error) {
    if e.kind() != io::ErrorKind::NotFound {
        tracing::warn!(
            error = %e,
            dir = %dir.display(),
            "Failed to remove staged audio"
        );
    }
}

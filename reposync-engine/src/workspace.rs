//! Per-pair scratch directory for the bare clone.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{io_err, EngineError};

/// Uniquely named directory (`reposync-<repo>-XXXXXX`) owned by exactly one
/// pair. It is removed by [`MirrorWorkspace::cleanup`], or on drop if the
/// caller unwinds before reaching it.
#[derive(Debug)]
pub struct MirrorWorkspace {
    dir: TempDir,
    repo: String,
}

impl MirrorWorkspace {
    /// Create the workspace under `root`, or the system temp dir when `None`.
    pub fn create(root: Option<&Path>, repo: &str) -> Result<Self, EngineError> {
        let prefix = format!("reposync-{repo}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
                builder.tempdir_in(root).map_err(|e| io_err(root, e))?
            }
            None => builder
                .tempdir()
                .map_err(|e| io_err(std::env::temp_dir(), e))?,
        };
        tracing::debug!("created workspace {}", dir.path().display());

        Ok(Self {
            dir,
            repo: repo.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Location of the bare clone: `<workspace>/<repo>.git`.
    pub fn repo_dir(&self) -> PathBuf {
        self.dir.path().join(format!("{}.git", self.repo))
    }

    /// Remove the workspace recursively. Failure is logged, never raised.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => tracing::debug!("removed workspace {}", path.display()),
            Err(e) => tracing::warn!("failed to clean up workspace {}: {e}", path.display()),
        }
    }
}

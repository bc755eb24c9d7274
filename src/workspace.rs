//! Per-job scratch directory
//!
//! A [`Workspace`] owns a fresh temporary directory for the lifetime of one job.
//! Dropping it removes the directory and everything in it, so every exit path of
//! the pipeline (success, error, timeout, cancellation) leaves nothing behind.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = "clip-stitch-";
const OUTPUT_SUBDIR: &str = "out";

/// Exclusively-owned temporary directory for one stitch job
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a workspace under `root`, or the system temp dir if `None`
    pub async fn create(root: Option<&Path>) -> Result<Self> {
        let root = match root {
            Some(root) => {
                tokio::fs::create_dir_all(root).await?;
                // Manifest entries are resolved relative to the manifest itself
                Some(tokio::fs::canonicalize(root).await?)
            }
            None => None,
        };

        let dir = tokio::task::spawn_blocking(move || {
            let mut builder = tempfile::Builder::new();
            builder.prefix(WORKSPACE_PREFIX);
            match root {
                Some(root) => builder.tempdir_in(root),
                None => builder.tempdir(),
            }
        })
        .await
        .map_err(|e| Error::Unexpected(format!("workspace creation task failed: {e}")))??;

        // Keeps the muxed output apart from the fixed scratch names
        tokio::fs::create_dir(dir.path().join(OUTPUT_SUBDIR)).await?;

        tracing::debug!(path = %dir.path().display(), "created job workspace");
        Ok(Self { dir })
    }

    /// Root of the workspace
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Destination of the clip at `index` (zero-based, in request order)
    pub fn clip_path(&self, index: usize) -> PathBuf {
        self.path().join(format!("scene_{index:03}.mp4"))
    }

    /// Destination of the downloaded audio track
    pub fn audio_path(&self) -> PathBuf {
        self.path().join("audio.mp3")
    }

    /// Concat manifest location
    pub fn manifest_path(&self) -> PathBuf {
        self.path().join("concat.txt")
    }

    /// Joined video (no audio) location
    pub fn concatenated_path(&self) -> PathBuf {
        self.path().join("concatenated.mp4")
    }

    /// Muxed output location, before it is published
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.path().join(OUTPUT_SUBDIR).join(filename)
    }

    /// Remove the workspace now, reporting failures instead of ignoring them
    pub async fn close(self) -> Result<()> {
        let path = self.path().to_path_buf();
        tokio::task::spawn_blocking(move || self.dir.close())
            .await
            .map_err(|e| Error::Unexpected(format!("workspace removal task failed: {e}")))??;
        tracing::debug!(path = %path.display(), "removed job workspace");
        Ok(())
    }
}

//! Concat manifest for ffmpeg's concat demuxer
//!
//! One `file '<path>'` line per clip. The line order is the only thing that
//! decides the order of the clips in the joined video, so paths are written
//! exactly in the order they are given.

use crate::error::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Quote a path for a concat manifest line
///
/// The concat demuxer reads single-quoted strings; a literal `'` is written as
/// `'\''` (close quote, escaped quote, reopen quote).
fn quote_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// Render the manifest text for `clips`, preserving their order
pub fn render_manifest(clips: &[PathBuf]) -> String {
    let mut manifest = String::with_capacity(clips.len() * 64);
    for clip in clips {
        // Writing to a String cannot fail
        let _ = writeln!(manifest, "file {}", quote_path(clip));
    }
    manifest
}

/// Write the manifest for `clips` to `path`
pub async fn write_manifest(path: &Path, clips: &[PathBuf]) -> Result<()> {
    let manifest = render_manifest(clips);
    tokio::fs::write(path, manifest.as_bytes()).await?;

    tracing::debug!(
        path = %path.display(),
        clips = clips.len(),
        "wrote concat manifest"
    );
    Ok(())
}

//! Trait for the external media tool

use async_trait::async_trait;
use std::path::Path;

/// Operations the pipeline delegates to an external media tool
///
/// The pipeline only needs four capabilities from the tool: stream copy, a
/// concat-list input mode, re-encoding audio to one named codec, and truncating
/// the output to the shortest input stream. Any tool offering them can sit
/// behind this trait.
///
/// # Examples
///
/// ```no_run
/// use clip_stitch::media::{FfmpegProcessor, MediaProcessor};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let ffmpeg = FfmpegProcessor::from_path()
///     .expect("ffmpeg binary not found");
///
/// ffmpeg.concat(Path::new("concat.txt"), Path::new("joined.mp4")).await?;
/// ffmpeg
///     .mux_audio(Path::new("joined.mp4"), Path::new("audio.mp3"), Path::new("final.mp4"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Join the clips listed in `manifest` into `output` without re-encoding
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tool cannot be started
    /// - The tool exits unsuccessfully (the error carries its diagnostics)
    /// - The invocation exceeds its time limit
    async fn concat(&self, manifest: &Path, output: &Path) -> crate::Result<()>;

    /// Combine `video` and `audio` into `output`
    ///
    /// The video stream is copied, the audio stream is re-encoded, and the
    /// output ends with the shorter of the two inputs.
    ///
    /// # Errors
    ///
    /// Same contract as [`MediaProcessor::concat`].
    async fn mux_audio(&self, video: &Path, audio: &Path, output: &Path) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

//! Core types for a stitch job

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Output file name used when the request does not name one
pub const DEFAULT_OUTPUT_FILENAME: &str = "final-video.mp4";

/// A stitch job as delivered on stdin
///
/// Field names follow the JSON protocol (`videoUrls`, `audioUrl`, `outputFilename`).
/// The order of `video_urls` is the order the clips appear in the final video.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    /// Clip URLs, in playback order
    #[serde(default)]
    pub video_urls: Vec<String>,

    /// Audio track URL
    #[serde(default)]
    pub audio_url: Option<String>,

    /// Name of the produced file (default: "final-video.mp4")
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
}

impl JobRequest {
    /// Create a request with the default output file name
    pub fn new(video_urls: Vec<String>, audio_url: impl Into<String>) -> Self {
        Self {
            video_urls,
            audio_url: Some(audio_url.into()),
            output_filename: default_output_filename(),
        }
    }

    /// Parse a request from the JSON document read on stdin
    pub fn from_json(input: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

/// Pipeline stage of a job
///
/// A job moves strictly forward through these stages; any of them may end the
/// job with a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Fetching clips and the audio track into the workspace
    Downloading,
    /// Joining the clips into one video stream
    Concatenating,
    /// Combining the joined video with the audio track
    Muxing,
    /// Moving the result out of the workspace and measuring it
    ReadingOutput,
}

impl Stage {
    /// Short lowercase label used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Downloading => "download",
            Stage::Concatenating => "concat",
            Stage::Muxing => "mux",
            Stage::ReadingOutput => "read-output",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully produced output file
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StitchOutput {
    /// Where the final video was published
    pub path: PathBuf,
    /// Size of the final video in bytes
    pub size: u64,
}

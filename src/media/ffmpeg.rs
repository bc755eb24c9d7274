//! ffmpeg-backed media processor

use super::traits::MediaProcessor;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::Stage;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Upper bound on diagnostic text kept from a failed invocation
const MAX_DIAGNOSTIC_BYTES: usize = 4096;

const DEFAULT_AUDIO_CODEC: &str = "aac";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Media processor that runs the external `ffmpeg` binary
///
/// Each operation is one ffmpeg invocation with captured output. A non-zero exit
/// becomes [`Error::Process`] carrying ffmpeg's stderr; an invocation running
/// past the configured timeout is killed and reported as [`Error::Timeout`].
///
/// # Examples
///
/// ```no_run
/// use clip_stitch::media::FfmpegProcessor;
/// use std::path::PathBuf;
///
/// // Explicit path
/// let ffmpeg = FfmpegProcessor::new(PathBuf::from("/usr/bin/ffmpeg"));
///
/// // Or auto-discover from PATH
/// let ffmpeg = FfmpegProcessor::from_path().expect("ffmpeg not found in PATH");
/// ```
#[derive(Clone, Debug)]
pub struct FfmpegProcessor {
    binary_path: PathBuf,
    audio_codec: String,
    timeout: Duration,
}

impl FfmpegProcessor {
    /// Create a processor with an explicit binary path
    ///
    /// # Arguments
    ///
    /// * `binary_path` - Path to the ffmpeg binary
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Attempt to find ffmpeg in PATH
    ///
    /// Uses the `which` crate to search for the `ffmpeg` binary in the system PATH.
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }

    /// Build a processor from configuration
    ///
    /// An explicit `tools.ffmpeg_path` wins; otherwise PATH is searched when
    /// `tools.search_path` allows it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let binary_path = match &config.tools.ffmpeg_path {
            Some(path) => path.clone(),
            None if config.tools.search_path => which::which("ffmpeg").map_err(|e| {
                Error::ToolUnavailable(format!("ffmpeg not found in PATH: {}", e))
            })?,
            None => {
                return Err(Error::ToolUnavailable(
                    "no ffmpeg path configured and PATH search is disabled".to_string(),
                ));
            }
        };

        Ok(Self::new(binary_path)
            .with_audio_codec(config.processing.audio_codec.clone())
            .with_timeout(config.processing.process_timeout))
    }

    /// Codec the audio track is re-encoded to
    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = codec.into();
        self
    }

    /// Time limit for one invocation
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the ffmpeg binary in use
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    async fn run(&self, stage: Stage, args: Vec<OsString>) -> Result<()> {
        let started = Instant::now();
        tracing::debug!(
            stage = %stage,
            binary = %self.binary_path.display(),
            args = ?args,
            "running ffmpeg"
        );

        let child = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::ToolUnavailable(format!(
                    "failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::Timeout {
                operation: format!("ffmpeg {}", stage),
                after: self.timeout,
            })??;

        if !output.status.success() {
            let diagnostics = diagnostics(&output);
            tracing::warn!(
                stage = %stage,
                status = ?output.status.code(),
                diagnostics = %diagnostics,
                "ffmpeg failed"
            );
            return Err(Error::Process {
                stage,
                status: output.status.code(),
                diagnostics,
            });
        }

        tracing::debug!(
            stage = %stage,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ffmpeg finished"
        );
        Ok(())
    }
}

/// Flags shared by every invocation: quiet banner, never read stdin, only
/// errors on stderr, overwrite outputs inside the workspace.
fn common_args() -> Vec<OsString> {
    ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
        .into_iter()
        .map(OsString::from)
        .collect()
}

/// `-f concat -safe 0 -i <manifest> -c copy <output>`
pub(crate) fn concat_args(manifest: &Path, output: &Path) -> Vec<OsString> {
    let mut args = common_args();
    args.extend(["-f", "concat", "-safe", "0", "-i"].map(OsString::from));
    args.push(manifest.as_os_str().to_owned());
    args.extend(["-c", "copy"].map(OsString::from));
    args.push(output.as_os_str().to_owned());
    args
}

/// `-i <video> -i <audio> -c:v copy -c:a <codec> -shortest <output>`
pub(crate) fn mux_args(video: &Path, audio: &Path, output: &Path, codec: &str) -> Vec<OsString> {
    let mut args = common_args();
    args.push("-i".into());
    args.push(video.as_os_str().to_owned());
    args.push("-i".into());
    args.push(audio.as_os_str().to_owned());
    args.extend(["-c:v", "copy", "-c:a", codec, "-shortest"].map(OsString::from));
    args.push(output.as_os_str().to_owned());
    args
}

/// Most useful text from a failed invocation: stderr, else stdout
///
/// Long output is cut from the front; ffmpeg prints the decisive error last.
fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let text = match stderr.trim() {
        "" => stdout.trim(),
        trimmed => trimmed,
    };

    if text.is_empty() {
        return "no diagnostic output".to_string();
    }

    tail(text, MAX_DIAGNOSTIC_BYTES).to_string()
}

fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<()> {
        self.run(Stage::Concatenating, concat_args(manifest, output))
            .await
    }

    async fn mux_audio(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        self.run(
            Stage::Muxing,
            mux_args(video, audio, output, &self.audio_codec),
        )
        .await
    }

    fn name(&self) -> &'static str {
        "ffmpeg-cli"
    }
}

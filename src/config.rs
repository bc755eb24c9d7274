//! Configuration types for clip-stitch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// External tool settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for ffmpeg if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// Download settings for clips and the audio track
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total time allowed for one download, including the body (default: 300 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Time allowed to establish a connection (default: 30 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Retry policy for transient download failures (disabled by default)
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry configuration for transient download failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0, a failed download fails the job)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Settings for the ffmpeg stages and the published output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Directory the final video is moved into (default: current directory)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Parent directory for job workspaces (system temp dir if None)
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,

    /// Codec the audio track is re-encoded to (default: "aac")
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Time allowed for one ffmpeg invocation (default: 600 seconds)
    #[serde(default = "default_process_timeout", with = "duration_serde")]
    pub process_timeout: Duration,

    /// What to do when the output file already exists
    #[serde(default)]
    pub file_collision: FileCollisionAction,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            workspace_root: None,
            audio_codec: default_audio_codec(),
            process_timeout: default_process_timeout(),
            file_collision: FileCollisionAction::default(),
        }
    }
}

/// File collision handling strategy for the published output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Replace the existing file (default)
    #[default]
    Overwrite,
    /// Append (1), (2), etc. to filename
    Rename,
    /// Fail the job, keep the existing file
    Skip,
}

/// Main configuration for a stitch job
///
/// Every section has defaults, so `Config::default()` works out of the box as
/// long as ffmpeg is in `PATH`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// External tool paths
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Download behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// ffmpeg stage and output settings
    #[serde(default)]
    pub processing: ProcessingConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file '{}': {}", path.display(), e),
            key: None,
        })?;

        serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse config file '{}': {}", path.display(), e),
            key: None,
        })
    }

    /// Check settings that would make every job fail
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout.is_zero() {
            return Err(config_error("fetch timeout must be positive", "fetch.timeout"));
        }
        if self.fetch.connect_timeout.is_zero() {
            return Err(config_error(
                "connect timeout must be positive",
                "fetch.connect_timeout",
            ));
        }
        if self.processing.process_timeout.is_zero() {
            return Err(config_error(
                "process timeout must be positive",
                "processing.process_timeout",
            ));
        }
        if self.processing.audio_codec.trim().is_empty() {
            return Err(config_error(
                "audio codec must not be empty",
                "processing.audio_codec",
            ));
        }
        if self.fetch.retry.backoff_multiplier < 1.0 {
            return Err(config_error(
                "backoff multiplier must be at least 1.0",
                "fetch.retry.backoff_multiplier",
            ));
        }
        Ok(())
    }
}

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_process_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_user_agent() -> String {
    concat!("clip-stitch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

//! # clip-stitch
//!
//! Downloads a list of video clips and one audio track, joins the clips in
//! order, lays the audio over them and reports the outcome as JSON.
//!
//! ## Design Philosophy
//!
//! clip-stitch is designed to be:
//! - **Thin** - All media work is delegated to ffmpeg; this crate only orchestrates
//! - **All-or-nothing** - A job either publishes one finished video or reports one error
//! - **Self-cleaning** - Every job works in its own temporary directory, removed on every exit path
//! - **Bounded** - Downloads and ffmpeg invocations run under timeouts and can be cancelled
//!
//! ## Quick Start
//!
//! ```no_run
//! use clip_stitch::{Config, JobRequest, Stitcher};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stitcher = Stitcher::new(Config::default())?;
//!
//!     let request = JobRequest::from_json(
//!         r#"{"videoUrls": ["https://x/a.mp4", "https://x/b.mp4"],
//!             "audioUrl": "https://x/audio.mp3",
//!             "outputFilename": "out.mp4"}"#,
//!     )?;
//!
//!     let result = stitcher.run(&request, &CancellationToken::new()).await;
//!     println!("{}", result.to_json());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// HTTP downloads
pub mod fetch;
/// Concat manifest writing
pub mod manifest;
/// External media tool integration
pub mod media;
/// The stitch pipeline
pub mod pipeline;
/// Job result reporting
pub mod report;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;
/// Per-job scratch directory
pub mod workspace;

// Re-export commonly used types
pub use config::{Config, FetchConfig, FileCollisionAction, ProcessingConfig, ToolsConfig};
pub use error::{Error, ErrorCode, Result};
pub use media::{FfmpegProcessor, MediaProcessor};
pub use pipeline::{Stitcher, run_job};
pub use report::JobResult;
pub use types::{JobRequest, Stage, StitchOutput};

/// Cancel `token` when the process receives SIGINT or SIGTERM (Ctrl+C off Unix)
pub async fn cancel_on_signal(token: tokio_util::sync::CancellationToken) {
    wait_for_signal().await;
    token.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted sandboxes
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut term), Ok(mut int)) => {
            let name = tokio::select! {
                _ = term.recv() => "SIGTERM",
                _ = int.recv() => "SIGINT",
            };
            tracing::info!(signal = name, "stopping job");
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "signal handlers unavailable, listening for Ctrl+C only");
            wait_for_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

/// Resolves on Ctrl+C; never resolves if it cannot be listened for
async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(signal = "ctrl-c", "stopping job"),
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for Ctrl+C, signals will not cancel the job");
            std::future::pending::<()>().await;
        }
    }
}

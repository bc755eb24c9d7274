//! The stitch pipeline
//!
//! `Validate → Download → Concatenate → Mux → Publish`, strictly in order. The
//! first error ends the job; the workspace is removed on every exit path because
//! it is owned by the running future.

use crate::config::{Config, FileCollisionAction};
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, parse_source_url};
use crate::manifest::write_manifest;
use crate::media::{FfmpegProcessor, MediaProcessor};
use crate::report::JobResult;
use crate::types::{JobRequest, Stage, StitchOutput};
use crate::utils::{get_unique_path, publish_file, validate_output_filename};
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Runs stitch jobs against one configuration and media processor
///
/// # Examples
///
/// ```no_run
/// use clip_stitch::{Config, JobRequest, Stitcher};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let stitcher = Stitcher::new(Config::default())?;
/// let request = JobRequest::new(
///     vec!["https://cdn.example.com/a.mp4".into(), "https://cdn.example.com/b.mp4".into()],
///     "https://cdn.example.com/voiceover.mp3",
/// );
///
/// let output = stitcher.stitch(&request).await?;
/// println!("{} ({} bytes)", output.path.display(), output.size);
/// # Ok(())
/// # }
/// ```
pub struct Stitcher {
    config: Config,
    fetcher: Fetcher,
    processor: Arc<dyn MediaProcessor>,
}

impl Stitcher {
    /// Create a stitcher that drives ffmpeg as configured
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let processor = FfmpegProcessor::from_config(&config)?;
        tracing::debug!(binary = %processor.binary_path().display(), "using ffmpeg");
        Self::with_processor(config, Arc::new(processor))
    }

    /// Create a stitcher with a caller-supplied media processor
    pub fn with_processor(config: Config, processor: Arc<dyn MediaProcessor>) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config.fetch)?;
        Ok(Self {
            config,
            fetcher,
            processor,
        })
    }

    /// Run one job, returning the published output
    pub async fn stitch(&self, request: &JobRequest) -> Result<StitchOutput> {
        self.execute(request, &CancellationToken::new()).await
    }

    /// Run one job to a [`JobResult`], stopping early if `cancel` fires
    ///
    /// Never fails: every error becomes the failure result. Cancellation is
    /// honoured until the muxed file exists; publishing it is never
    /// interrupted, so a reported cancellation always means nothing was
    /// published.
    pub async fn run(&self, request: &JobRequest, cancel: &CancellationToken) -> JobResult {
        let outcome = self.execute(request, cancel).await;

        match &outcome {
            Err(Error::Cancelled) => tracing::warn!("job cancelled"),
            Err(e) => tracing::error!(error = %e, "stitch failed"),
            Ok(_) => {}
        }
        JobResult::from_outcome(outcome)
    }

    async fn execute(&self, request: &JobRequest, cancel: &CancellationToken) -> Result<StitchOutput> {
        let started = Instant::now();
        let audio_url = validate_request(request)?;

        let workspace =
            Workspace::create(self.config.processing.workspace_root.as_deref()).await?;
        let muxed = workspace.output_path(&request.output_filename);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            produced = self.produce(request, audio_url, &workspace, &muxed) => produced?,
        }

        tracing::info!(stage = %Stage::ReadingOutput, "publishing output");
        let output = self.publish(&muxed, &request.output_filename).await?;

        if let Err(e) = workspace.close().await {
            tracing::warn!(error = %e, "failed to remove job workspace");
        }

        tracing::info!(
            path = %output.path.display(),
            size = output.size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stitch complete"
        );
        Ok(output)
    }

    /// Download every input and leave the muxed video at `muxed`
    async fn produce(
        &self,
        request: &JobRequest,
        audio_url: &str,
        workspace: &Workspace,
        muxed: &Path,
    ) -> Result<()> {
        tracing::info!(
            stage = %Stage::Downloading,
            clips = request.video_urls.len(),
            "fetching inputs"
        );
        let mut clips = Vec::with_capacity(request.video_urls.len());
        for (index, url) in request.video_urls.iter().enumerate() {
            let dest = workspace.clip_path(index);
            self.fetcher.fetch(url, &dest).await?;
            clips.push(dest);
        }
        let audio = workspace.audio_path();
        self.fetcher.fetch(audio_url, &audio).await?;

        let manifest = workspace.manifest_path();
        write_manifest(&manifest, &clips).await?;

        tracing::info!(stage = %Stage::Concatenating, processor = self.processor.name(), "joining clips");
        let concatenated = workspace.concatenated_path();
        self.processor.concat(&manifest, &concatenated).await?;

        tracing::info!(stage = %Stage::Muxing, processor = self.processor.name(), "adding audio track");
        self.processor
            .mux_audio(&concatenated, &audio, muxed)
            .await
    }

    /// Place the muxed file in the output directory and measure it
    async fn publish(&self, muxed: &Path, filename: &str) -> Result<StitchOutput> {
        let size = tokio::fs::metadata(muxed).await?.len();
        if size == 0 {
            return Err(Error::Unexpected(
                "media tool produced an empty output file".to_string(),
            ));
        }

        let output_dir = &self.config.processing.output_dir;
        tokio::fs::create_dir_all(output_dir).await?;

        let action = self.config.processing.file_collision;
        let dest = get_unique_path(&output_dir.join(filename), action)?;
        publish_file(muxed, &dest, action == FileCollisionAction::Overwrite).await?;

        let path = absolute(&dest).await;
        let size = tokio::fs::metadata(&path).await?.len();
        Ok(StitchOutput { path, size })
    }
}

async fn absolute(path: &Path) -> PathBuf {
    tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Reject requests that cannot produce a meaningful video before any work is done
///
/// Returns the audio URL on success.
fn validate_request(request: &JobRequest) -> Result<&str> {
    if request.video_urls.is_empty() {
        return Err(Error::InvalidRequest(
            "no video URLs provided".to_string(),
        ));
    }

    let audio_url = match request.audio_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => {
            return Err(Error::InvalidRequest(
                "no audio URL provided".to_string(),
            ));
        }
    };

    for url in &request.video_urls {
        parse_source_url(url)?;
    }
    parse_source_url(audio_url)?;
    validate_output_filename(&request.output_filename)?;

    Ok(audio_url)
}

/// Parse a raw stdin document and run it to a [`JobResult`]
///
/// This is the whole stdin→stdout protocol minus the I/O: malformed input,
/// a missing media tool, or any pipeline error all come back as a failure
/// result.
pub async fn run_job(input: &str, config: Config, cancel: &CancellationToken) -> JobResult {
    let request = match JobRequest::from_json(input) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "unreadable job request");
            return JobResult::failure(&e);
        }
    };

    // A malformed request is reported as such even when ffmpeg is missing
    if let Err(e) = validate_request(&request) {
        tracing::error!(error = %e, "rejected job request");
        return JobResult::failure(&e);
    }

    let stitcher = match Stitcher::new(config) {
        Ok(stitcher) => stitcher,
        Err(e) => {
            tracing::error!(error = %e, "cannot start job");
            return JobResult::failure(&e);
        }
    };

    stitcher.run(&request, cancel).await
}

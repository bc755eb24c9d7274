//! clip-stitch command-line entry point
//!
//! Reads one job request as JSON on stdin, runs it, and prints exactly one JSON
//! result line on stdout. Logs go to stderr so stdout stays machine-readable.

use clap::Parser;
use clap::error::ErrorKind;
use clip_stitch::{Config, Error, JobResult, cancel_on_signal, run_job};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for clip-stitch
#[derive(Parser, Debug)]
#[command(name = "clip-stitch")]
#[command(about = "Stitch downloaded video clips with an audio track using ffmpeg")]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the ffmpeg binary (searched in PATH if omitted)
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Directory the finished video is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Codec the audio track is re-encoded to
    #[arg(long)]
    audio_codec: Option<String>,

    /// Time limit for each download, in seconds
    #[arg(long)]
    fetch_timeout: Option<u64>,

    /// Time limit for each ffmpeg invocation, in seconds
    #[arg(long)]
    process_timeout: Option<u64>,

    /// Retry transient download failures this many times
    #[arg(long)]
    retries: Option<u32>,
}

impl Args {
    /// Defaults, then the config file, then flags
    fn into_config(self) -> clip_stitch::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(ffmpeg) = self.ffmpeg {
            config.tools.ffmpeg_path = Some(ffmpeg);
        }
        if let Some(dir) = self.output_dir {
            config.processing.output_dir = dir;
        }
        if let Some(codec) = self.audio_codec {
            config.processing.audio_codec = codec;
        }
        if let Some(secs) = self.fetch_timeout {
            config.fetch.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.process_timeout {
            config.processing.process_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.retries {
            config.fetch.retry.max_attempts = retries;
        }

        Ok(config)
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clip_stitch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let result = execute().await;

    if let Err(e) = result.emit(std::io::stdout().lock()) {
        tracing::error!(error = %e, "failed to write result");
        return ExitCode::FAILURE;
    }

    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Everything up to the result line; usage errors are reported as JSON too
async fn execute() -> JobResult {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            return JobResult::failure(&Error::Config {
                message: e.to_string().trim().to_string(),
                key: None,
            });
        }
    };

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => return JobResult::failure(&e),
    };

    let input = match read_stdin().await {
        Ok(input) => input,
        Err(e) => return JobResult::failure(&e),
    };

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));
    run_job(&input, config, &cancel).await
}

async fn read_stdin() -> Result<String, Error> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    Ok(input)
}

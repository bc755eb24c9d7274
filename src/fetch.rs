//! HTTP download of clips and the audio track into the job workspace

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::retry::with_retry;
use futures::StreamExt;
use reqwest::StatusCode;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Parse and check a source URL
///
/// Only `http` and `https` sources can be fetched.
pub fn parse_source_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::InvalidRequest(format!("invalid URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidRequest(format!(
            "unsupported URL scheme '{}' in '{}'",
            other, raw
        ))),
    }
}

/// Downloads remote resources to local files
///
/// Each download is written completely before [`Fetcher::fetch`] returns. A
/// missing resource is reported as [`Error::NotFound`], any other failure as
/// [`Error::Network`] or [`Error::Timeout`].
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Create a fetcher with the timeouts and retry policy from `config`
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Unexpected(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Download `url` into `dest`, returning the number of bytes written
    ///
    /// `dest` is truncated on every attempt, so a retried download never leaves
    /// bytes from an earlier partial attempt behind.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        let parsed = parse_source_url(url)?;
        let started = Instant::now();

        tracing::info!(url = %parsed, dest = %dest.display(), "downloading");

        let bytes = with_retry(&self.config.retry, || self.fetch_once(&parsed, dest)).await?;

        tracing::debug!(
            url = %parsed,
            bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "download complete"
        );
        Ok(bytes)
    }

    async fn fetch_once(&self, url: &Url, dest: &Path) -> Result<u64> {
        let timeout = self.timeout();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::from_reqwest(url.as_str(), e, timeout))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(Error::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Error::Network {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
                status: Some(status.as_u16()),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| Error::from_reqwest(url.as_str(), e, timeout))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }
}

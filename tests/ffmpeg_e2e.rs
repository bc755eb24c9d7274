//! Stitching real media with the real ffmpeg
//!
//! Run with `cargo test --test ffmpeg_e2e -- --ignored`. Needs `ffmpeg` and
//! `ffprobe` in PATH; each test skips itself when they are missing.

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use clip_stitch::{JobRequest, Stitcher};
use common::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

fn tools_available() -> bool {
    which::which("ffmpeg").is_ok() && which::which("ffprobe").is_ok()
}

/// Encode `seconds` of test pattern video as H.264 in MP4
async fn make_clip(dir: &Path, name: &str, seconds: u32) -> Vec<u8> {
    let path = dir.join(name);
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-f", "lavfi", "-i"])
        .arg(format!("testsrc=duration={seconds}:size=320x240:rate=25"))
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
        .arg(&path)
        .status()
        .await
        .unwrap();
    assert!(status.success(), "failed to generate {name}");
    std::fs::read(path).unwrap()
}

/// Encode `seconds` of sine tone as MP3
async fn make_audio(dir: &Path, seconds: u32) -> Vec<u8> {
    let path = dir.join("audio.mp3");
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-f", "lavfi", "-i"])
        .arg(format!("sine=frequency=440:duration={seconds}"))
        .args(["-c:a", "libmp3lame"])
        .arg(&path)
        .status()
        .await
        .unwrap();
    assert!(status.success(), "failed to generate audio");
    std::fs::read(path).unwrap()
}

async fn duration_of(path: &Path) -> f64 {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .unwrap()
        .trim()
        .parse()
        .unwrap()
}

/// Stitch clips of the given lengths with audio of `audio_seconds`
async fn stitch(root: &TempDir, clip_seconds: &[u32], audio_seconds: u32) -> PathBuf {
    let media = root.path().join("media");
    std::fs::create_dir_all(&media).unwrap();
    let server = MockServer::start().await;

    let mut video_urls = Vec::new();
    for (i, seconds) in clip_seconds.iter().enumerate() {
        let name = format!("clip{i}.mp4");
        let bytes = make_clip(&media, &name, *seconds).await;
        let route = format!("/{name}");
        serve(&server, &route, &bytes).await;
        video_urls.push(url(&server, &route));
    }
    let audio = make_audio(&media, audio_seconds).await;
    serve(&server, "/audio.mp3", &audio).await;

    let stitcher = Stitcher::new(test_config(root.path())).unwrap();
    let request = JobRequest::new(video_urls, url(&server, "/audio.mp3"));
    let result = stitcher.run(&request, &CancellationToken::new()).await;

    let (path, size) = expect_success(&result);
    assert!(size > 0);
    assert_no_workspace_left(&root.path().join("work"));
    path
}

#[tokio::test]
#[ignore] // Requires ffmpeg and ffprobe in PATH
async fn test_audio_shorter_than_video_limits_duration() {
    if !tools_available() {
        eprintln!("Skipping test: ffmpeg/ffprobe not found in PATH");
        return;
    }
    let root = TempDir::new().unwrap();

    let output = stitch(&root, &[3, 4], 5).await;

    let duration = duration_of(&output).await;
    assert!((duration - 5.0).abs() < 0.5, "expected ~5s, got {duration}s");
}

#[tokio::test]
#[ignore] // Requires ffmpeg and ffprobe in PATH
async fn test_video_shorter_than_audio_limits_duration() {
    if !tools_available() {
        eprintln!("Skipping test: ffmpeg/ffprobe not found in PATH");
        return;
    }
    let root = TempDir::new().unwrap();

    let output = stitch(&root, &[3, 4], 10).await;

    let duration = duration_of(&output).await;
    assert!((duration - 7.0).abs() < 0.5, "expected ~7s, got {duration}s");
}

#[tokio::test]
#[ignore] // Requires ffmpeg in PATH
async fn test_corrupt_clip_fails_with_diagnostics() {
    if !tools_available() {
        eprintln!("Skipping test: ffmpeg/ffprobe not found in PATH");
        return;
    }
    let root = TempDir::new().unwrap();
    let server = MockServer::start().await;
    serve(&server, "/a.mp4", b"definitely not an mp4").await;
    serve(&server, "/audio.mp3", b"nor an mp3").await;

    let stitcher = Stitcher::new(test_config(root.path())).unwrap();
    let request = JobRequest::new(vec![url(&server, "/a.mp4")], url(&server, "/audio.mp3"));
    let result = stitcher.run(&request, &CancellationToken::new()).await;

    let (error, code) = expect_failure(&result);
    assert_eq!(code, "process_error");
    assert!(error.starts_with("ffmpeg "), "unexpected error text: {error}");
    assert_nothing_published(&root.path().join("out"));
    assert_no_workspace_left(&root.path().join("work"));
}

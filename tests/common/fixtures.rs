//! Test fixtures: stand-in media processors and fake ffmpeg binaries

use async_trait::async_trait;
use clip_stitch::{Error, MediaProcessor, Stage};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// One call observed by [`RecordingProcessor`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessorCall {
    /// `concat` with the clip paths read from the manifest
    Concat { clips: Vec<PathBuf> },
    /// `mux_audio` with its two inputs
    Mux { video: PathBuf, audio: PathBuf },
}

/// In-process media processor that joins bytes instead of media streams
///
/// `concat` writes the listed clips back to back, `mux_audio` writes the video
/// followed by the audio. That keeps clip order observable in the output bytes
/// without needing ffmpeg.
#[derive(Debug, Default)]
pub struct RecordingProcessor {
    calls: Mutex<Vec<ProcessorCall>>,
    workspaces: Mutex<Vec<PathBuf>>,
    fail_at: Option<(Stage, String)>,
    empty_output: bool,
    cancel_in_mux: Option<(CancellationToken, bool)>,
}

impl RecordingProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given stage with `diagnostics` as the tool output
    pub fn failing_at(stage: Stage, diagnostics: &str) -> Self {
        Self {
            fail_at: Some((stage, diagnostics.to_string())),
            ..Self::default()
        }
    }

    /// Succeed but leave a zero-byte mux output
    pub fn producing_empty_output() -> Self {
        Self {
            empty_output: true,
            ..Self::default()
        }
    }

    /// Fire `token` while muxing, before the output is written
    pub fn cancelling_during_mux(token: CancellationToken) -> Self {
        Self {
            cancel_in_mux: Some((token, false)),
            ..Self::default()
        }
    }

    /// Fire `token` once the mux output is complete
    pub fn cancelling_after_mux(token: CancellationToken) -> Self {
        Self {
            cancel_in_mux: Some((token, true)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ProcessorCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Directories the processor saw its inputs in
    pub fn workspaces(&self) -> Vec<PathBuf> {
        self.workspaces.lock().unwrap().clone()
    }

    fn check_failure(&self, stage: Stage) -> clip_stitch::Result<()> {
        match &self.fail_at {
            Some((failing, diagnostics)) if *failing == stage => Err(Error::Process {
                stage,
                status: Some(1),
                diagnostics: diagnostics.clone(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MediaProcessor for RecordingProcessor {
    async fn concat(&self, manifest: &Path, output: &Path) -> clip_stitch::Result<()> {
        let text = tokio::fs::read_to_string(manifest).await?;
        let clips = parse_manifest(&text);

        if let Some(dir) = manifest.parent() {
            self.workspaces.lock().unwrap().push(dir.to_path_buf());
        }
        self.calls.lock().unwrap().push(ProcessorCall::Concat {
            clips: clips.clone(),
        });
        self.check_failure(Stage::Concatenating)?;

        let mut joined = Vec::new();
        for clip in &clips {
            joined.extend(tokio::fs::read(clip).await?);
        }
        tokio::fs::write(output, joined).await?;
        Ok(())
    }

    async fn mux_audio(&self, video: &Path, audio: &Path, output: &Path) -> clip_stitch::Result<()> {
        self.calls.lock().unwrap().push(ProcessorCall::Mux {
            video: video.to_path_buf(),
            audio: audio.to_path_buf(),
        });
        self.check_failure(Stage::Muxing)?;

        if let Some((token, false)) = &self.cancel_in_mux {
            token.cancel();
        }

        if self.empty_output {
            tokio::fs::write(output, b"").await?;
            return Ok(());
        }

        let mut muxed = tokio::fs::read(video).await?;
        muxed.extend(tokio::fs::read(audio).await?);
        tokio::fs::write(output, muxed).await?;

        if let Some((token, true)) = &self.cancel_in_mux {
            token.cancel();
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Read `file '<path>'` lines back into paths
pub fn parse_manifest(text: &str) -> Vec<PathBuf> {
    text.lines()
        .filter_map(|line| line.strip_prefix("file '")?.strip_suffix('\''))
        .map(|quoted| PathBuf::from(quoted.replace("'\\''", "'")))
        .collect()
}

/// Shell script standing in for ffmpeg
///
/// Appends its arguments to `calls.log` beside itself, then writes the last
/// argument: the clips named in the manifest for `-f concat`, otherwise every
/// `-i` input back to back.
#[cfg(unix)]
pub const FAKE_FFMPEG: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$@" >> "$dir/calls.log"
for out; do :; done
: > "$out.partial"
concat=0
prev=""
for arg; do
    if [ "$prev" = "-f" ] && [ "$arg" = "concat" ]; then
        concat=1
    fi
    if [ "$prev" = "-i" ]; then
        if [ "$concat" = 1 ]; then
            sed -n "s/^file '\(.*\)'\$/\1/p" "$arg" | while IFS= read -r clip; do
                cat "$clip" >> "$out.partial"
            done
        else
            cat "$arg" >> "$out.partial"
        fi
    fi
    prev="$arg"
done
mv "$out.partial" "$out"
"#;

/// Shell script standing in for an ffmpeg that rejects every job
#[cfg(unix)]
pub const FAILING_FFMPEG: &str = r#"#!/bin/sh
echo "concat.txt: Invalid data found when processing input" >&2
exit 1
"#;

/// Write `script` as an executable named `ffmpeg` inside `dir`
#[cfg(unix)]
pub fn install_script(dir: &Path, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("ffmpeg");
    std::fs::write(&path, script).expect("write fake ffmpeg");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("make fake ffmpeg executable");
    path
}

/// Lines logged by [`FAKE_FFMPEG`] installed in `dir`
#[cfg(unix)]
pub fn logged_invocations(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .map(|log| log.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

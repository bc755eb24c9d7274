//! Job result reporting
//!
//! A job ends in exactly one [`JobResult`], printed as a single JSON line:
//!
//! ```json
//! {"success":true,"output_path":"/videos/final-video.mp4","size":1048576}
//! {"success":false,"error":"resource not found: http://x/b.mp4","code":"not_found"}
//! ```

use crate::error::{Error, ErrorCode, Result};
use crate::types::StitchOutput;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::Write;
use std::path::PathBuf;

/// Outcome of one stitch job
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobResult {
    /// The final video was produced and published
    Success {
        /// Where the final video lives
        output_path: PathBuf,
        /// Its size in bytes
        size: u64,
    },
    /// The job failed; nothing was published
    Failure {
        /// Most specific available description of what went wrong
        error: String,
        /// Machine-readable error code
        code: String,
    },
}

impl JobResult {
    /// Successful result for a published output
    pub fn success(output: StitchOutput) -> Self {
        JobResult::Success {
            output_path: output.path,
            size: output.size,
        }
    }

    /// Failure result for `error`
    ///
    /// The message is the error's full description, which for tool failures
    /// includes the tool's captured diagnostics.
    pub fn failure(error: &Error) -> Self {
        JobResult::Failure {
            error: error.to_string(),
            code: error.error_code().to_string(),
        }
    }

    /// Collapse a pipeline outcome into a result
    pub fn from_outcome(outcome: Result<StitchOutput>) -> Self {
        match outcome {
            Ok(output) => Self::success(output),
            Err(e) => Self::failure(&e),
        }
    }

    /// Whether the job succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success { .. })
    }

    /// Serialize to a single-line JSON document
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            // Only reachable with a map serializer failure; keep the protocol intact
            Err(e) => format!(
                "{{\"success\":false,\"error\":{},\"code\":\"unexpected_error\"}}",
                serde_json::Value::String(format!("failed to serialize result: {e}"))
            ),
        }
    }

    /// Write the JSON line to `out` and flush it
    pub fn emit<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "{}", self.to_json())?;
        out.flush()
    }
}

impl Serialize for JobResult {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            JobResult::Success { output_path, size } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("output_path", &output_path.to_string_lossy())?;
                map.serialize_entry("size", size)?;
                map.end()
            }
            JobResult::Failure { error, code } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("code", code)?;
                map.end()
            }
        }
    }
}

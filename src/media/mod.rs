//! External media tool integration
//!
//! All decoding, muxing and transcoding is delegated to an external tool behind
//! the [`MediaProcessor`] trait. [`FfmpegProcessor`] drives the `ffmpeg` binary,
//! either at an explicit path or discovered in `PATH`.

mod ffmpeg;
mod traits;

pub use ffmpeg::FfmpegProcessor;
pub use traits::MediaProcessor;

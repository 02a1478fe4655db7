pub mod ffmpeg;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub use ffmpeg::FfmpegAssembler;

/// Stream parameters of an encoded audio file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioFormat {
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_rate: Option<u32>,
}

impl AudioFormat {
    /// Segments can be joined by stream copy only when these three match.
    pub fn is_concat_compatible(&self, other: &AudioFormat) -> bool {
        self.codec == other.codec
            && self.sample_rate == other.sample_rate
            && self.channels == other.channels
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} Hz {}ch",
            self.codec, self.sample_rate, self.channels
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioProbe {
    pub format: AudioFormat,
    pub duration_secs: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("audio segments are not concat compatible: {first} vs {second}")]
    FormatMismatch {
        first: AudioFormat,
        second: AudioFormat,
    },

    #[error("{tool} is not available: {message}")]
    ToolUnavailable { tool: String, message: String },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    #[error("could not probe {path}: {message}")]
    Probe { path: PathBuf, message: String },

    #[error("no audio segments to concatenate")]
    Empty,

    #[error("silence duration must be positive, got {0}")]
    InvalidDuration(f64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Local audio tooling used to stitch provider output together
#[async_trait]
pub trait AudioAssembler: Send + Sync {
    /// Read codec, sample rate, channel count and duration of `path`.
    async fn probe(&self, path: &Path) -> Result<AudioProbe, AssemblyError>;

    /// Write `duration_secs` of silence encoded as `format` to `output`.
    async fn synthesize_silence(
        &self,
        duration_secs: f64,
        format: &AudioFormat,
        output: &Path,
    ) -> Result<(), AssemblyError>;

    /// Join `segments` in order into `output` without re-encoding.
    ///
    /// # Errors
    /// `FormatMismatch` when any segment differs from the first in codec,
    /// sample rate or channel count. `output` is left untouched on failure.
    async fn concatenate(&self, segments: &[PathBuf], output: &Path) -> Result<(), AssemblyError>;
}

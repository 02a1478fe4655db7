use super::{AssemblyError, AudioAssembler, AudioFormat, AudioProbe};
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempPath;
use tokio::process::Command;

/// Audio assembler backed by the `ffmpeg` and `ffprobe` executables
#[derive(Debug, Clone)]
pub struct FfmpegAssembler {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for FfmpegAssembler {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_name: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl FfmpegAssembler {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Verify both executables can be launched.
    pub async fn check_available(&self) -> Result<(), AssemblyError> {
        self.run(&self.ffmpeg, vec!["-version".into()]).await?;
        self.run(&self.ffprobe, vec!["-version".into()]).await?;
        Ok(())
    }

    async fn run(&self, tool: &str, args: Vec<OsString>) -> Result<Vec<u8>, AssemblyError> {
        tracing::debug!(tool = %tool, args = ?args, "Running audio tool");

        let output = Command::new(tool)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AssemblyError::ToolUnavailable {
                tool: tool.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(tool = %tool, status = ?output.status.code(), stderr = %stderr, "Audio tool failed");
            return Err(AssemblyError::ToolFailed {
                tool: tool.to_string(),
                stderr,
            });
        }

        Ok(output.stdout)
    }

    /// Temporary file next to `output`, so the final rename stays on one filesystem.
    fn staging_path(output: &Path) -> Result<TempPath, AssemblyError> {
        let parent = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let suffix = output
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let file = tempfile::Builder::new()
            .prefix(".partial-")
            .suffix(&suffix)
            .tempfile_in(parent)?;
        Ok(file.into_temp_path())
    }

    fn commit(staged: TempPath, output: &Path) -> Result<(), AssemblyError> {
        staged.persist(output).map_err(|e| AssemblyError::Io(e.error))
    }
}

/// Encoder ffmpeg should use to produce `codec`
fn encoder_for(codec: &str) -> &str {
    match codec {
        "mp3" => "libmp3lame",
        "opus" => "libopus",
        "vorbis" => "libvorbis",
        other => other,
    }
}

fn channel_layout(channels: u16) -> String {
    match channels {
        1 => "mono".to_string(),
        2 => "stereo".to_string(),
        n => format!("{n}c"),
    }
}

/// One line of a concat demuxer list file
fn concat_list_entry(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{escaped}'\n")
}

fn parse_probe(path: &Path, stdout: &[u8]) -> Result<AudioProbe, AssemblyError> {
    let probe_error = |message: String| AssemblyError::Probe {
        path: path.to_path_buf(),
        message,
    };

    let parsed: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| probe_error(e.to_string()))?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| probe_error("no audio stream".to_string()))?;

    let codec = stream
        .codec_name
        .ok_or_else(|| probe_error("missing codec name".to_string()))?;
    let sample_rate = stream
        .sample_rate
        .as_deref()
        .and_then(|rate| rate.parse::<u32>().ok())
        .ok_or_else(|| probe_error("missing sample rate".to_string()))?;
    let channels = stream
        .channels
        .ok_or_else(|| probe_error("missing channel count".to_string()))?;
    let bit_rate = stream.bit_rate.as_deref().and_then(|rate| rate.parse().ok());

    let duration_secs = parsed
        .format
        .and_then(|format| format.duration)
        .and_then(|duration| duration.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(AudioProbe {
        format: AudioFormat {
            codec,
            sample_rate,
            channels,
            bit_rate,
        },
        duration_secs,
    })
}

#[async_trait]
impl AudioAssembler for FfmpegAssembler {
    async fn probe(&self, path: &Path) -> Result<AudioProbe, AssemblyError> {
        let stdout = self
            .run(
                &self.ffprobe,
                vec![
                    "-v".into(),
                    "error".into(),
                    "-select_streams".into(),
                    "a:0".into(),
                    "-show_entries".into(),
                    "stream=codec_name,sample_rate,channels,bit_rate:format=duration".into(),
                    "-of".into(),
                    "json".into(),
                    path.into(),
                ],
            )
            .await?;

        parse_probe(path, &stdout)
    }

    async fn synthesize_silence(
        &self,
        duration_secs: f64,
        format: &AudioFormat,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        if duration_secs.is_nan() || duration_secs <= 0.0 {
            return Err(AssemblyError::InvalidDuration(duration_secs));
        }

        let staged = Self::staging_path(output)?;
        let source = format!(
            "anullsrc=r={}:cl={}",
            format.sample_rate,
            channel_layout(format.channels)
        );
        let bit_rate = format
            .bit_rate
            .map(|rate| format!("{}k", rate / 1000))
            .unwrap_or_else(|| "128k".to_string());

        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-f".into(),
            "lavfi".into(),
            "-i".into(),
            source.into(),
            "-t".into(),
            format!("{duration_secs:.3}").into(),
            "-c:a".into(),
            encoder_for(&format.codec).into(),
        ];
        if format.codec != "flac" && !format.codec.starts_with("pcm_") {
            args.push("-b:a".into());
            args.push(bit_rate.into());
        }
        args.push(staged.to_path_buf().into());

        self.run(&self.ffmpeg, args).await?;
        Self::commit(staged, output)?;

        tracing::debug!(
            duration_secs = duration_secs,
            format = %format,
            output = %output.display(),
            "Silence segment written"
        );

        Ok(())
    }

    async fn concatenate(&self, segments: &[PathBuf], output: &Path) -> Result<(), AssemblyError> {
        let first = segments.first().ok_or(AssemblyError::Empty)?;

        // 1. Every segment must share the first segment's stream layout
        let reference = self.probe(first).await?.format;
        for segment in &segments[1..] {
            let format = self.probe(segment).await?.format;
            if !reference.is_concat_compatible(&format) {
                tracing::warn!(
                    expected = %reference,
                    found = %format,
                    segment = %segment.display(),
                    "Refusing to concatenate mismatched audio"
                );
                return Err(AssemblyError::FormatMismatch {
                    first: reference,
                    second: format,
                });
            }
        }

        // 2. Write the concat list with absolute paths
        let list_dir = tempfile::tempdir()?;
        let list_path = list_dir.path().join("segments.txt");
        let mut list = String::new();
        for segment in segments {
            let absolute = tokio::fs::canonicalize(segment).await?;
            list.push_str(&concat_list_entry(&absolute));
        }
        tokio::fs::write(&list_path, list).await?;

        // 3. Stream copy into a staging file, then move it into place
        let staged = Self::staging_path(output)?;
        self.run(
            &self.ffmpeg,
            vec![
                "-hide_banner".into(),
                "-loglevel".into(),
                "error".into(),
                "-y".into(),
                "-f".into(),
                "concat".into(),
                "-safe".into(),
                "0".into(),
                "-i".into(),
                list_path.into(),
                "-c".into(),
                "copy".into(),
                staged.to_path_buf().into(),
            ],
        )
        .await?;
        Self::commit(staged, output)?;

        tracing::info!(
            segments = segments.len(),
            format = %reference,
            output = %output.display(),
            "Audio segments concatenated"
        );

        Ok(())
    }
}

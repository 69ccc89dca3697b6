//! Stream geometry via ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::aspect::AspectRatio;
use super::tool::run_tool;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe tool failed: {0}")]
    Tool(String),

    #[error("unparseable probe output: {0}")]
    Parse(String),

    #[error("no dimensioned stream")]
    NoDimensionedStream,
}

/// Geometry of the first stream that reports nonzero width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub width: u32,
    pub height: u32,
}

impl ProbeResult {
    pub fn classification(&self) -> AspectRatio {
        AspectRatio::classify(self.width, self.height)
    }
}

/// Inspects a staged media file.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
pub fn parse_probe_output(stdout: &[u8]) -> Result<ProbeResult, ProbeError> {
    let output: FfprobeOutput =
        serde_json::from_slice(stdout).map_err(|e| ProbeError::Parse(e.to_string()))?;

    output
        .streams
        .iter()
        .find_map(|s| match (s.width, s.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Some(ProbeResult { width, height })
            }
            _ => None,
        })
        .ok_or(ProbeError::NoDimensionedStream)
}

pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Self {
        Self {
            ffprobe_path,
            timeout,
        }
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(service = "ffprobe"))]
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeError> {
        let output = run_tool(
            &self.ffprobe_path,
            [
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-print_format"),
                OsStr::new("json"),
                OsStr::new("-show_streams"),
                path.as_os_str(),
            ],
            self.timeout,
        )
        .await
        .map_err(|e| ProbeError::Tool(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(status = %output.status, stderr = %stderr, "ffprobe failed");
            return Err(ProbeError::Tool(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let result = parse_probe_output(&output.stdout)?;
        tracing::debug!(width = result.width, height = result.height, "Probed stream geometry");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_dimensioned_stream_wins() {
        let json = br#"{"streams":[
            {"index":0,"codec_type":"audio"},
            {"index":1,"codec_type":"video","width":1920,"height":1080},
            {"index":2,"codec_type":"video","width":1080,"height":1920}
        ]}"#;
        let result = parse_probe_output(json).unwrap();
        assert_eq!(result, ProbeResult { width: 1920, height: 1080 });
        assert_eq!(result.classification(), AspectRatio::Landscape);
    }

    #[test]
    fn test_zero_dimension_streams_are_skipped() {
        let json = br#"{"streams":[
            {"codec_type":"video","width":0,"height":0},
            {"codec_type":"video","width":1080,"height":1920}
        ]}"#;
        let result = parse_probe_output(json).unwrap();
        assert_eq!(result.classification(), AspectRatio::Portrait);
    }

    #[test]
    fn test_no_dimensioned_stream() {
        assert!(matches!(
            parse_probe_output(br#"{"streams":[]}"#),
            Err(ProbeError::NoDimensionedStream)
        ));
        assert!(matches!(
            parse_probe_output(br#"{}"#),
            Err(ProbeError::NoDimensionedStream)
        ));
        assert!(matches!(
            parse_probe_output(br#"{"streams":[{"width":640,"height":0}]}"#),
            Err(ProbeError::NoDimensionedStream)
        ));
    }

    #[test]
    fn test_unparseable_output() {
        assert!(matches!(
            parse_probe_output(b"not json"),
            Err(ProbeError::Parse(_))
        ));
    }
}

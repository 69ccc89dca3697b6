//! Fast-start remux via ffmpeg (stream copy, index moved to the front).

use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::tool::run_tool;

const OUTPUT_SUFFIX: &str = ".processing";

#[derive(Debug, Error)]
pub enum RemuxError {
    #[error("remux tool failed: {0}")]
    Tool(String),

    /// Nonzero exit; carries the tool's diagnostic output.
    #[error("remux failed: {stderr}")]
    Failed { stderr: String },
}

/// Rewrites a container so playback can start before the download finishes.
#[async_trait]
pub trait FastStartRemuxer: Send + Sync {
    /// Remux `input` into a new file at `output`, which the caller owns and removes.
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), RemuxError>;
}

/// Output path for a remux of `input`: the input path with `.processing` appended.
pub fn remux_output_path(input: &Path) -> PathBuf {
    let mut os: OsString = input.as_os_str().to_owned();
    os.push(OUTPUT_SUFFIX);
    PathBuf::from(os)
}

/// ffmpeg arguments for a stream-copy remux with the `faststart` flag.
pub fn remux_args<'a>(input: &'a Path, output: &'a Path) -> [&'a OsStr; 9] {
    [
        OsStr::new("-i"),
        input.as_os_str(),
        OsStr::new("-movflags"),
        OsStr::new("faststart"),
        OsStr::new("-c"),
        OsStr::new("copy"),
        OsStr::new("-f"),
        OsStr::new("mp4"),
        output.as_os_str(),
    ]
}

pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: String, timeout: Duration) -> Self {
        Self {
            ffmpeg_path,
            timeout,
        }
    }
}

#[async_trait]
impl FastStartRemuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(service = "ffmpeg"))]
    async fn remux(&self, input: &Path, output_path: &Path) -> Result<(), RemuxError> {
        let start = std::time::Instant::now();

        let output = run_tool(
            &self.ffmpeg_path,
            remux_args(input, output_path),
            self.timeout,
        )
        .await
        .map_err(|e| RemuxError::Tool(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(status = %output.status, stderr = %stderr, "ffmpeg remux failed");
            return Err(RemuxError::Failed { stderr });
        }

        tracing::debug!(
            output = %output_path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fast-start remux complete"
        );

        Ok(())
    }
}

//! Stand-ins for ffprobe and ffmpeg.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tubely_api::auth::JwtAuthenticator;
use tubely_core::{AppError, Authenticator};
use tubely_processing::{FastStartRemuxer, MediaProber, ProbeError, ProbeResult, RemuxError};
use uuid::Uuid;

/// JWT authenticator that counts how often it is asked to validate a token.
pub struct CountingAuthenticator {
    inner: JwtAuthenticator,
    calls: Arc<AtomicUsize>,
}

impl CountingAuthenticator {
    pub fn new(inner: JwtAuthenticator, calls: Arc<AtomicUsize>) -> Self {
        Self { inner, calls }
    }
}

#[async_trait]
impl Authenticator for CountingAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Uuid, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.authenticate(token).await
    }
}

pub struct FakeProber {
    dims: Option<(u32, u32)>,
}

impl FakeProber {
    pub fn new(dims: Option<(u32, u32)>) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, _path: &Path) -> Result<ProbeResult, ProbeError> {
        match self.dims {
            Some((width, height)) => Ok(ProbeResult { width, height }),
            None => Err(ProbeError::Tool("ffprobe exited with 1".to_string())),
        }
    }
}

/// Copies the input to the requested output path unchanged.
pub struct FakeRemuxer {
    fail: bool,
}

impl FakeRemuxer {
    pub fn new(fail: bool) -> Self {
        Self { fail }
    }
}

#[async_trait]
impl FastStartRemuxer for FakeRemuxer {
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), RemuxError> {
        if self.fail {
            return Err(RemuxError::Failed {
                stderr: "moov atom not found".to_string(),
            });
        }
        tokio::fs::copy(input, output)
            .await
            .map_err(|e| RemuxError::Tool(e.to_string()))?;
        Ok(())
    }
}

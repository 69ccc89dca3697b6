//! Fakes for pipeline tests.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tubely_core::models::{StorageReference, VideoRecord};
use tubely_core::{AppError, Authenticator};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_storage::{
    ByteStream, MemoryStorage, Storage, StorageBackend, StorageError, StorageResult, UrlSigner,
};
use uuid::Uuid;

use crate::error::UploadTooLarge;
use crate::video::{
    FastStartRemuxer, IngestConfig, MediaProber, ProbeError, ProbeResult, RemuxError,
    VideoIngestor,
};

pub const TTL: Duration = Duration::from_secs(15 * 60);

/// Accepts a user's UUID as their token.
pub struct UuidTokenAuthenticator;

#[async_trait]
impl Authenticator for UuidTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(token).map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
    }
}

#[derive(Clone, Copy)]
pub enum ProbeBehaviour {
    Dims(u32, u32),
    Fails,
}

pub struct FakeProber {
    behaviour: ProbeBehaviour,
    pub calls: AtomicUsize,
}

#[async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(path.exists(), "probe input must exist");
        let staged = PathBuf::from(
            path.to_string_lossy()
                .trim_end_matches(".processing")
                .to_string(),
        );
        assert!(!staged.exists(), "pre-remux file must be gone before probing");

        match self.behaviour {
            ProbeBehaviour::Dims(width, height) if width > 0 && height > 0 => {
                Ok(ProbeResult { width, height })
            }
            ProbeBehaviour::Dims(..) => Err(ProbeError::NoDimensionedStream),
            ProbeBehaviour::Fails => Err(ProbeError::Tool("ffprobe exited with 1".to_string())),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RemuxBehaviour {
    Copy,
    Fails,
    /// Exits cleanly without writing anything.
    NoOutput,
}

/// Copies its input to the output path it is handed and remembers that path.
pub struct FakeRemuxer {
    behaviour: RemuxBehaviour,
    pub calls: AtomicUsize,
    pub outputs: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl FastStartRemuxer for FakeRemuxer {
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), RemuxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outputs.lock().unwrap().push(output.to_path_buf());
        match self.behaviour {
            RemuxBehaviour::Fails => Err(RemuxError::Failed {
                stderr: "moov atom not found".to_string(),
            }),
            RemuxBehaviour::NoOutput => Ok(()),
            RemuxBehaviour::Copy => {
                tokio::fs::copy(input, output)
                    .await
                    .map_err(|e| RemuxError::Tool(e.to_string()))?;
                Ok(())
            }
        }
    }
}

/// Yields `prefix`, then fails the way an over-limit request body does.
pub fn oversized_upload(prefix: &'static [u8]) -> impl AsyncRead + Unpin + Send {
    prefix.chain(LimitHit)
}

struct LimitHit;

impl AsyncRead for LimitHit {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::other(UploadTooLarge)))
    }
}

/// Memory storage whose writes can be made to fail.
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_uploads: bool,
    pub uploads: AtomicUsize,
}

#[async_trait]
impl Storage for FlakyStorage {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }

    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StorageReference> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads {
            return Err(StorageError::UploadFailed("quota exceeded".to_string()));
        }
        self.inner
            .upload_stream(storage_key, content_type, content_length, reader)
            .await
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StorageReference> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads {
            return Err(StorageError::UploadFailed("quota exceeded".to_string()));
        }
        self.inner.upload_with_key(storage_key, data, content_type).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.inner.download(storage_key).await
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        self.inner.download_stream(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.inner.delete(storage_key).await
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.inner.get_presigned_url(storage_key, expires_in).await
    }
}

/// In-memory repository whose updates can be made to fail.
pub struct FlakyRepository {
    inner: InMemoryVideoRepository,
    fail_updates: bool,
}

#[async_trait]
impl VideoRepository for FlakyRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        self.inner.get_video(id).await
    }

    async fn update_video(&self, video: &VideoRecord) -> Result<(), AppError> {
        if self.fail_updates {
            return Err(AppError::Metadata("connection reset".to_string()));
        }
        self.inner.update_video(video).await
    }

    async fn create_video(&self, video: &VideoRecord) -> Result<(), AppError> {
        self.inner.create_video(video).await
    }
}

#[derive(Clone, Copy)]
pub struct Faults {
    pub probe: ProbeBehaviour,
    pub remux: RemuxBehaviour,
    pub store: bool,
    pub update: bool,
}

impl Default for Faults {
    fn default() -> Self {
        Self {
            probe: ProbeBehaviour::Dims(1920, 1080),
            remux: RemuxBehaviour::Copy,
            store: false,
            update: false,
        }
    }
}

pub struct Harness {
    pub ingestor: VideoIngestor,
    pub objects: MemoryStorage,
    pub repo: InMemoryVideoRepository,
    pub storage: Arc<FlakyStorage>,
    pub prober: Arc<FakeProber>,
    pub remuxer: Arc<FakeRemuxer>,
    pub staging: TempDir,
    pub owner: Uuid,
    pub video_id: Uuid,
}

impl Harness {
    pub async fn new(faults: Faults) -> Self {
        let objects = MemoryStorage::new("http://localhost:8091/assets", UrlSigner::new("test"));
        let repo = InMemoryVideoRepository::new();
        let owner = Uuid::new_v4();
        let video = VideoRecord::new(owner, "clip", "a test clip");
        repo.create_video(&video).await.unwrap();

        let storage = Arc::new(FlakyStorage {
            inner: objects.clone(),
            fail_uploads: faults.store,
            uploads: AtomicUsize::new(0),
        });
        let prober = Arc::new(FakeProber {
            behaviour: faults.probe,
            calls: AtomicUsize::new(0),
        });
        let remuxer = Arc::new(FakeRemuxer {
            behaviour: faults.remux,
            calls: AtomicUsize::new(0),
            outputs: Mutex::new(Vec::new()),
        });
        let staging = tempfile::tempdir().unwrap();

        let ingestor = VideoIngestor::new(
            Arc::new(UuidTokenAuthenticator),
            Arc::new(FlakyRepository {
                inner: repo.clone(),
                fail_updates: faults.update,
            }),
            storage.clone(),
            prober.clone(),
            remuxer.clone(),
            IngestConfig {
                staging_dir: staging.path().to_path_buf(),
                presigned_url_ttl: TTL,
            },
        );

        Self {
            ingestor,
            objects,
            repo,
            storage,
            prober,
            remuxer,
            staging,
            owner,
            video_id: video.id,
        }
    }

    pub fn token(&self) -> String {
        self.owner.to_string()
    }

    pub fn staged_entries(&self) -> usize {
        std::fs::read_dir(self.staging.path()).unwrap().count()
    }

    pub async fn stored_video(&self) -> VideoRecord {
        self.repo.get_video(self.video_id).await.unwrap().unwrap()
    }
}

//! Test helpers: build AppState and router for integration tests.
//!
//! The app runs against the memory storage backend, the in-memory repository and fake
//! media tools, so no database, bucket or ffmpeg install is needed.

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

use axum_test::TestServer;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtAuthenticator;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::models::VideoRecord;
use tubely_core::{Config, StorageBackend};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{IngestConfig, VideoIngestor};
use tubely_storage::{MemoryStorage, UrlSigner};
use uuid::Uuid;

use fakes::{CountingAuthenticator, FakeProber, FakeRemuxer};

pub const TEST_JWT_SECRET: &str = "integration-test-jwt-secret-of-sufficient-length";
pub const TEST_SIGNING_SECRET: &str = "integration-test-url-signing-secret";
pub const ASSET_BASE_URL: &str = "http://localhost:8091/assets";
const ASSET_ORIGIN: &str = "http://localhost:8091";

/// Knobs for the fake media tools.
#[derive(Clone, Copy)]
pub struct ToolBehaviour {
    /// Dimensions reported by the prober; `None` makes probing fail.
    pub dims: Option<(u32, u32)>,
    pub remux_fails: bool,
}

impl Default for ToolBehaviour {
    fn default() -> Self {
        Self {
            dims: Some((1920, 1080)),
            remux_fails: false,
        }
    }
}

/// Test application: server plus handles on its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub repo: InMemoryVideoRepository,
    pub storage: MemoryStorage,
    pub signer: UrlSigner,
    pub auth: JwtAuthenticator,
    /// Token validations performed so far.
    pub auth_calls: Arc<AtomicUsize>,
    pub staging: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Valid bearer header value for `user_id`.
    pub fn bearer(&self, user_id: Uuid) -> String {
        let token = self
            .auth
            .issue(user_id, chrono::Duration::minutes(5))
            .expect("Failed to issue test token");
        format!("Bearer {}", token)
    }

    /// Create a video owned by `owner` and return its ID.
    pub async fn create_video(&self, owner: Uuid) -> Uuid {
        let video = VideoRecord::new(owner, "Boot.dev beats", "A test video");
        self.repo
            .create_video(&video)
            .await
            .expect("Failed to create test video");
        video.id
    }

    pub async fn video(&self, id: Uuid) -> VideoRecord {
        self.repo
            .get_video(id)
            .await
            .expect("Failed to load test video")
            .expect("Test video missing")
    }

    /// Entries left in the staging directory.
    pub fn staged_entries(&self) -> usize {
        std::fs::read_dir(self.staging.path())
            .expect("Failed to read staging directory")
            .count()
    }
}

/// Split an asset URL into the server path and its query pairs.
pub fn asset_request(url: &str) -> (String, Vec<(String, String)>) {
    let relative = url
        .strip_prefix(ASSET_ORIGIN)
        .expect("Asset URL should point at the test server");
    let (path, query) = relative.split_once('?').expect("Asset URL should be signed");
    let pairs = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (path.to_string(), pairs)
}

pub fn create_test_config(staging_dir: &Path) -> Config {
    Config {
        server_port: 8091,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        storage_backend: StorageBackend::Memory,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: Some(ASSET_BASE_URL.to_string()),
        url_signing_secret: Some(TEST_SIGNING_SECRET.to_string()),
        presigned_url_ttl_secs: 15 * 60,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        media_tool_timeout_secs: 5,
        staging_dir: staging_dir.to_path_buf(),
        max_video_size_mb: 1,
        max_thumbnail_size_mb: 1,
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(ToolBehaviour::default()).await
}

pub async fn setup_test_app_with(tools: ToolBehaviour) -> TestApp {
    let staging = tempfile::tempdir().expect("Failed to create staging directory");
    let config = create_test_config(staging.path());

    let signer = UrlSigner::new(TEST_SIGNING_SECRET);
    let storage = MemoryStorage::new(ASSET_BASE_URL, signer.clone());
    let repo = InMemoryVideoRepository::new();
    let auth = JwtAuthenticator::new(TEST_JWT_SECRET);

    let auth_calls = Arc::new(AtomicUsize::new(0));

    let ingestor = VideoIngestor::new(
        Arc::new(CountingAuthenticator::new(auth.clone(), auth_calls.clone())),
        Arc::new(repo.clone()),
        Arc::new(storage.clone()),
        Arc::new(FakeProber::new(tools.dims)),
        Arc::new(FakeRemuxer::new(tools.remux_fails)),
        IngestConfig::from_config(&config),
    );

    let state = Arc::new(AppState {
        ingestor,
        storage: Arc::new(storage.clone()),
        asset_signer: Some(signer.clone()),
    });

    let app = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        repo,
        storage,
        signer,
        auth,
        auth_calls,
        staging,
    }
}
